//! Identity token verification
//!
//! The external identity provider issues an opaque HS256 token from
//! credentials; the gateway only turns that token back into the verified
//! `(identity, displayName, avatarRef)` tuple using the `jsonwebtoken` crate.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use roomcast_core::{Identity, UserId};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by an identity token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (opaque user id)
    pub sub: String,
    /// Display name
    pub name: String,
    /// Avatar reference in the profile store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl IdentityClaims {
    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Convert the claims into the identity tuple the engine consumes
    #[must_use]
    pub fn into_identity(self) -> Identity {
        Identity {
            id: UserId::new(self.sub),
            display_name: self.name,
            avatar_ref: self.avatar,
        }
    }
}

/// Verifier for identity tokens
#[derive(Clone)]
pub struct IdentityVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_secs: i64,
}

impl IdentityVerifier {
    /// Create a new verifier with the shared secret and issuance expiry
    #[must_use]
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
        }
    }

    /// Verify a token and return the identity it carries
    ///
    /// # Errors
    /// Returns `AppError::TokenExpired` or `AppError::InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let data = decode::<IdentityClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })?;

        Ok(data.claims.into_identity())
    }

    /// Issue a token for an identity
    ///
    /// Issuance belongs to the external identity provider; this exists so
    /// local tooling and tests can mint tokens the gateway accepts.
    pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = IdentityClaims {
            sub: identity.id.to_string(),
            name: identity.display_name.clone(),
            avatar: identity.avatar_ref.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
    }
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier")
            .field("expiry_secs", &self.expiry_secs)
            .finish()
    }
}
