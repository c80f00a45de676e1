//! Test fixtures
//!
//! Identities and tokens for gateway tests. Tokens are minted with the
//! same verifier the server under test is configured with.

use async_trait::async_trait;
use roomcast_common::{
    AppConfig, AppSettings, Environment, IdentityVerifier, RoomConfig, ServerConfig, TokenConfig,
};
use roomcast_core::{
    DomainError, Identity, Message, MessageId, MessageKind, MessageStore, StoreResult,
};

/// Shared token secret for test servers and test clients
pub const TEST_SECRET: &str = "integration-test-secret";

/// Configuration for a test server
///
/// The port is ignored; test servers bind an ephemeral port.
pub fn test_config() -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "roomcast-test".to_string(),
            env: Environment::Development,
        },
        gateway: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        token: TokenConfig {
            secret: TEST_SECRET.to_string(),
            expiry_secs: 3600,
        },
        rooms: RoomConfig {
            max_body_len: 4000,
            send_buffer: 100,
        },
    }
}

/// A test identity
pub fn identity(id: &str, name: &str) -> Identity {
    Identity::new(id, name)
}

/// Mint a valid token for an identity
pub fn token_for(identity: &Identity) -> String {
    let verifier = IdentityVerifier::new(TEST_SECRET, 3600);
    verifier.issue(identity).expect("token issuance")
}

/// Mint a token signed with the wrong secret
pub fn bad_token_for(identity: &Identity) -> String {
    let verifier = IdentityVerifier::new("some-other-secret", 3600);
    verifier.issue(identity).expect("token issuance")
}

/// Message store whose writes always fail
///
/// Reads succeed (with an empty history, since nothing ever persists), so
/// joins still replay; every mutation reports a storage failure. Drives
/// the error branches the in-memory store never takes.
#[derive(Debug, Default)]
pub struct FailingMessageStore;

impl FailingMessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn down<T>() -> StoreResult<T> {
        Err(DomainError::Storage("message store down".into()))
    }
}

#[async_trait]
impl MessageStore for FailingMessageStore {
    async fn append(
        &self,
        _room: &str,
        _sender: &Identity,
        _body: String,
        _kind: MessageKind,
    ) -> StoreResult<Message> {
        Self::down()
    }

    async fn history(&self, _room: &str) -> StoreResult<Vec<Message>> {
        Ok(Vec::new())
    }

    async fn delete_one(&self, _room: &str, _id: MessageId) -> StoreResult<bool> {
        Self::down()
    }

    async fn delete_all(&self, _room: &str) -> StoreResult<usize> {
        Self::down()
    }

    async fn mark_room_seen(&self, _room: &str) -> StoreResult<usize> {
        Self::down()
    }
}
