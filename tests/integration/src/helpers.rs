//! Test helpers for integration tests
//!
//! Provides utilities for spawning test gateways and driving WebSocket
//! clients against them.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use reqwest::Client;
use roomcast_common::IdentityVerifier;
use roomcast_core::{Identity, Message as ChatMessage, MessageStore};
use roomcast_engine::EngineContext;
use roomcast_gateway::connection::ConnectionManager;
use roomcast_gateway::server::GatewayState;
use roomcast_store::MemoryProfileStore;
use roomcast_gateway::protocol::{
    ClientEvent, IdentifyPayload, JoinPayload, ReadyPayload, RoomMember, SendMessagePayload,
    ServerEvent,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{tungstenite, MaybeTlsStream, WebSocketStream};

use crate::fixtures::{test_config, token_for};

/// How long to wait for an expected event
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait before declaring that no event arrives
const SILENCE_WINDOW: Duration = Duration::from_millis(300);

/// Test gateway instance that manages its own lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test gateway on an ephemeral port
    pub async fn start() -> Result<Self> {
        let state = roomcast_gateway::server::create_gateway_state(test_config())?;
        Self::start_with_state(state).await
    }

    /// Start a test gateway backed by a caller-supplied message store
    ///
    /// Used to drive the storage-failure paths the in-memory store never
    /// takes.
    pub async fn start_with_message_store(store: Arc<dyn MessageStore>) -> Result<Self> {
        let config = test_config();

        let engine = EngineContext::builder()
            .message_store(store)
            .profile_store(MemoryProfileStore::new_shared())
            .build()?;
        let verifier = Arc::new(IdentityVerifier::new(
            &config.token.secret,
            config.token.expiry_secs,
        ));
        let state = GatewayState::new(engine, ConnectionManager::new_shared(), verifier, config);

        Self::start_with_state(state).await
    }

    async fn start_with_state(state: GatewayState) -> Result<Self> {
        let app = roomcast_gateway::server::create_app(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(50)).await;

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Base HTTP URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// WebSocket URL for the gateway endpoint
    pub fn gateway_url(&self) -> String {
        format!("ws://{}/gateway", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Open a raw WebSocket client
    pub async fn connect(&self) -> Result<WsClient> {
        WsClient::connect(&self.gateway_url()).await
    }

    /// Open a client and complete the identify handshake
    pub async fn connect_as(&self, identity: &Identity) -> Result<WsClient> {
        let mut client = self.connect().await?;
        client.identify(&token_for(identity)).await?;
        Ok(client)
    }

    /// Open a client, identify, and join a room
    ///
    /// Returns the client together with the history replay and presence
    /// snapshot observed during the join.
    pub async fn join_as(
        &self,
        identity: &Identity,
        room: &str,
    ) -> Result<(WsClient, Vec<ChatMessage>, Vec<RoomMember>)> {
        let mut client = self.connect_as(identity).await?;
        let (history, members) = client.join(room).await?;
        Ok((client, history, members))
    }
}

/// A WebSocket test client speaking the gateway protocol
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Connect to a gateway URL
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = tokio_tungstenite::connect_async(url)
            .await
            .context("WebSocket connect failed")?;
        Ok(Self { stream })
    }

    /// Send a client event
    pub async fn send(&mut self, event: &ClientEvent) -> Result<()> {
        let json = event.to_json()?;
        self.stream.send(tungstenite::Message::Text(json)).await?;
        Ok(())
    }

    /// Send a raw text frame (for malformed-input tests)
    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream
            .send(tungstenite::Message::Text(text.to_string()))
            .await?;
        Ok(())
    }

    /// Receive the next server event
    pub async fn recv(&mut self) -> Result<ServerEvent> {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        loop {
            let frame = timeout(deadline - tokio::time::Instant::now(), self.stream.next())
                .await
                .context("Timed out waiting for event")?;
            match frame {
                Some(Ok(tungstenite::Message::Text(text))) => {
                    return ServerEvent::from_json(&text).context("Undecodable server event");
                }
                Some(Ok(tungstenite::Message::Ping(_) | tungstenite::Message::Pong(_))) => {}
                Some(Ok(tungstenite::Message::Close(frame))) => {
                    bail!("Connection closed: {frame:?}");
                }
                Some(Ok(other)) => bail!("Unexpected frame: {other:?}"),
                Some(Err(e)) => return Err(e.into()),
                None => bail!("Connection ended"),
            }
        }
    }

    /// Wait for the connection to close and return the close code, if any
    ///
    /// Pending events that arrive before the close frame are discarded.
    pub async fn recv_close(&mut self) -> Result<Option<u16>> {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        loop {
            let frame = timeout(deadline - tokio::time::Instant::now(), self.stream.next())
                .await
                .context("Timed out waiting for close")?;
            match frame {
                Some(Ok(tungstenite::Message::Close(frame))) => {
                    return Ok(frame.map(|f| u16::from(f.code)));
                }
                Some(Ok(_)) => {}
                Some(Err(_)) | None => return Ok(None),
            }
        }
    }

    /// Assert that no event arrives within the silence window
    pub async fn assert_silent(&mut self) -> Result<()> {
        match timeout(SILENCE_WINDOW, self.stream.next()).await {
            Err(_) => Ok(()),
            Ok(Some(Ok(frame))) => bail!("Expected silence, got frame: {frame:?}"),
            Ok(Some(Err(e))) => bail!("Expected silence, got error: {e}"),
            Ok(None) => bail!("Expected silence, connection ended"),
        }
    }

    /// Perform the identify handshake
    pub async fn identify(&mut self, token: &str) -> Result<ReadyPayload> {
        self.send(&ClientEvent::Identify(IdentifyPayload {
            token: token.to_string(),
        }))
        .await?;

        match self.recv().await? {
            ServerEvent::Ready(ready) => Ok(ready),
            other => bail!("Expected ready, got {other:?}"),
        }
    }

    /// Join a room and collect the replay and presence snapshot
    pub async fn join(&mut self, room: &str) -> Result<(Vec<ChatMessage>, Vec<RoomMember>)> {
        self.send(&ClientEvent::Join(JoinPayload {
            room: room.to_string(),
        }))
        .await?;

        let history = match self.recv().await? {
            ServerEvent::OldMessages(messages) => messages,
            other => bail!("Expected oldMessages, got {other:?}"),
        };
        let members = match self.recv().await? {
            ServerEvent::OnlineUsers(members) => members,
            other => bail!("Expected onlineUsers, got {other:?}"),
        };

        Ok((history, members))
    }

    /// Send a text message
    pub async fn send_message(&mut self, body: &str) -> Result<()> {
        self.send(&ClientEvent::SendMessage(SendMessagePayload {
            body: body.to_string(),
            kind: roomcast_core::MessageKind::Text,
        }))
        .await
    }

    /// Expect a `receiveMessage` event
    pub async fn expect_message(&mut self) -> Result<ChatMessage> {
        match self.recv().await? {
            ServerEvent::ReceiveMessage(message) => Ok(message),
            other => bail!("Expected receiveMessage, got {other:?}"),
        }
    }

    /// Expect an `onlineUsers` snapshot
    pub async fn expect_online_users(&mut self) -> Result<Vec<RoomMember>> {
        match self.recv().await? {
            ServerEvent::OnlineUsers(members) => Ok(members),
            other => bail!("Expected onlineUsers, got {other:?}"),
        }
    }

    /// Close the connection cleanly
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
