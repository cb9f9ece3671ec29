//! `WordwolfServer` builder and server loop.
//!
//! This is the entry point for running a Wordwolf server. It ties together
//! all the layers: transport → protocol → session → room.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;
use wordwolf_protocol::{Codec, JsonCodec};
use wordwolf_room::{RoomConfig, RoomRegistry, WordBank};
use wordwolf_session::{SessionConfig, SessionManager};
use wordwolf_transport::{Transport, WebSocketTransport};

use crate::WordwolfError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. Each mutex
/// guards only a map of handles and is never held across a room await.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Wordwolf server.
///
/// # Example
///
/// ```rust,no_run
/// use wordwolf::WordwolfServer;
///
/// # async fn run() -> Result<(), wordwolf::WordwolfError> {
/// let server = WordwolfServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct WordwolfServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
    room_config: RoomConfig,
    word_bank: WordBank,
}

impl WordwolfServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            session_config: SessionConfig::default(),
            room_config: RoomConfig::default(),
            word_bank: WordBank::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the per-connection limits.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the configuration every new room gets.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Replaces the built-in word corpus.
    pub fn word_bank(mut self, words: WordBank) -> Self {
        self.word_bank = words;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`, which is what browser
    /// clients speak.
    pub async fn build(self) -> Result<WordwolfServer<JsonCodec>, WordwolfError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new(self.session_config)),
            registry: Mutex::new(RoomRegistry::new(
                self.room_config,
                Arc::new(self.word_bank),
            )),
            codec: JsonCodec,
        });

        Ok(WordwolfServer { transport, state })
    }
}

impl Default for WordwolfServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Wordwolf server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WordwolfServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl WordwolfServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> WordwolfServerBuilder {
        WordwolfServerBuilder::new()
    }
}

impl<C: Codec> WordwolfServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, WordwolfError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), WordwolfError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Wordwolf server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
