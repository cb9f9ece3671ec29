//! Error types for the protocol layer.
//!
//! Each crate in Wordwolf defines its own error enum. A `ProtocolError`
//! always means the bytes a client sent could not be understood; it never
//! says anything about game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The frame is not a `{type, payload}` envelope at all.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The `type` is known but its payload has the wrong shape.
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The `type` is not one the server understands.
    #[error("unknown message type: {0}")]
    UnknownType(String),
}

impl ProtocolError {
    /// The text sent back to the client in an `ERROR` message.
    ///
    /// Kept free of serde internals; those only go to the logs.
    pub fn client_message(&self) -> String {
        match self {
            Self::Encode(_) => "Internal error".to_string(),
            Self::Decode(_) => "Invalid message format".to_string(),
            Self::InvalidPayload { kind, .. } => format!("Invalid {kind} payload"),
            Self::UnknownType(kind) => format!("Unknown message type: {kind}"),
        }
    }
}
