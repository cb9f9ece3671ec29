//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" converts between Rust types and raw bytes. The server only
//! holds something that implements [`Codec`]; today that is always
//! [`JsonCodec`], which is what browser clients speak.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ClientCommand, ProtocolError, RawCommand, ServerMessage};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so one instance can sit in shared server state
/// and be used from every connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes one inbound client frame.
    ///
    /// # Errors
    /// `Decode` when the frame is not an envelope, `InvalidPayload` when
    /// the payload doesn't fit its type, `UnknownType` otherwise.
    fn decode_command(&self, data: &[u8]) -> Result<ClientCommand, ProtocolError> {
        let raw: RawCommand = self.decode(data)?;
        ClientCommand::try_from(raw)
    }

    /// Encodes one outbound server message.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode_message(&self, msg: &ServerMessage) -> Result<Vec<u8>, ProtocolError> {
        self.encode(msg)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use wordwolf_protocol::{ClientCommand, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let cmd = codec.decode_command(br#"{"type":"ADD_BOT"}"#).unwrap();
/// assert_eq!(cmd, ClientCommand::AddBot);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
