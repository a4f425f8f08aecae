//! Codec trait and the JSON implementation.
//!
//! A codec converts between Rust values and raw bytes. The message layer
//! only depends on the [`Codec`] trait; [`JsonCodec`] is what the browser
//! client speaks.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use rumble_schema::envelope::TYPE_FIELD;
use rumble_schema::Payload;

use crate::{Envelope, ProtocolError};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so one codec can be shared by every connection
/// task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Encodes an enveloped message.
    ///
    /// # Errors
    /// See [`Codec::encode`].
    fn encode_message<T: Payload>(&self, message: &Envelope<T>) -> Result<Vec<u8>, ProtocolError> {
        self.encode(message)
    }

    /// Decodes a message whose discriminator must be `T::TYPE`.
    ///
    /// # Errors
    /// - `ProtocolError::UnexpectedType` when the envelope names another payload.
    /// - `ProtocolError::InvalidMessage` when there is no string `type` member.
    /// - `ProtocolError::Decode` for anything else the payload type refuses.
    fn decode_message<T: Payload>(&self, data: &[u8]) -> Result<Envelope<T>, ProtocolError> {
        let value: Value = self.decode(data)?;
        envelope_from_value(value)
    }
}

/// Reads the discriminator of an undecoded message, if it has one.
pub fn message_type(value: &Value) -> Option<&str> {
    value.get(TYPE_FIELD).and_then(Value::as_str)
}

/// Converts an already-parsed message into a typed envelope.
///
/// # Errors
/// Same as [`Codec::decode_message`].
pub fn envelope_from_value<T: Payload>(value: Value) -> Result<Envelope<T>, ProtocolError> {
    let found = message_type(&value).ok_or_else(|| {
        ProtocolError::InvalidMessage(format!("missing string {TYPE_FIELD:?} member"))
    })?;
    if found != T::TYPE {
        return Err(ProtocolError::UnexpectedType {
            expected: T::TYPE,
            found: found.to_string(),
        });
    }
    serde_json::from_value(value).map_err(ProtocolError::Decode)
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use rumble_protocol::{Codec, JsonCodec, PlayerShootData, PlayerShootMessage};
///
/// let codec = JsonCodec;
/// let message = PlayerShootMessage::new(PlayerShootData { aim_angle: 0.5 });
///
/// let bytes = codec.encode_message(&message).unwrap();
/// let decoded: PlayerShootMessage = codec.decode_message(&bytes).unwrap();
/// assert_eq!(message, decoded);
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
