//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means a single message could not be turned
//! into bytes or back. It never says anything about the catalog itself;
//! those problems are `SchemaError`s from `rumble-schema`.

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing or unknown field,
    /// or a value of the wrong type.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The envelope names a different payload than the one requested.
    #[error("expected message type {expected:?}, found {found:?}")]
    UnexpectedType {
        expected: &'static str,
        found: String,
    },

    /// A value outside its type's domain: an empty identifier or an
    /// unknown enum spelling.
    #[error("invalid {kind}: {value:?}")]
    InvalidValue { kind: &'static str, value: String },

    /// The bytes decode but are not a message envelope.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
