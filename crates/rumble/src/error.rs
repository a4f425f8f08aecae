//! Unified error type for Rumble.

use rumble_drift::DriftError;
use rumble_protocol::ProtocolError;
use rumble_schema::{Rejection, SchemaError};

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` attributes let `?` convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RumbleError {
    /// Encoding or decoding a message failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The catalog is misconfigured. Fatal at startup.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The drift check or regeneration could not run.
    #[error(transparent)]
    Drift(#[from] DriftError),

    /// A message failed validation at a gate. Drop that message and carry on.
    #[error("message rejected: {0}")]
    Rejected(#[from] Rejection),
}

impl RumbleError {
    /// The rejection, when this error is a validation failure.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}
