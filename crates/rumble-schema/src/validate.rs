//! Runtime validation against the generated documents.
//!
//! This is the predicate both ends of the connection run before trusting a
//! value: the receiver to defend against a hostile or out-of-date peer, the
//! sender to catch its own authoring mistakes. Each document is compiled
//! once, when the catalog is built, from the exact JSON that is committed
//! as its artifact. The first error found rejects the whole value.

use std::fmt;
use std::sync::Arc;

use jsonschema::Validator;
use serde_json::Value;

use crate::catalog::Direction;
use crate::generate::CanonicalSchema;
use crate::SchemaError;

// ---------------------------------------------------------------------------
// Violation
// ---------------------------------------------------------------------------

/// Why a value failed its schema, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending value. Empty for the root.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{} at {}", self.message, path)
    }
}

impl std::error::Error for Violation {}

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

/// Why a whole message was refused at a boundary.
///
/// Rejections are per-message: the caller drops the message and carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The bytes were not JSON.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The message is JSON but not an object.
    #[error("message is not an object")]
    NotAnObject,

    /// The `type` member is absent or not a string.
    #[error("message has no discriminator")]
    MissingDiscriminator,

    /// The discriminator names no catalog entry.
    #[error("unknown message type {0:?}")]
    UnknownDiscriminator(String),

    /// The entry exists but travels the other way.
    #[error("message type {discriminator:?} is not valid {expected}")]
    WrongDirection {
        discriminator: &'static str,
        expected: Direction,
    },

    /// The message failed its schema.
    #[error("{schema}: {violation}")]
    Invalid {
        schema: &'static str,
        violation: Violation,
    },
}

impl Rejection {
    /// A short, stable label suitable for counters and log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::NotAnObject => "not_an_object",
            Self::MissingDiscriminator => "missing_type",
            Self::UnknownDiscriminator(_) => "unknown_type",
            Self::WrongDirection { .. } => "wrong_direction",
            Self::Invalid { .. } => "invalid",
        }
    }
}

// ---------------------------------------------------------------------------
// CompiledSchema
// ---------------------------------------------------------------------------

/// A generated document compiled for validation.
///
/// Clones share the compiled form.
#[derive(Clone)]
pub struct CompiledSchema {
    name: &'static str,
    validator: Arc<Validator>,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// Compiles `schema.document`.
    ///
    /// # Errors
    /// [`SchemaError::InvalidSchema`] when the document is not valid JSON
    /// Schema.
    pub fn compile(schema: &CanonicalSchema) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::validator_for(&schema.document).map_err(|e| SchemaError::InvalidSchema {
                schema: schema.name,
                reason: e.to_string(),
            })?;
        Ok(Self {
            name: schema.name,
            validator: Arc::new(validator),
        })
    }

    /// Name of the document this was compiled from.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Checks `value`.
    ///
    /// # Errors
    /// The first [`Violation`] reported by the validator.
    pub fn validate(&self, value: &Value) -> Result<(), Violation> {
        match self.validator.iter_errors(value).next() {
            None => Ok(()),
            Some(error) => Err(Violation {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            }),
        }
    }

    /// Checks `value`, naming this document in the rejection.
    pub(crate) fn admit(&self, value: &Value) -> Result<(), Rejection> {
        self.validate(value).map_err(|violation| Rejection::Invalid {
            schema: self.name,
            violation,
        })
    }
}
