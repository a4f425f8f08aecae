//! Configuration errors for the schema layer.
//!
//! Everything here means the catalog itself is wrong. None of these are
//! recoverable at runtime; they stop generation, the drift check, and
//! server startup.

/// Errors raised while building a catalog or generating schemas from it.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Two entries claim the same discriminator.
    #[error("duplicate discriminator {discriminator:?}: claimed by {first} and {second}")]
    DuplicateDiscriminator {
        discriminator: &'static str,
        first: &'static str,
        second: &'static str,
    },

    /// Two documents share a name or would be written to the same artifact path.
    #[error("duplicate schema {0:?}")]
    DuplicateName(String),

    /// A discriminator is empty or contains whitespace.
    #[error("invalid discriminator {0:?}")]
    InvalidDiscriminator(&'static str),

    /// A field's type derived to a schema that constrains nothing.
    #[error("schema {schema}: field {path} has no wire mapping")]
    UnmappedFieldType { schema: &'static str, path: String },

    /// The generated document is not a schema the validator can compile.
    #[error("schema {schema} does not compile: {reason}")]
    InvalidSchema { schema: &'static str, reason: String },

    /// The canonical document could not be serialized.
    #[error("encode failed for schema {schema}: {source}")]
    Encode {
        schema: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
