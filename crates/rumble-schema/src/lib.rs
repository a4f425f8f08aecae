//! Schema layer for Rumble.
//!
//! This crate owns the contract between the Rust message types and the
//! JSON Schema artifacts a client is checked against:
//!
//! - **Derivation** ([`schema_of`]): document bodies derived from the Rust
//!   types with `schemars`.
//! - **Catalog** ([`Catalog`], [`CatalogBuilder`]): the registered
//!   documents, validated once for duplicate discriminators, names, and
//!   unmapped types.
//! - **Generator** ([`generate`], [`CanonicalSchema`]): deterministic,
//!   canonical JSON Schema rendering.
//! - **Validator** ([`CompiledSchema`], [`Rejection`]): the generated
//!   documents compiled with `jsonschema` and run against live values.
//!
//! # Architecture
//!
//! ```text
//! Rust types ──schema_of()──→ Catalog ──generate()──→ artifact bytes
//!                               │            └──compile──→ CompiledSchema
//!                               └──validate_message()──→ accept / reject
//! ```
//!
//! It knows nothing about files or sockets; `rumble-drift` stores the
//! artifacts and `rumble` wires validation into message boundaries.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod catalog;
pub mod envelope;
mod error;
mod generate;
mod validate;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use catalog::{
    kebab_case, Catalog, CatalogBuilder, CatalogEntry, Direction, Group, Payload,
    SchemaDocument, SharedSchema, GENERIC_MESSAGE_NAME,
};
pub use error::SchemaError;
pub use generate::{
    canonicalize, generate, generate_catalog, schema_of, CanonicalSchema, SCHEMA_DIALECT,
};
pub use validate::{CompiledSchema, Rejection, Violation};
