//! The message catalog: every schema document the protocol commits to.
//!
//! A catalog is assembled with [`CatalogBuilder`] and validated once, in
//! [`CatalogBuilder::build`]. After that it is immutable and can be shared
//! freely between the generator, the drift checker, and the runtime gates.
//!
//! ```text
//! CatalogBuilder ──build()──→ Catalog ──documents()──→ generator / drift check
//!                  │                 └──validate_message()──→ runtime gates
//!                  └─ duplicate discriminators, names, paths,
//!                     unmapped fields, documents that do not compile
//! ```

use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry;
use std::fmt;

use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::envelope::{self, TYPE_FIELD};
use crate::generate::{generate, schema_of};
use crate::validate::{CompiledSchema, Rejection};
use crate::SchemaError;

// ---------------------------------------------------------------------------
// Direction and Group
// ---------------------------------------------------------------------------

/// Which way a message travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    ClientToServer,
    ServerToClient,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientToServer => write!(f, "client-to-server"),
            Self::ServerToClient => write!(f, "server-to-client"),
        }
    }
}

/// The artifact directory a document is committed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// Shared value types and the generic envelope.
    Common,
    ClientToServer,
    ServerToClient,
}

impl Group {
    /// Directory name relative to the schema root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::ClientToServer => "client-to-server",
            Self::ServerToClient => "server-to-client",
        }
    }
}

impl From<Direction> for Group {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::ClientToServer => Self::ClientToServer,
            Direction::ServerToClient => Self::ServerToClient,
        }
    }
}

// ---------------------------------------------------------------------------
// Traits implemented by catalog types
// ---------------------------------------------------------------------------

/// A named value type committed as its own `common` document.
pub trait SharedSchema: JsonSchema {
    /// Document name, e.g. `"Position"`.
    const NAME: &'static str;
}

/// A message payload: one catalog entry.
///
/// Implemented by the `wire_payload!` macro in `rumble-protocol`, which
/// derives every constant from the single payload declaration.
pub trait Payload: JsonSchema + Serialize + DeserializeOwned {
    /// The discriminator carried in the envelope's `type` member.
    const TYPE: &'static str;
    /// Name of the payload document, e.g. `"InputStateData"`.
    const NAME: &'static str;
    /// Name of the enveloped document, e.g. `"InputStateMessage"`.
    const MESSAGE_NAME: &'static str;
    const DIRECTION: Direction;
}

// ---------------------------------------------------------------------------
// Documents and entries
// ---------------------------------------------------------------------------

/// One schema the catalog commits to, and where its artifact lives.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    pub name: &'static str,
    pub group: Group,
    /// The document body, without `$schema` or `title`.
    pub schema: Value,
}

impl SchemaDocument {
    pub fn new(name: &'static str, group: Group, schema: Value) -> Self {
        Self { name, group, schema }
    }

    /// Path of the artifact relative to the schema root,
    /// e.g. `client-to-server/input-state-data.json`.
    pub fn artifact_path(&self) -> String {
        format!("{}/{}.json", self.group.dir_name(), kebab_case(self.name))
    }
}

/// A payload document paired with its enveloped form.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub discriminator: &'static str,
    pub direction: Direction,
    pub data: SchemaDocument,
    pub message: SchemaDocument,
}

impl CatalogEntry {
    /// Builds an entry from a payload schema. The message document is
    /// composed from it, never supplied separately.
    pub fn new(
        discriminator: &'static str,
        direction: Direction,
        data_name: &'static str,
        message_name: &'static str,
        payload: Value,
    ) -> Self {
        let group = Group::from(direction);
        let message = envelope::message_schema(discriminator, &payload);
        Self {
            discriminator,
            direction,
            data: SchemaDocument::new(data_name, group, payload),
            message: SchemaDocument::new(message_name, group, message),
        }
    }

    /// Builds the entry for a payload type.
    pub fn of<T: Payload>() -> Self {
        Self::new(T::TYPE, T::DIRECTION, T::NAME, T::MESSAGE_NAME, schema_of::<T>())
    }
}

/// Name of the generic envelope document.
pub const GENERIC_MESSAGE_NAME: &str = "Message";

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects documents and entries, then validates them as a whole.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    shared: Vec<SchemaDocument>,
    entries: Vec<CatalogEntry>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shared value type under `common/`.
    pub fn shared<T: SharedSchema>(self) -> Self {
        self.document(SchemaDocument::new(T::NAME, Group::Common, schema_of::<T>()))
    }

    /// Registers the generic envelope under `common/`.
    pub fn envelope(self) -> Self {
        self.document(SchemaDocument::new(
            GENERIC_MESSAGE_NAME,
            Group::Common,
            envelope::generic_message_schema(),
        ))
    }

    /// Registers a standalone document.
    pub fn document(mut self, document: SchemaDocument) -> Self {
        self.shared.push(document);
        self
    }

    /// Registers the entry for payload type `T`.
    pub fn entry<T: Payload>(self) -> Self {
        self.push(CatalogEntry::of::<T>())
    }

    /// Registers a prebuilt entry.
    pub fn push(mut self, entry: CatalogEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Validates the registrations and freezes them into a [`Catalog`].
    ///
    /// # Errors
    /// - [`SchemaError::InvalidDiscriminator`] for an empty discriminator
    ///   or one containing whitespace.
    /// - [`SchemaError::DuplicateDiscriminator`] when two entries share one.
    /// - [`SchemaError::DuplicateName`] when two documents share a name or
    ///   an artifact path.
    /// - [`SchemaError::UnmappedFieldType`] when a document embeds a type
    ///   with no wire representation.
    /// - [`SchemaError::InvalidSchema`] when a document does not compile.
    pub fn build(self) -> Result<Catalog, SchemaError> {
        let mut index: HashMap<&'static str, usize> = HashMap::new();
        for (position, entry) in self.entries.iter().enumerate() {
            let discriminator = entry.discriminator;
            if discriminator.is_empty() || discriminator.chars().any(char::is_whitespace) {
                return Err(SchemaError::InvalidDiscriminator(discriminator));
            }
            match index.entry(discriminator) {
                Entry::Occupied(existing) => {
                    return Err(SchemaError::DuplicateDiscriminator {
                        discriminator,
                        first: self.entries[*existing.get()].data.name,
                        second: entry.data.name,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
            }
        }

        let mut names = HashSet::new();
        let mut paths = HashSet::new();
        let documents = self
            .shared
            .iter()
            .chain(self.entries.iter().flat_map(|e| [&e.data, &e.message]));
        for document in documents {
            if !names.insert(document.name) {
                return Err(SchemaError::DuplicateName(document.name.to_string()));
            }
            let path = document.artifact_path();
            if !paths.insert(path.clone()) {
                return Err(SchemaError::DuplicateName(path));
            }
        }

        for document in &self.shared {
            CompiledSchema::compile(&generate(document)?)?;
        }
        let validators = self
            .entries
            .iter()
            .map(|entry| {
                Ok(EntryValidators {
                    data: CompiledSchema::compile(&generate(&entry.data)?)?,
                    message: CompiledSchema::compile(&generate(&entry.message)?)?,
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        tracing::debug!(
            shared = self.shared.len(),
            entries = self.entries.len(),
            "message catalog built"
        );

        Ok(Catalog {
            shared: self.shared,
            entries: self.entries,
            validators,
            index,
        })
    }
}

/// Compiled forms of one entry's documents.
#[derive(Debug, Clone)]
struct EntryValidators {
    data: CompiledSchema,
    message: CompiledSchema,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A validated, immutable set of schema documents.
///
/// Discriminators are unique within a catalog; lookups by discriminator
/// are O(1).
#[derive(Debug, Clone)]
pub struct Catalog {
    shared: Vec<SchemaDocument>,
    entries: Vec<CatalogEntry>,
    /// Parallel to `entries`.
    validators: Vec<EntryValidators>,
    index: HashMap<&'static str, usize>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// All documents in registration order: shared documents first, then
    /// each entry's payload document followed by its message document.
    pub fn documents(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.shared
            .iter()
            .chain(self.entries.iter().flat_map(|e| [&e.data, &e.message]))
    }

    /// Number of documents (and therefore artifacts).
    pub fn document_count(&self) -> usize {
        self.shared.len() + self.entries.len() * 2
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Looks up an entry by discriminator.
    pub fn entry(&self, discriminator: &str) -> Option<&CatalogEntry> {
        self.index.get(discriminator).map(|&i| &self.entries[i])
    }

    /// Entries travelling in `direction`.
    pub fn entries_for(&self, direction: Direction) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.direction == direction)
    }

    /// Checks an enveloped message and returns the entry it belongs to.
    ///
    /// When `direction` is `Some`, entries travelling the other way are
    /// refused as well.
    ///
    /// # Errors
    /// Returns a [`Rejection`] describing the first problem found. A
    /// rejected message must be dropped as a whole.
    pub fn validate_message(
        &self,
        direction: Option<Direction>,
        value: &Value,
    ) -> Result<&CatalogEntry, Rejection> {
        let object = value.as_object().ok_or(Rejection::NotAnObject)?;
        let discriminator = object
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .ok_or(Rejection::MissingDiscriminator)?;
        let position = *self
            .index
            .get(discriminator)
            .ok_or_else(|| Rejection::UnknownDiscriminator(discriminator.to_string()))?;
        let entry = &self.entries[position];

        if let Some(expected) = direction {
            if entry.direction != expected {
                return Err(Rejection::WrongDirection {
                    discriminator: entry.discriminator,
                    expected,
                });
            }
        }

        self.validators[position].message.admit(value)?;
        Ok(entry)
    }

    /// Checks a bare payload against the entry named by `discriminator`.
    ///
    /// # Errors
    /// [`Rejection::UnknownDiscriminator`] or [`Rejection::Invalid`].
    pub fn validate_payload(&self, discriminator: &str, value: &Value) -> Result<(), Rejection> {
        let position = *self
            .index
            .get(discriminator)
            .ok_or_else(|| Rejection::UnknownDiscriminator(discriminator.to_string()))?;
        self.validators[position].data.admit(value)
    }
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// Converts a document name to its artifact file stem.
///
/// `InputStateData` → `input-state-data`, `PlayerKillCreditData` →
/// `player-kill-credit-data`. Acronym runs stay together: `HTTPStatus` →
/// `http-status`.
pub fn kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) => p.is_uppercase() && next.is_some_and(char::is_lowercase),
            };
            if boundary {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else if c == '_' || c == ' ' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}
