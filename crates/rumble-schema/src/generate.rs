//! Schema generation and canonical rendering.
//!
//! Document schemas are derived from the Rust types with `schemars`
//! ([`schema_of`]). [`generate`] then turns a document into its artifact:
//! it refuses fields that derived to nothing, pins the dialect and title,
//! sorts keys, and renders. The same catalog always renders to the same
//! bytes, on every machine. Both regeneration and the drift check go
//! through [`CanonicalSchema::render`], so there is exactly one definition
//! of what an artifact should contain.

use schemars::generate::SchemaSettings;
use schemars::transform::{transform_subschemas, Transform};
use schemars::{JsonSchema, Schema};
use serde_json::{Map, Value};

use crate::{Catalog, SchemaDocument, SchemaError};

/// The JSON Schema dialect every artifact declares.
pub const SCHEMA_DIALECT: &str = "http://json-schema.org/draft-07/schema#";

/// Keywords that give a subschema a wire mapping. A subschema with none of
/// them accepts any value.
const CONSTRAINING_KEYWORDS: &[&str] = &["type", "enum", "const", "$ref", "oneOf", "anyOf", "allOf"];

/// A generated document together with its canonical bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSchema {
    pub name: &'static str,
    /// Artifact path relative to the schema root.
    pub path: String,
    pub document: Value,
    rendered: String,
}

impl CanonicalSchema {
    /// The exact bytes committed for this document: keys sorted at every
    /// depth, two-space indentation, one trailing newline.
    pub fn render(&self) -> &str {
        &self.rendered
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derives the schema of `T`, fully inlined.
///
/// Optional fields are left out of `required` and never admit `null`;
/// unsigned integers carry both bounds of their Rust type.
pub fn schema_of<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.option_nullable = false;
        s.option_add_null_type = false;
    });
    let mut generator = settings.into_generator();
    let mut schema = generator.subschema_for::<T>();
    UnsignedBounds.transform(&mut schema);
    Value::from(schema)
}

/// Adds `minimum`/`maximum` to unsigned integer schemas that lack them, so
/// the validator refuses exactly what the Rust integer cannot hold.
#[derive(Debug, Clone, Copy)]
struct UnsignedBounds;

impl Transform for UnsignedBounds {
    fn transform(&mut self, schema: &mut Schema) {
        let maximum = match schema.get("format").and_then(Value::as_str) {
            Some("uint8") => Some(u64::from(u8::MAX)),
            Some("uint16") => Some(u64::from(u16::MAX)),
            Some("uint32") => Some(u64::from(u32::MAX)),
            Some("uint64") => Some(u64::MAX),
            _ => None,
        };
        if let (Some(maximum), Some(object)) = (maximum, schema.as_object_mut()) {
            object.entry("minimum").or_insert(Value::from(0));
            object.entry("maximum").or_insert(Value::from(maximum));
        }
        transform_subschemas(self, schema);
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generates the canonical schema for one document.
///
/// # Errors
/// - [`SchemaError::UnmappedFieldType`] when some field's schema accepts
///   any value.
/// - [`SchemaError::Encode`] if serialization fails.
pub fn generate(document: &SchemaDocument) -> Result<CanonicalSchema, SchemaError> {
    if let Some(path) = find_unmapped(&document.schema, "") {
        return Err(SchemaError::UnmappedFieldType {
            schema: document.name,
            path,
        });
    }

    let mut root = document.schema.clone();
    if let Value::Object(map) = &mut root {
        map.insert("$schema".into(), Value::from(SCHEMA_DIALECT));
        map.insert("title".into(), Value::from(document.name));
    }
    let root = canonicalize(root);

    let mut rendered =
        serde_json::to_string_pretty(&root).map_err(|source| SchemaError::Encode {
            schema: document.name,
            source,
        })?;
    rendered.push('\n');

    Ok(CanonicalSchema {
        name: document.name,
        path: document.artifact_path(),
        document: root,
        rendered,
    })
}

/// Generates every document of `catalog`, in catalog order.
///
/// # Errors
/// Stops at the first document that fails; see [`generate`].
pub fn generate_catalog(catalog: &Catalog) -> Result<Vec<CanonicalSchema>, SchemaError> {
    catalog.documents().map(generate).collect()
}

/// Rebuilds `value` with object keys in lexicographic order at every depth.
///
/// `serde_json`'s default map is already ordered, but a dependency enabling
/// `preserve_order` would switch every map in the build to insertion order.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (key, value) in entries {
                sorted.insert(key, canonicalize(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Path of the first subschema that constrains nothing, if any.
///
/// Properties extend the path with their name, array items with `*` and
/// map values with `{}`. The root is reported as `/`.
fn find_unmapped(schema: &Value, path: &str) -> Option<String> {
    let here = || if path.is_empty() { "/".to_string() } else { path.to_string() };
    let object = match schema {
        Value::Object(object) => object,
        _ => return Some(here()),
    };
    if !CONSTRAINING_KEYWORDS.iter().any(|k| object.contains_key(*k)) {
        return Some(here());
    }

    if let Some(Value::Object(properties)) = object.get("properties") {
        for (name, property) in properties {
            let nested = format!("{path}/{}", name.replace('~', "~0").replace('/', "~1"));
            if let Some(found) = find_unmapped(property, &nested) {
                return Some(found);
            }
        }
    }
    if let Some(items) = object.get("items") {
        if let Some(found) = find_unmapped(items, &format!("{path}/*")) {
            return Some(found);
        }
    }
    match object.get("additionalProperties") {
        None | Some(Value::Bool(false)) => {}
        Some(values) => {
            if let Some(found) = find_unmapped(values, &format!("{path}/{{}}")) {
                return Some(found);
            }
        }
    }
    for keyword in ["oneOf", "anyOf", "allOf"] {
        if let Some(Value::Array(branches)) = object.get(keyword) {
            if let Some(found) = branches.iter().find_map(|b| find_unmapped(b, path)) {
                return Some(found);
            }
        }
    }
    None
}
