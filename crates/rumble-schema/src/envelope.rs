//! Envelope composition.
//!
//! Every message on the wire is `{ "type", "timestamp"?, "data" }`. The
//! enveloped schema of a catalog entry is never declared on its own; it is
//! always produced here from the payload schema, so the `data` member of a
//! message schema is the payload schema by construction.

use serde_json::{json, Value};

/// Wire name of the discriminator member.
pub const TYPE_FIELD: &str = "type";

/// Wire name of the optional sender timestamp.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Wire name of the payload member.
pub const DATA_FIELD: &str = "data";

/// Wraps `payload` in an envelope whose discriminator is pinned to `discriminator`.
pub fn message_schema(discriminator: &str, payload: &Value) -> Value {
    envelope(json!({ "type": "string", "const": discriminator }), payload.clone())
}

/// The envelope with an open discriminator and any object as payload.
///
/// This is what a receiver can assert before it knows which entry a
/// message belongs to.
pub fn generic_message_schema() -> Value {
    envelope(
        json!({ "type": "string", "minLength": 1 }),
        json!({ "type": "object" }),
    )
}

fn envelope(type_schema: Value, payload: Value) -> Value {
    let mut payload = payload;
    if let Value::Object(map) = &mut payload {
        map.insert("description".into(), "The payload.".into());
    }
    let mut discriminator = type_schema;
    if let Value::Object(map) = &mut discriminator {
        map.insert(
            "description".into(),
            "Discriminator naming the payload schema.".into(),
        );
    }

    json!({
        "description": "Envelope carrying one protocol payload.",
        "type": "object",
        "properties": {
            TYPE_FIELD: discriminator,
            TIMESTAMP_FIELD: {
                "description": "Sender clock in milliseconds.",
                "type": "integer",
                "minimum": 0,
                "maximum": u64::MAX,
            },
            DATA_FIELD: payload,
        },
        "required": [TYPE_FIELD, DATA_FIELD],
        "additionalProperties": false,
    })
}
