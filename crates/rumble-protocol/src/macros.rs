//! Declaration macros for wire types.
//!
//! Every struct and enum that travels on the wire is declared exactly once,
//! through one of these macros. Each declaration expands to:
//!
//! - the Rust type itself, with public fields,
//! - its serde implementation, keyed by the wire names given in the
//!   declaration (absent optional fields are omitted, `null` and unknown
//!   fields are refused, see [`crate::field`]),
//! - its `schemars::JsonSchema` implementation, derived from the same
//!   field list, so the generated schema and the struct the game code
//!   compiles against always agree.
//!
//! ```text
//! wire_struct!   → shared value type (Position, Velocity)
//! wire_payload!  → catalog entry: payload + Payload impl + XMessage alias
//! wire_enum!     → closed string enum
//! wire_id!       → non-empty string identifier
//! ```
//!
//! Field syntax is `vis name: Type => "wireName"`. Doc comments on the type
//! and on each field become `description` entries in the schema.

/// Emits a struct with wire-named fields, its serde impls, and its schema.
///
/// Shared by `wire_struct!` and `wire_payload!`; not used directly.
macro_rules! wire_object {
    (
        $(#[doc = $doc:literal])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $fdoc:literal])*
                $fvis:vis $field:ident : $ty:ty => $wire:literal
            ),* $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, schemars::JsonSchema)]
        #[schemars(deny_unknown_fields)]
        $vis struct $name {
            $(
                $(#[doc = $fdoc])*
                #[schemars(rename = $wire)]
                $fvis $field: $ty,
            )*
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                use serde::ser::SerializeStruct;

                #[allow(unused_mut)]
                let mut state = serializer.serialize_struct(
                    stringify!($name),
                    <[&str]>::len(&[$(stringify!($field)),*]),
                )?;
                $(
                    if $crate::field::WireField::is_absent(&self.$field) {
                        state.skip_field($wire)?;
                    } else {
                        state.serialize_field($wire, &self.$field)?;
                    }
                )*
                state.end()
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                const FIELDS: &[&str] = &[$($wire),*];

                struct FieldsVisitor;

                impl<'de> serde::de::Visitor<'de> for FieldsVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                        f.write_str(concat!("struct ", stringify!($name)))
                    }

                    fn visit_map<A: serde::de::MapAccess<'de>>(
                        self,
                        mut map: A,
                    ) -> Result<$name, A::Error> {
                        $( let mut $field: Option<$ty> = None; )*

                        while let Some(key) = map.next_key::<String>()? {
                            match key.as_str() {
                                $(
                                    $wire => {
                                        if $field.is_some() {
                                            return Err(serde::de::Error::duplicate_field($wire));
                                        }
                                        $field = Some(
                                            map.next_value::<$crate::field::Present<$ty>>()?.0,
                                        );
                                    }
                                )*
                                other => {
                                    return Err(serde::de::Error::unknown_field(other, FIELDS));
                                }
                            }
                        }

                        Ok($name {
                            $(
                                $field: match $field
                                    .or_else(<$ty as $crate::field::WireField>::absent)
                                {
                                    Some(value) => value,
                                    None => return Err(serde::de::Error::missing_field($wire)),
                                },
                            )*
                        })
                    }
                }

                deserializer.deserialize_struct(stringify!($name), FIELDS, FieldsVisitor)
            }
        }

        impl $crate::field::WireField for $name {
            fn deserialize_present<'de, D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                <Self as serde::Deserialize>::deserialize(deserializer)
            }
        }
    };
}

/// Declares a shared value type, committed as its own `common` document.
///
/// ```ignore
/// wire_struct! {
///     /// 2D point in world space.
///     pub struct Position {
///         pub x: f64 => "x",
///         pub y: f64 => "y",
///     }
/// }
/// ```
macro_rules! wire_struct {
    (
        $(#[doc = $doc:literal])*
        $vis:vis struct $name:ident { $($body:tt)* }
    ) => {
        wire_object! {
            $(#[doc = $doc])*
            $vis struct $name { $($body)* }
        }

        impl rumble_schema::SharedSchema for $name {
            const NAME: &'static str = stringify!($name);
        }
    };
}

/// Declares a message payload: one catalog entry.
///
/// The header names the discriminator, the direction, and the alias for
/// the enveloped form:
///
/// ```ignore
/// wire_payload! {
///     /// Fire the equipped weapon.
///     pub struct PlayerShootData("player:shoot", ClientToServer) as PlayerShootMessage {
///         pub aim_angle: f64 => "aimAngle",
///     }
/// }
/// ```
macro_rules! wire_payload {
    (
        $(#[doc = $doc:literal])*
        $vis:vis struct $name:ident ($type:literal, $direction:ident) as $message:ident {
            $($body:tt)*
        }
    ) => {
        wire_object! {
            $(#[doc = $doc])*
            $vis struct $name { $($body)* }
        }

        impl rumble_schema::Payload for $name {
            const TYPE: &'static str = $type;
            const NAME: &'static str = stringify!($name);
            const MESSAGE_NAME: &'static str = stringify!($message);
            const DIRECTION: rumble_schema::Direction = rumble_schema::Direction::$direction;
        }

        #[doc = concat!("`", $type, "` in its envelope.")]
        $vis type $message = $crate::Envelope<$name>;
    };
}

/// Declares a closed string enum.
///
/// ```ignore
/// wire_enum! {
///     pub enum MatchEndReason {
///         KillTarget => "kill_target",
///         TimeLimit => "time_limit",
///     }
/// }
/// ```
macro_rules! wire_enum {
    (
        $(#[doc = $doc:literal])*
        $vis:vis enum $name:ident {
            $(
                $(#[doc = $vdoc:literal])*
                $variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, schemars::JsonSchema,
        )]
        $vis enum $name {
            $(
                $(#[doc = $vdoc])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire spelling of this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::ProtocolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err($crate::ProtocolError::InvalidValue {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl $crate::field::WireField for $name {
            fn deserialize_present<'de, D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                <Self as serde::Deserialize>::deserialize(deserializer)
            }
        }
    };
}

/// Declares a non-empty string identifier.
///
/// The empty string is refused at construction and on deserialization, and
/// the schema carries `minLength: 1`.
macro_rules! wire_id {
    (
        $(#[doc = $doc:literal])*
        $vis:vis struct $name:ident;
    ) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        $vis struct $name(String);

        impl $name {
            /// Wraps `id`, refusing the empty string.
            ///
            /// # Errors
            /// `ProtocolError::InvalidValue` when `id` is empty.
            pub fn new(id: impl Into<String>) -> Result<Self, $crate::ProtocolError> {
                let id = id.into();
                if id.is_empty() {
                    return Err($crate::ProtocolError::InvalidValue {
                        kind: stringify!($name),
                        value: id,
                    });
                }
                Ok(Self(id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::ProtocolError;

            fn try_from(id: String) -> Result<Self, Self::Error> {
                Self::new(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl schemars::JsonSchema for $name {
            fn schema_name() -> std::borrow::Cow<'static, str> {
                stringify!($name).into()
            }

            fn json_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
                schemars::json_schema!({
                    "type": "string",
                    "minLength": 1,
                })
            }
        }

        impl $crate::field::WireField for $name {
            fn deserialize_present<'de, D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                <Self as serde::Deserialize>::deserialize(deserializer)
            }
        }
    };
}
