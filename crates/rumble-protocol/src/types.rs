//! Core wire types shared by every message.
//!
//! Primitive value types, identifiers, closed enums, and the envelope
//! that wraps every payload on the wire.

use std::fmt;
use std::marker::PhantomData;

use rumble_schema::envelope::{DATA_FIELD, TIMESTAMP_FIELD, TYPE_FIELD};
use rumble_schema::Payload;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::field::Present;

// ---------------------------------------------------------------------------
// Primitive value types
// ---------------------------------------------------------------------------

wire_struct! {
    /// A point in world space, in pixels.
    pub struct Position {
        pub x: f64 => "x",
        pub y: f64 => "y",
    }
}

wire_struct! {
    /// A velocity in pixels per second.
    pub struct Velocity {
        pub x: f64 => "x",
        pub y: f64 => "y",
    }
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

wire_id! {
    /// Server-assigned player identifier.
    pub struct PlayerId;
}

wire_id! {
    /// Identifier of a match room.
    pub struct RoomId;
}

wire_id! {
    /// Identifier of a weapon crate on the map.
    pub struct CrateId;
}

wire_id! {
    /// Identifier of an in-flight projectile.
    pub struct ProjectileId;
}

// ---------------------------------------------------------------------------
// Closed enums
// ---------------------------------------------------------------------------

wire_enum! {
    /// Every weapon a player can hold.
    pub enum WeaponType {
        Uzi => "uzi",
        Ak47 => "ak47",
        Shotgun => "shotgun",
        Katana => "katana",
        Bat => "bat",
        Pistol => "pistol",
    }
}

impl WeaponType {
    /// Melee weapons swing instead of firing projectiles.
    pub fn is_melee(self) -> bool {
        matches!(self, Self::Katana | Self::Bat)
    }
}

wire_enum! {
    /// Why a shot was refused.
    pub enum ShootFailReason {
        /// The shooter is not in the world.
        NoPlayer => "no_player",
        /// The weapon's fire interval has not elapsed.
        Cooldown => "cooldown",
        /// The magazine is empty.
        Empty => "empty",
        Reloading => "reloading",
    }
}

wire_enum! {
    /// How a match came to an end.
    pub enum MatchEndReason {
        KillTarget => "kill_target",
        TimeLimit => "time_limit",
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The wire envelope around a payload: `{ "type", "timestamp"?, "data" }`.
///
/// The discriminator is not stored; it is `T::TYPE`, written on encode and
/// checked on decode. A `timestamp` of `None` is omitted from the output.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    /// Sender clock in milliseconds since the Unix epoch.
    pub timestamp: Option<u64>,
    pub data: T,
}

impl<T: Payload> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            timestamp: None,
            data,
        }
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The discriminator this envelope is written with.
    pub fn message_type(&self) -> &'static str {
        T::TYPE
    }
}

impl<T: Payload> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 3)?;
        state.serialize_field(TYPE_FIELD, T::TYPE)?;
        match self.timestamp {
            Some(timestamp) => state.serialize_field(TIMESTAMP_FIELD, &timestamp)?,
            None => state.skip_field(TIMESTAMP_FIELD)?,
        }
        state.serialize_field(DATA_FIELD, &self.data)?;
        state.end()
    }
}

impl<'de, T: Payload> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_struct("Envelope", ENVELOPE_FIELDS, EnvelopeVisitor(PhantomData))
    }
}

const ENVELOPE_FIELDS: &[&str] = &[TYPE_FIELD, TIMESTAMP_FIELD, DATA_FIELD];

struct EnvelopeVisitor<T>(PhantomData<T>);

impl<'de, T: Payload> Visitor<'de> for EnvelopeVisitor<T> {
    type Value = Envelope<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a {:?} message envelope", T::TYPE)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut seen_type = false;
        let mut timestamp = None;
        let mut data = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                TYPE_FIELD => {
                    if seen_type {
                        return Err(de::Error::duplicate_field(TYPE_FIELD));
                    }
                    let found: String = map.next_value()?;
                    if found != T::TYPE {
                        return Err(de::Error::invalid_value(
                            de::Unexpected::Str(&found),
                            &T::TYPE,
                        ));
                    }
                    seen_type = true;
                }
                TIMESTAMP_FIELD => {
                    if timestamp.is_some() {
                        return Err(de::Error::duplicate_field(TIMESTAMP_FIELD));
                    }
                    timestamp = Some(map.next_value::<Present<u64>>()?.0);
                }
                DATA_FIELD => {
                    if data.is_some() {
                        return Err(de::Error::duplicate_field(DATA_FIELD));
                    }
                    data = Some(map.next_value::<T>()?);
                }
                other => {
                    return Err(de::Error::unknown_field(other, ENVELOPE_FIELDS));
                }
            }
        }

        if !seen_type {
            return Err(de::Error::missing_field(TYPE_FIELD));
        }
        let data = data.ok_or_else(|| de::Error::missing_field(DATA_FIELD))?;
        Ok(Envelope { timestamp, data })
    }
}
