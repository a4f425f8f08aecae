//! Wire protocol for Rumble.
//!
//! This crate defines the "language" the game client and server speak:
//!
//! - **Types** ([`Position`], [`Velocity`], identifiers, [`Envelope`]):
//!   the values every message is built from.
//! - **Messages** ([`client`], [`server`]): one payload type per
//!   discriminator, each declared exactly once.
//! - **Catalog** ([`standard_catalog`]): every message registered for
//!   schema generation, drift checking, and runtime validation.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become bytes.
//!
//! # Architecture
//!
//! ```text
//! wire_payload! ──→ struct + serde + JsonSchema + Payload
//!                          │
//!                          ├──→ standard_catalog() ──→ rumble-schema / rumble-drift
//!                          └──→ Codec ──→ bytes on the socket
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

// The declaration macros are textually scoped, so they come first.
#[macro_use]
mod macros;

mod catalog;
pub mod client;
mod codec;
mod error;
mod field;
pub mod server;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use catalog::standard_catalog;
pub use client::*;
pub use codec::{envelope_from_value, message_type, Codec, JsonCodec};
pub use error::ProtocolError;
pub use server::*;
pub use types::{
    CrateId, Envelope, MatchEndReason, PlayerId, Position, ProjectileId, RoomId,
    ShootFailReason, Velocity, WeaponType,
};
