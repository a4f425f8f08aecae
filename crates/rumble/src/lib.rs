//! # Rumble
//!
//! Message contracts for the Rumble multiplayer game.
//!
//! Every message exchanged between client and server is declared once in
//! Rust. From that single declaration Rumble derives:
//!
//! - the typed structs the server uses ([`protocol`]),
//! - a catalog of every message and its direction ([`schema::Catalog`]),
//! - canonical JSON Schema artifacts for other peers ([`schema::generate`]),
//! - a drift check that fails when committed artifacts fall behind
//!   ([`drift::DriftChecker`]),
//! - a runtime gate that drops invalid messages at the boundary
//!   ([`MessageGate`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rumble::prelude::*;
//!
//! # fn main() -> Result<(), RumbleError> {
//! let catalog = Arc::new(standard_catalog()?);
//! let gate = MessageGate::server(catalog, GateConfig::from_env());
//!
//! let admitted = gate.admit(br#"{"type":"player:shoot","data":{"aimAngle":1.5}}"#)?;
//! if admitted.is::<PlayerShootData>() {
//!     let shot: PlayerShootMessage = admitted.parse()?;
//!     assert_eq!(shot.data.aim_angle, 1.5);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod gate;

pub use error::RumbleError;
pub use gate::{Admitted, GateConfig, GateStats, MessageGate, VALIDATION_ENV_VAR};

pub use rumble_drift as drift;
pub use rumble_protocol as protocol;
pub use rumble_schema as schema;

/// Common imports for working with Rumble messages.
pub mod prelude {
    pub use crate::{Admitted, GateConfig, GateStats, MessageGate, RumbleError};

    pub use rumble_protocol::{
        standard_catalog, Codec, CrateId, Envelope, JsonCodec, MatchEndReason, PlayerId, Position,
        ProjectileId, ProtocolError, RoomId, ShootFailReason, Velocity, WeaponType,
    };
    pub use rumble_protocol::client::*;
    pub use rumble_protocol::server::*;

    pub use rumble_schema::{Catalog, Direction, Payload, Rejection};
}
