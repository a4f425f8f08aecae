//! The standard Rumble message catalog.
//!
//! Registration order is the order documents are listed, generated, and
//! checked in. Adding a message means declaring it with `wire_payload!`
//! and adding one line here.

use rumble_schema::{Catalog, SchemaError};

use crate::client::{
    InputStateData, PlayerDodgeRollData, PlayerMeleeAttackData, PlayerReloadData,
    PlayerShootData, WeaponPickupAttemptData,
};
use crate::server::{
    HitConfirmedData, MatchEndedData, MatchTimerData, MeleeHitData, PlayerDamagedData,
    PlayerDeathData, PlayerKillCreditData, PlayerMoveData, PlayerRespawnData,
    ProjectileDestroyData, ProjectileSpawnData, RoomJoinedData, ShootFailedData,
    WeaponPickupConfirmedData, WeaponRespawnedData, WeaponSpawnedData, WeaponStateData,
};
use crate::types::{Position, Velocity};

/// Builds the catalog of every message the game speaks.
///
/// # Errors
/// A [`SchemaError`] here is a programming error in the declarations
/// (duplicate discriminator, unmapped field type); callers should treat it
/// as fatal at startup.
pub fn standard_catalog() -> Result<Catalog, SchemaError> {
    Catalog::builder()
        // Common
        .shared::<Position>()
        .shared::<Velocity>()
        .envelope()
        // Client → server
        .entry::<InputStateData>()
        .entry::<PlayerShootData>()
        .entry::<PlayerReloadData>()
        .entry::<WeaponPickupAttemptData>()
        .entry::<PlayerMeleeAttackData>()
        .entry::<PlayerDodgeRollData>()
        // Server → client
        .entry::<RoomJoinedData>()
        .entry::<PlayerMoveData>()
        .entry::<ProjectileSpawnData>()
        .entry::<ProjectileDestroyData>()
        .entry::<WeaponStateData>()
        .entry::<ShootFailedData>()
        .entry::<PlayerDamagedData>()
        .entry::<HitConfirmedData>()
        .entry::<PlayerDeathData>()
        .entry::<PlayerKillCreditData>()
        .entry::<PlayerRespawnData>()
        .entry::<MeleeHitData>()
        .entry::<MatchTimerData>()
        .entry::<MatchEndedData>()
        .entry::<WeaponSpawnedData>()
        .entry::<WeaponPickupConfirmedData>()
        .entry::<WeaponRespawnedData>()
        .build()
}
