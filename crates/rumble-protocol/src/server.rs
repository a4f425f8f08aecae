//! Server → client messages.
//!
//! State broadcasts, combat events, match lifecycle, and weapon crates.
//! Clients validate these on receipt; the server validates them before
//! sending when outgoing validation is enabled.

use std::collections::BTreeMap;

use crate::types::{
    CrateId, MatchEndReason, PlayerId, Position, ProjectileId, RoomId, ShootFailReason,
    Velocity, WeaponType,
};

// ---------------------------------------------------------------------------
// Snapshots embedded in broadcasts
// ---------------------------------------------------------------------------

wire_object! {
    /// One player's authoritative state in a `player:move` broadcast.
    pub struct PlayerSnapshot {
        pub id: PlayerId => "id",
        pub position: Position => "position",
        pub velocity: Velocity => "velocity",
        /// Aim angle in radians.
        pub aim_angle: f64 => "aimAngle",
        /// Current health, 0 to 100.
        pub health: u32 => "health",
        /// Spawn protection is active.
        pub is_invulnerable: bool => "isInvulnerable",
        /// When spawn protection ends, in milliseconds since the Unix epoch.
        pub invulnerability_end: u64 => "invulnerabilityEnd",
        /// When the player died; absent while alive.
        pub death_time: Option<u64> => "deathTime",
        pub kills: u32 => "kills",
        pub deaths: u32 => "deaths",
        pub xp: u32 => "xp",
        pub is_regenerating: bool => "isRegenerating",
    }
}

wire_object! {
    /// A weapon crate as listed in `weapon:spawned`.
    pub struct CrateSnapshot {
        pub id: CrateId => "id",
        pub position: Position => "position",
        pub weapon_type: WeaponType => "weaponType",
        pub is_available: bool => "isAvailable",
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

wire_payload! {
    /// The player was placed in a room.
    pub struct RoomJoinedData("room:joined", ServerToClient) as RoomJoinedMessage {
        pub player_id: PlayerId => "playerId",
        pub room_id: Option<RoomId> => "roomId",
    }
}

// ---------------------------------------------------------------------------
// World state
// ---------------------------------------------------------------------------

wire_payload! {
    /// Authoritative positions of every player, broadcast each tick.
    pub struct PlayerMoveData("player:move", ServerToClient) as PlayerMoveMessage {
        pub players: Vec<PlayerSnapshot> => "players",
    }
}

wire_payload! {
    pub struct ProjectileSpawnData("projectile:spawn", ServerToClient) as ProjectileSpawnMessage {
        pub id: ProjectileId => "id",
        pub owner_id: PlayerId => "ownerId",
        pub position: Position => "position",
        pub velocity: Velocity => "velocity",
    }
}

wire_payload! {
    pub struct ProjectileDestroyData("projectile:destroy", ServerToClient) as ProjectileDestroyMessage {
        pub id: ProjectileId => "id",
    }
}

// ---------------------------------------------------------------------------
// Weapons and combat
// ---------------------------------------------------------------------------

wire_payload! {
    /// Ammunition state of the receiving player's weapon.
    pub struct WeaponStateData("weapon:state", ServerToClient) as WeaponStateMessage {
        pub current_ammo: u32 => "currentAmmo",
        pub max_ammo: u32 => "maxAmmo",
        pub is_reloading: bool => "isReloading",
        pub can_shoot: bool => "canShoot",
    }
}

wire_payload! {
    /// A `player:shoot` was refused.
    pub struct ShootFailedData("shoot:failed", ServerToClient) as ShootFailedMessage {
        pub reason: ShootFailReason => "reason",
    }
}

wire_payload! {
    pub struct PlayerDamagedData("player:damaged", ServerToClient) as PlayerDamagedMessage {
        pub victim_id: PlayerId => "victimId",
        pub attacker_id: PlayerId => "attackerId",
        pub damage: u32 => "damage",
        pub new_health: u32 => "newHealth",
        /// Absent for melee hits.
        pub projectile_id: Option<ProjectileId> => "projectileId",
    }
}

wire_payload! {
    /// Sent to the attacker when one of their hits lands.
    pub struct HitConfirmedData("hit:confirmed", ServerToClient) as HitConfirmedMessage {
        pub victim_id: PlayerId => "victimId",
        pub damage: u32 => "damage",
        pub projectile_id: Option<ProjectileId> => "projectileId",
    }
}

wire_payload! {
    pub struct PlayerDeathData("player:death", ServerToClient) as PlayerDeathMessage {
        pub victim_id: PlayerId => "victimId",
        pub attacker_id: PlayerId => "attackerId",
    }
}

wire_payload! {
    /// Updated totals for the player credited with a kill.
    pub struct PlayerKillCreditData("player:kill_credit", ServerToClient) as PlayerKillCreditMessage {
        pub killer_id: PlayerId => "killerId",
        pub victim_id: PlayerId => "victimId",
        pub killer_kills: u32 => "killerKills",
        pub killer_xp: u32 => "killerXP",
    }
}

wire_payload! {
    pub struct PlayerRespawnData("player:respawn", ServerToClient) as PlayerRespawnMessage {
        pub player_id: PlayerId => "playerId",
        pub position: Position => "position",
        pub health: u32 => "health",
    }
}

wire_payload! {
    /// A melee swing resolved. Broadcast even with no victims so clients
    /// can play the swing.
    pub struct MeleeHitData("melee:hit", ServerToClient) as MeleeHitMessage {
        pub attacker_id: PlayerId => "attackerId",
        pub victims: Vec<PlayerId> => "victims",
        pub knockback_applied: bool => "knockbackApplied",
    }
}

// ---------------------------------------------------------------------------
// Match lifecycle
// ---------------------------------------------------------------------------

wire_payload! {
    pub struct MatchTimerData("match:timer", ServerToClient) as MatchTimerMessage {
        pub remaining_seconds: u32 => "remainingSeconds",
    }
}

wire_payload! {
    pub struct MatchEndedData("match:ended", ServerToClient) as MatchEndedMessage {
        pub winners: Vec<PlayerId> => "winners",
        /// Kills per player id.
        pub final_scores: BTreeMap<String, u32> => "finalScores",
        pub reason: MatchEndReason => "reason",
    }
}

// ---------------------------------------------------------------------------
// Weapon crates
// ---------------------------------------------------------------------------

wire_payload! {
    /// Every crate on the map, sent once when a player joins.
    pub struct WeaponSpawnedData("weapon:spawned", ServerToClient) as WeaponSpawnedMessage {
        pub crates: Vec<CrateSnapshot> => "crates",
    }
}

wire_payload! {
    pub struct WeaponPickupConfirmedData("weapon:pickup_confirmed", ServerToClient) as WeaponPickupConfirmedMessage {
        pub player_id: PlayerId => "playerId",
        pub crate_id: CrateId => "crateId",
        pub weapon_type: WeaponType => "weaponType",
        /// When the crate refills, in seconds since the Unix epoch.
        pub next_respawn_time: u64 => "nextRespawnTime",
    }
}

wire_payload! {
    pub struct WeaponRespawnedData("weapon:respawned", ServerToClient) as WeaponRespawnedMessage {
        pub crate_id: CrateId => "crateId",
        pub weapon_type: WeaponType => "weaponType",
        pub position: Position => "position",
    }
}

#[cfg(test)]
mod tests {
    use rumble_schema::Payload;
    use serde_json::{json, Value};

    use super::*;
    use crate::standard_catalog;

    fn check<T: Payload>(value: &Value) -> Result<(), rumble_schema::Rejection> {
        standard_catalog().unwrap().validate_payload(T::TYPE, value)
    }

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id).unwrap()
    }

    #[test]
    fn test_player_damaged_without_projectile() {
        let data = PlayerDamagedData {
            victim_id: pid("p2"),
            attacker_id: pid("p1"),
            damage: 25,
            new_health: 75,
            projectile_id: None,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("projectileId").is_none());
        assert!(check::<PlayerDamagedData>(&value).is_ok());
    }

    #[test]
    fn test_match_ended_scores_record() {
        let data = MatchEndedData {
            winners: vec![pid("p1")],
            final_scores: BTreeMap::from([("p1".to_string(), 20), ("p2".to_string(), 7)]),
            reason: MatchEndReason::KillTarget,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["finalScores"], json!({ "p1": 20, "p2": 7 }));
        assert_eq!(value["reason"], json!("kill_target"));
        assert!(check::<MatchEndedData>(&value).is_ok());
    }

    #[test]
    fn test_match_ended_rejects_negative_score() {
        let value = json!({ "winners": [], "finalScores": { "p1": -1 }, "reason": "time_limit" });
        match check::<MatchEndedData>(&value).unwrap_err() {
            rumble_schema::Rejection::Invalid { violation, .. } => {
                assert_eq!(violation.path, "/finalScores/p1");
            }
            other => panic!("unexpected rejection: {other}"),
        }
        assert!(serde_json::from_value::<MatchEndedData>(value).is_err());
    }

    #[test]
    fn test_score_key_with_slash_escaped_in_path() {
        let value = json!({ "winners": [], "finalScores": { "red/1": "ten" }, "reason": "time_limit" });
        match check::<MatchEndedData>(&value).unwrap_err() {
            rumble_schema::Rejection::Invalid { violation, .. } => {
                assert_eq!(violation.path, "/finalScores/red~11");
            }
            other => panic!("unexpected rejection: {other}"),
        }
    }

    #[test]
    fn test_weapon_spawned_snapshot_round_trip() {
        let data = WeaponSpawnedData {
            crates: vec![CrateSnapshot {
                id: CrateId::new("crate-0").unwrap(),
                position: Position::new(480.0, 270.0),
                weapon_type: WeaponType::Shotgun,
                is_available: true,
            }],
        };
        let value = serde_json::to_value(&data).unwrap();
        assert!(check::<WeaponSpawnedData>(&value).is_ok());
        let back: WeaponSpawnedData = serde_json::from_value(value).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_shoot_failed_rejects_unknown_reason() {
        let value = json!({ "reason": "jammed" });
        assert!(check::<ShootFailedData>(&value).is_err());
        assert!(serde_json::from_value::<ShootFailedData>(value).is_err());
    }
}
