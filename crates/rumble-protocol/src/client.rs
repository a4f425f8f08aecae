//! Client → server messages.
//!
//! Everything a browser client may send. The server treats each of these
//! as untrusted input and validates it against the committed schema
//! before acting on it.

use crate::types::CrateId;

wire_payload! {
    /// Movement and aim snapshot, sent every client frame.
    pub struct InputStateData("input:state", ClientToServer) as InputStateMessage {
        pub up: bool => "up",
        pub down: bool => "down",
        pub left: bool => "left",
        pub right: bool => "right",
        /// Aim angle in radians.
        pub aim_angle: f64 => "aimAngle",
        pub is_sprinting: bool => "isSprinting",
        /// Client input counter, echoed back for reconciliation.
        pub sequence: Option<u64> => "sequence",
    }
}

wire_payload! {
    /// Fire the equipped ranged weapon.
    pub struct PlayerShootData("player:shoot", ClientToServer) as PlayerShootMessage {
        /// Aim angle in radians.
        pub aim_angle: f64 => "aimAngle",
    }
}

wire_payload! {
    /// Start reloading the equipped weapon.
    pub struct PlayerReloadData("player:reload", ClientToServer) as PlayerReloadMessage {}
}

wire_payload! {
    /// Try to pick up the weapon in a nearby crate.
    pub struct WeaponPickupAttemptData("weapon:pickup_attempt", ClientToServer) as WeaponPickupAttemptMessage {
        pub crate_id: CrateId => "crateId",
    }
}

wire_payload! {
    /// Swing the equipped melee weapon.
    pub struct PlayerMeleeAttackData("player:melee_attack", ClientToServer) as PlayerMeleeAttackMessage {
        /// Aim angle in radians.
        pub aim_angle: f64 => "aimAngle",
    }
}

wire_payload! {
    /// Start a dodge roll in the current movement direction.
    pub struct PlayerDodgeRollData("player:dodge_roll", ClientToServer) as PlayerDodgeRollMessage {}
}

#[cfg(test)]
mod tests {
    use rumble_schema::{schema_of, Direction, Payload};
    use serde_json::json;

    use crate::standard_catalog;

    use super::*;

    #[test]
    fn test_input_state_omits_absent_sequence() {
        let input = InputStateData {
            up: true,
            down: false,
            left: false,
            right: true,
            aim_angle: 1.5,
            is_sprinting: false,
            sequence: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(
            value,
            json!({
                "up": true, "down": false, "left": false, "right": true,
                "aimAngle": 1.5, "isSprinting": false
            })
        );

        let with_seq = InputStateData {
            sequence: Some(42),
            ..input
        };
        assert_eq!(serde_json::to_value(&with_seq).unwrap()["sequence"], json!(42));
    }

    #[test]
    fn test_input_state_schema_requires_all_but_sequence() {
        let schema = schema_of::<InputStateData>();
        assert_eq!(
            schema["required"],
            json!(["up", "down", "left", "right", "aimAngle", "isSprinting"])
        );
        assert_eq!(
            schema["properties"]["aimAngle"]["description"],
            "Aim angle in radians."
        );
        assert_eq!(schema["additionalProperties"], json!(false));
    }

    #[test]
    fn test_input_state_refuses_null_sequence() {
        let value = json!({
            "up": false, "down": false, "left": false, "right": false,
            "aimAngle": 0.0, "isSprinting": false, "sequence": null
        });
        assert!(serde_json::from_value::<InputStateData>(value.clone()).is_err());
        assert!(standard_catalog()
            .unwrap()
            .validate_payload(InputStateData::TYPE, &value)
            .is_err());
    }

    #[test]
    fn test_input_state_sequence_accepts_whole_float() {
        let catalog = standard_catalog().unwrap();
        let mut value = json!({
            "up": true, "down": false, "left": false, "right": false,
            "aimAngle": 0.5, "isSprinting": true, "sequence": 3.0
        });
        assert!(catalog.validate_payload(InputStateData::TYPE, &value).is_ok());
        let input: InputStateData = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(input.sequence, Some(3));

        value["sequence"] = json!(3.5);
        assert!(catalog.validate_payload(InputStateData::TYPE, &value).is_err());
        assert!(serde_json::from_value::<InputStateData>(value).is_err());
    }

    #[test]
    fn test_empty_payloads_serialize_as_empty_object() {
        assert_eq!(serde_json::to_value(PlayerReloadData {}).unwrap(), json!({}));
        assert!(serde_json::from_value::<PlayerDodgeRollData>(json!({ "x": 1 })).is_err());
    }

    #[test]
    fn test_payload_constants() {
        assert_eq!(PlayerShootData::TYPE, "player:shoot");
        assert_eq!(PlayerShootData::NAME, "PlayerShootData");
        assert_eq!(PlayerShootData::MESSAGE_NAME, "PlayerShootMessage");
        assert_eq!(PlayerShootData::DIRECTION, Direction::ClientToServer);
        assert_eq!(WeaponPickupAttemptData::TYPE, "weapon:pickup_attempt");
    }

    #[test]
    fn test_message_alias_wraps_payload() {
        let msg = PlayerShootMessage::new(PlayerShootData { aim_angle: 0.25 }).with_timestamp(99);
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({ "type": "player:shoot", "timestamp": 99, "data": { "aimAngle": 0.25 } })
        );
    }
}
