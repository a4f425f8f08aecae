//! Integration tests for the message gate over the full protocol.

use std::sync::Arc;

use rumble::prelude::*;

fn server_gate(validate_outgoing: bool) -> MessageGate {
    let catalog = Arc::new(standard_catalog().unwrap());
    MessageGate::server(catalog, GateConfig { validate_outgoing })
}

// =========================================================================
// Round trip between a client and a server gate
// =========================================================================

#[test]
fn test_client_to_server_round_trip() {
    let catalog = Arc::new(standard_catalog().unwrap());
    let client = MessageGate::client(Arc::clone(&catalog), GateConfig { validate_outgoing: true });
    let server = MessageGate::server(catalog, GateConfig { validate_outgoing: true });

    let input = InputStateMessage::new(InputStateData {
        up: true,
        down: false,
        left: false,
        right: true,
        aim_angle: 0.25,
        is_sprinting: false,
        sequence: Some(7),
    })
    .with_timestamp(1_700_000_000_000);
    let bytes = client.seal(&input).unwrap();

    let admitted = server.admit(&bytes).unwrap();
    assert_eq!(admitted.discriminator(), "input:state");
    let decoded: InputStateMessage = admitted.parse().unwrap();
    assert_eq!(decoded, input);

    let timer = MatchTimerMessage::new(MatchTimerData { remaining_seconds: 90 });
    let bytes = server.seal(&timer).unwrap();
    let admitted = client.admit(&bytes).unwrap();
    assert!(admitted.is::<MatchTimerData>());
}

#[test]
fn test_parse_as_wrong_payload_fails() {
    let gate = server_gate(false);
    let admitted = gate
        .admit(br#"{"type":"player:reload","data":{}}"#)
        .unwrap();
    let err = admitted.parse::<PlayerShootData>().unwrap_err();
    assert!(matches!(err, ProtocolError::UnexpectedType { .. }));
}

// =========================================================================
// Rejections are per message
// =========================================================================

#[test]
fn test_rejected_message_does_not_affect_next_one() {
    let gate = server_gate(false);
    assert!(gate
        .admit(br#"{"type":"weapon:pickup_attempt","data":{"crateId":""}}"#)
        .is_err());
    assert!(gate
        .admit(br#"{"type":"weapon:pickup_attempt","data":{"crateId":"crate_3"}}"#)
        .is_ok());

    let stats = gate.stats();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.rejected, 1);
}

#[test]
fn test_unknown_member_rejected() {
    let gate = server_gate(false);
    let err = gate
        .admit(br#"{"type":"player:dodge_roll","data":{},"extra":1}"#)
        .unwrap_err();
    assert_eq!(err.rejection().map(Rejection::reason), Some("invalid"));
}

#[test]
fn test_outgoing_refusal_emits_nothing() {
    let gate = server_gate(true);
    let damaged = PlayerDamagedMessage::new(PlayerDamagedData {
        victim_id: PlayerId::new("p2").unwrap(),
        attacker_id: PlayerId::new("p1").unwrap(),
        damage: 25,
        new_health: 75,
        projectile_id: None,
    });
    assert!(gate.seal(&damaged).is_ok());

    let wrong_way = PlayerReloadMessage::new(PlayerReloadData {});
    let err = gate.seal(&wrong_way).unwrap_err();
    assert!(matches!(err, RumbleError::Rejected(Rejection::WrongDirection { .. })));
    assert_eq!(gate.stats().sealed, 1);
}

#[test]
fn test_admitted_whole_float_integers_parse() {
    let server = server_gate(false);
    let bytes = br#"{
        "type": "input:state",
        "timestamp": 5.0,
        "data": { "up": true, "down": false, "left": false, "right": false,
                  "aimAngle": 1, "isSprinting": false, "sequence": 3.0 }
    }"#;
    let admitted = server.admit(bytes).unwrap();
    let message: InputStateMessage = admitted.parse().unwrap();
    assert_eq!(message.timestamp, Some(5));
    assert_eq!(message.data.sequence, Some(3));
}

#[test]
fn test_null_optional_member_rejected_at_admit() {
    let server = server_gate(false);
    let bytes = br#"{
        "type": "input:state",
        "data": { "up": true, "down": false, "left": false, "right": false,
                  "aimAngle": 1, "isSprinting": false, "sequence": null }
    }"#;
    let err = server.admit(bytes).unwrap_err();
    assert_eq!(err.rejection().map(Rejection::reason), Some("invalid"));
}
