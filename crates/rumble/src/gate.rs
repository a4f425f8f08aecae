//! Runtime validation at the message boundary.
//!
//! A [`MessageGate`] sits where bytes meet typed messages. Every inbound
//! message is checked against the catalog before anything else looks at
//! it; outgoing messages are checked too when [`GateConfig`] asks for it.
//!
//! ```text
//! socket bytes ──admit()──→ Admitted ──parse::<T>()──→ Envelope<T>
//! Envelope<T> ──seal()──→ socket bytes
//! ```
//!
//! A rejected message is dropped on its own. Nothing here panics or tears
//! down the connection; the caller decides what a rejection means.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rumble_protocol::{envelope_from_value, Codec, Envelope, JsonCodec, ProtocolError};
use rumble_schema::{Catalog, Direction, Payload, Rejection};
use serde_json::Value;

use crate::RumbleError;

// ---------------------------------------------------------------------------
// GateConfig
// ---------------------------------------------------------------------------

/// Environment variable that turns on outgoing validation.
pub const VALIDATION_ENV_VAR: &str = "ENABLE_SCHEMA_VALIDATION";

/// Configuration for a [`MessageGate`].
///
/// Inbound validation is always on. Outgoing validation costs a second
/// serialization per message and is meant for development builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateConfig {
    /// Validate messages in [`MessageGate::seal`] and refuse invalid ones.
    pub validate_outgoing: bool,
}

impl GateConfig {
    /// Reads `ENABLE_SCHEMA_VALIDATION`; only the exact value `true`
    /// enables outgoing validation.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            validate_outgoing: lookup(VALIDATION_ENV_VAR).as_deref() == Some("true"),
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters for a gate, read with [`MessageGate::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Inbound messages that passed validation.
    pub accepted: u64,
    /// Inbound messages dropped.
    pub rejected: u64,
    /// Outgoing messages encoded.
    pub sealed: u64,
    /// Outgoing messages refused by outgoing validation.
    pub refused: u64,
}

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    rejected: AtomicU64,
    sealed: AtomicU64,
    refused: AtomicU64,
}

// ---------------------------------------------------------------------------
// Admitted
// ---------------------------------------------------------------------------

/// An inbound message that passed validation, not yet typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Admitted {
    discriminator: &'static str,
    value: Value,
}

impl Admitted {
    /// The catalog discriminator the message was validated against.
    pub fn discriminator(&self) -> &'static str {
        self.discriminator
    }

    /// Whether this message carries payload `T`.
    pub fn is<T: Payload>(&self) -> bool {
        self.discriminator == T::TYPE
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Converts into the typed envelope for `T`.
    ///
    /// # Errors
    /// [`ProtocolError::UnexpectedType`] if the message carries another
    /// payload. A message admitted for `T` always converts: the typed
    /// decoder accepts the same numbers, optional members, and unknown
    /// member policy as the schema it was checked against.
    pub fn parse<T: Payload>(self) -> Result<Envelope<T>, ProtocolError> {
        envelope_from_value(self.value)
    }
}

// ---------------------------------------------------------------------------
// MessageGate
// ---------------------------------------------------------------------------

/// Validates messages crossing one side of the connection.
///
/// A server gate admits client-to-server messages and seals
/// server-to-client ones; a client gate does the reverse. Gates are
/// `Sync` and meant to be shared by every connection task.
#[derive(Debug)]
pub struct MessageGate<C: Codec = JsonCodec> {
    catalog: Arc<Catalog>,
    inbound: Direction,
    config: GateConfig,
    codec: C,
    counters: Counters,
}

impl MessageGate<JsonCodec> {
    /// A gate for the server side: admits client messages.
    pub fn server(catalog: Arc<Catalog>, config: GateConfig) -> Self {
        Self::with_codec(catalog, Direction::ClientToServer, config, JsonCodec)
    }

    /// A gate for the client side: admits server messages.
    pub fn client(catalog: Arc<Catalog>, config: GateConfig) -> Self {
        Self::with_codec(catalog, Direction::ServerToClient, config, JsonCodec)
    }
}

impl<C: Codec> MessageGate<C> {
    pub fn with_codec(catalog: Arc<Catalog>, inbound: Direction, config: GateConfig, codec: C) -> Self {
        Self {
            catalog,
            inbound,
            config,
            codec,
            counters: Counters::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> GateConfig {
        self.config
    }

    /// The direction this gate sends in.
    pub fn outbound(&self) -> Direction {
        match self.inbound {
            Direction::ClientToServer => Direction::ServerToClient,
            Direction::ServerToClient => Direction::ClientToServer,
        }
    }

    /// Decodes and validates one inbound message.
    ///
    /// # Errors
    /// [`RumbleError::Rejected`] when the bytes are not JSON, the
    /// discriminator is missing, unknown, or travels the wrong way, or the
    /// message breaks its schema. The message must be dropped.
    pub fn admit(&self, bytes: &[u8]) -> Result<Admitted, RumbleError> {
        match self.check_inbound(bytes) {
            Ok(admitted) => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(discriminator = admitted.discriminator, "message admitted");
                Ok(admitted)
            }
            Err(rejection) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    reason = rejection.reason(),
                    %rejection,
                    direction = %self.inbound,
                    "inbound message rejected"
                );
                Err(RumbleError::Rejected(rejection))
            }
        }
    }

    fn check_inbound(&self, bytes: &[u8]) -> Result<Admitted, Rejection> {
        let value: Value = self
            .codec
            .decode(bytes)
            .map_err(|err| Rejection::Malformed(err.to_string()))?;
        let entry = self.catalog.validate_message(Some(self.inbound), &value)?;
        Ok(Admitted {
            discriminator: entry.discriminator,
            value,
        })
    }

    /// Encodes one outgoing message.
    ///
    /// # Errors
    /// - [`RumbleError::Rejected`] when outgoing validation is on and the
    ///   message breaks its schema or travels the wrong way. Nothing is
    ///   emitted.
    /// - [`RumbleError::Protocol`] when encoding fails.
    pub fn seal<T: Payload>(&self, message: &Envelope<T>) -> Result<Vec<u8>, RumbleError> {
        if self.config.validate_outgoing {
            let value = serde_json::to_value(message).map_err(ProtocolError::Encode)?;
            if let Err(rejection) = self.catalog.validate_message(Some(self.outbound()), &value) {
                self.counters.refused.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    discriminator = T::TYPE,
                    reason = rejection.reason(),
                    %rejection,
                    "outgoing message refused"
                );
                return Err(RumbleError::Rejected(rejection));
            }
        }
        let bytes = self.codec.encode_message(message)?;
        self.counters.sealed.fetch_add(1, Ordering::Relaxed);
        Ok(bytes)
    }

    /// A snapshot of the gate's counters.
    pub fn stats(&self) -> GateStats {
        GateStats {
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            sealed: self.counters.sealed.load(Ordering::Relaxed),
            refused: self.counters.refused.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rumble_protocol::{
        standard_catalog, InputStateData, PlayerId, PlayerRespawnData, PlayerShootData,
        PlayerShootMessage, Position,
    };

    use super::*;

    fn catalog() -> Arc<Catalog> {
        Arc::new(standard_catalog().unwrap())
    }

    #[test]
    fn test_gate_config_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([(VALIDATION_ENV_VAR, "true")]);
        let on = GateConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert!(on.validate_outgoing);

        let off = GateConfig::from_lookup(|_| Some("1".into()));
        assert!(!off.validate_outgoing);
        assert_eq!(GateConfig::from_lookup(|_| None), GateConfig::default());
    }

    #[test]
    fn test_admit_valid_client_message() {
        let gate = MessageGate::server(catalog(), GateConfig::default());
        let admitted = gate
            .admit(br#"{"type":"player:shoot","timestamp":12,"data":{"aimAngle":0.5}}"#)
            .unwrap();
        assert!(admitted.is::<PlayerShootData>());
        assert!(!admitted.is::<InputStateData>());

        let message: PlayerShootMessage = admitted.parse().unwrap();
        assert_eq!(message.data.aim_angle, 0.5);
        assert_eq!(gate.stats().accepted, 1);
    }

    #[test]
    fn test_admit_rejects_and_counts() {
        let gate = MessageGate::server(catalog(), GateConfig::default());
        let cases: [(&[u8], &str); 5] = [
            (b"not json", "malformed"),
            (b"[1,2,3]", "not_an_object"),
            (br#"{"data":{}}"#, "missing_type"),
            (br#"{"type":"player:teleport","data":{}}"#, "unknown_type"),
            (br#"{"type":"player:shoot","data":{"aimAngle":"up"}}"#, "invalid"),
        ];
        for (bytes, reason) in cases {
            let err = gate.admit(bytes).unwrap_err();
            assert_eq!(err.rejection().map(Rejection::reason), Some(reason));
        }
        assert_eq!(
            gate.stats(),
            GateStats {
                rejected: 5,
                ..GateStats::default()
            }
        );
    }

    #[test]
    fn test_server_gate_refuses_server_messages_inbound() {
        let gate = MessageGate::server(catalog(), GateConfig::default());
        let err = gate
            .admit(br#"{"type":"match:timer","data":{"remainingSeconds":30}}"#)
            .unwrap_err();
        assert_eq!(err.rejection().map(Rejection::reason), Some("wrong_direction"));
    }

    #[test]
    fn test_seal_validates_when_enabled() {
        let config = GateConfig {
            validate_outgoing: true,
        };
        let gate = MessageGate::server(catalog(), config);
        let respawn = Envelope::new(PlayerRespawnData {
            player_id: PlayerId::new("p1").unwrap(),
            position: Position::new(10.0, 20.0),
            health: 100,
        });
        let bytes = gate.seal(&respawn).unwrap();
        assert!(bytes.starts_with(br#"{"type":"player:respawn""#));

        // A server never sends client messages.
        let shoot = PlayerShootMessage::new(PlayerShootData { aim_angle: 0.0 });
        let err = gate.seal(&shoot).unwrap_err();
        assert_eq!(err.rejection().map(Rejection::reason), Some("wrong_direction"));

        assert_eq!(gate.stats().sealed, 1);
        assert_eq!(gate.stats().refused, 1);
    }

    #[test]
    fn test_seal_skips_validation_when_disabled() {
        let gate = MessageGate::server(catalog(), GateConfig::default());
        let shoot = PlayerShootMessage::new(PlayerShootData { aim_angle: 0.0 });
        assert!(gate.seal(&shoot).is_ok());
        assert_eq!(gate.stats().refused, 0);
    }

    #[test]
    fn test_non_finite_number_refused_on_seal() {
        let config = GateConfig {
            validate_outgoing: true,
        };
        let gate = MessageGate::client(catalog(), config);
        let shoot = PlayerShootMessage::new(PlayerShootData { aim_angle: f64::NAN });
        // serde_json writes NaN as null, which the schema refuses.
        let err = gate.seal(&shoot).unwrap_err();
        assert!(err.rejection().is_some());
    }
}
