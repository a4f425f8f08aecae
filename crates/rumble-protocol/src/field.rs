//! How a single field value is read off the wire.
//!
//! The typed structs must accept exactly what the generated schemas
//! accept, or a message could pass validation and then fail to parse.
//! Two places where plain serde disagrees with the schema are handled
//! here:
//!
//! - an optional field may be omitted but never sent as `null`,
//! - an integer field accepts any JSON number with no fractional part,
//!   so `3.0` reads as `3`.
//!
//! Only types with a wire mapping implement [`WireField`]; declaring a
//! wire field of any other type does not compile.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};

/// A type that can appear as a field of a wire struct.
pub(crate) trait WireField: Sized {
    /// The value of an omitted field, or `None` when the field is required.
    fn absent() -> Option<Self> {
        None
    }

    /// Whether this value is written by omitting the field.
    fn is_absent(&self) -> bool {
        false
    }

    /// Reads a value that is present on the wire.
    fn deserialize_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error>;
}

/// Deserializes through [`WireField::deserialize_present`].
pub(crate) struct Present<T>(pub(crate) T);

impl<'de, T: WireField> Deserialize<'de> for Present<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize_present(deserializer).map(Present)
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

macro_rules! plain_wire_field {
    ($($ty:ty),*) => {
        $(
            impl WireField for $ty {
                fn deserialize_present<'de, D: Deserializer<'de>>(
                    deserializer: D,
                ) -> Result<Self, D::Error> {
                    <$ty>::deserialize(deserializer)
                }
            }
        )*
    };
}

plain_wire_field!(bool, f64, String);

/// 2^64, the first whole float past `u64::MAX`.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

struct UnsignedVisitor<T>(PhantomData<T>);

impl<'de, T: TryFrom<u64>> Visitor<'de> for UnsignedVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a non-negative integer of at most {} bits", std::mem::size_of::<T>() * 8)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        T::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::invalid_value(Unexpected::Signed(v), &self)),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<T, E> {
        if v.is_finite() && v.fract() == 0.0 && v >= 0.0 && v < U64_LIMIT {
            self.visit_u64(v as u64)
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }
}

macro_rules! unsigned_wire_field {
    ($($ty:ty),*) => {
        $(
            impl WireField for $ty {
                fn deserialize_present<'de, D: Deserializer<'de>>(
                    deserializer: D,
                ) -> Result<Self, D::Error> {
                    deserializer.deserialize_u64(UnsignedVisitor(PhantomData))
                }
            }
        )*
    };
}

unsigned_wire_field!(u32, u64);

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

impl<T: WireField> WireField for Option<T> {
    fn absent() -> Option<Self> {
        Some(None)
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }

    fn deserialize_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize_present(deserializer).map(Some)
    }
}

impl<T: WireField> WireField for Vec<T> {
    fn deserialize_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<Present<T>>::deserialize(deserializer)?;
        Ok(items.into_iter().map(|item| item.0).collect())
    }
}

impl<T: WireField> WireField for BTreeMap<String, T> {
    fn deserialize_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, Present<T>>::deserialize(deserializer)?;
        Ok(entries.into_iter().map(|(key, value)| (key, value.0)).collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn read<T: WireField>(value: serde_json::Value) -> Result<T, serde_json::Error> {
        serde_json::from_value::<Present<T>>(value).map(|p| p.0)
    }

    #[test]
    fn test_integer_accepts_whole_float() {
        assert_eq!(read::<u64>(json!(3.0)).unwrap(), 3);
        assert_eq!(read::<u32>(json!(7)).unwrap(), 7);
        assert!(read::<u64>(json!(3.5)).is_err());
        assert!(read::<u64>(json!(-1)).is_err());
        assert!(read::<u64>(json!(-0.0)).is_ok());
    }

    #[test]
    fn test_integer_range_follows_type() {
        assert!(read::<u32>(json!(4_294_967_295u64)).is_ok());
        assert!(read::<u32>(json!(4_294_967_296u64)).is_err());
        assert!(read::<u32>(json!(4_294_967_296.0)).is_err());
        assert!(read::<u64>(json!(1.8446744073709552e19)).is_err());
    }

    #[test]
    fn test_optional_refuses_null() {
        assert!(read::<Option<u64>>(json!(null)).is_err());
        assert_eq!(read::<Option<u64>>(json!(4.0)).unwrap(), Some(4));
        assert_eq!(<Option<u64> as WireField>::absent(), Some(None));
        assert_eq!(<u64 as WireField>::absent(), None);
    }

    #[test]
    fn test_containers_read_elements_as_wire_fields() {
        assert_eq!(read::<Vec<u32>>(json!([1, 2.0])).unwrap(), vec![1, 2]);
        assert!(read::<Vec<Option<u32>>>(json!([1, null])).is_err());

        let scores = read::<BTreeMap<String, u32>>(json!({ "p1": 10.0 })).unwrap();
        assert_eq!(scores["p1"], 10);
        assert!(read::<BTreeMap<String, u32>>(json!({ "p1": -1 })).is_err());
    }
}
