//! Serialization of boxed values
//!
//! A [`BoxedValue`] serializes as its raw word. Deserialization goes through
//! [`BoxedValue::from_bits`], so a corrupted snapshot cannot smuggle a
//! non-canonical NaN or a misaligned pointer word back into a VM.
//!
//! Pointer words round-trip as bare addresses. They only mean something
//! inside the process that produced them.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::BoxedValue;

impl Serialize for BoxedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.to_bits())
    }
}

impl<'de> Deserialize<'de> for BoxedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u64::deserialize(deserializer)?;
        BoxedValue::from_bits(bits).map_err(D::Error::custom)
    }
}
