//! Decoded values
//!
//! [`Unboxed`] is what the rest of a VM should match on instead of raw
//! words. Decoding is total and lossless: `v.unbox().boxed() == Ok(v)` for
//! every valid word. Encoding runs the same checks as the [`BoxedValue`]
//! constructors.

use crate::error::{BoxError, BoxResult};
use crate::layout;
use crate::tag::Tag;
use crate::value::BoxedValue;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unboxed {
    Float(f64),
    Pointer(usize),
    Int(i64),
    Bool(bool),
    Null,
    /// A consumer tag (`0x5..=0xE`) with its raw payload, or a reference
    /// tag whose payload or sign its variant never sets
    Custom { tag: Tag, payload: u64, sign: bool },
}

impl Unboxed {
    /// Encode back into a word
    ///
    /// `Custom` goes through [`BoxedValue::from_tag`], so a `Custom` that
    /// names the pointer tag is still alignment-checked.
    pub fn boxed(self) -> BoxResult<BoxedValue> {
        match self {
            Unboxed::Float(f) => Ok(BoxedValue::from_float(f)),
            Unboxed::Pointer(addr) => BoxedValue::from_pointer(addr),
            Unboxed::Int(n) => BoxedValue::from_int(n),
            Unboxed::Bool(b) => Ok(BoxedValue::from_bool(b)),
            Unboxed::Null => Ok(BoxedValue::null()),
            Unboxed::Custom { tag, payload, sign } => BoxedValue::from_tag(tag, payload, sign),
        }
    }

    /// Tag this value encodes to, `None` for floats
    pub fn tag(&self) -> Option<Tag> {
        match self {
            Unboxed::Float(_) => None,
            Unboxed::Pointer(_) => Some(Tag::POINTER),
            Unboxed::Int(_) => Some(Tag::INT),
            Unboxed::Bool(false) => Some(Tag::FALSE),
            Unboxed::Bool(true) => Some(Tag::TRUE),
            Unboxed::Null => Some(Tag::NULL),
            Unboxed::Custom { tag, .. } => Some(*tag),
        }
    }
}

impl BoxedValue {
    /// Decode into the matching [`Unboxed`] variant
    pub fn unbox(self) -> Unboxed {
        let Some(tag) = self.tag() else {
            return Unboxed::Float(layout::decode_float(self.to_bits()));
        };
        let (payload, sign) = self.raw_payload();
        if !self.is_well_formed() {
            return Unboxed::Custom { tag, payload, sign };
        }
        match tag {
            Tag::POINTER => Unboxed::Pointer(payload as usize),
            Tag::INT => Unboxed::Int(layout::sign_extend(payload, sign)),
            Tag::FALSE => Unboxed::Bool(false),
            Tag::TRUE => Unboxed::Bool(true),
            Tag::NULL => Unboxed::Null,
            tag => Unboxed::Custom { tag, payload, sign },
        }
    }
}

impl From<BoxedValue> for Unboxed {
    fn from(value: BoxedValue) -> Self {
        value.unbox()
    }
}

impl TryFrom<Unboxed> for BoxedValue {
    type Error = BoxError;

    fn try_from(value: Unboxed) -> Result<Self, Self::Error> {
        value.boxed()
    }
}
