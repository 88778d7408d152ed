//! NaN-Boxed Values
//!
//! Encodes every runtime value a VM needs into 8 bytes using IEEE 754
//! NaN-boxing. See [`layout`](crate::layout) for the word format.
//!
//! ## Encoding Scheme
//!
//! ```text
//! Float:    any double whose exponent is not 0x7FF, plus the reserved block
//!           0x7FFF_0000_0000_0000  +Infinity
//!           0xFFFF_0000_0000_0000  -Infinity
//!           0x7FFF_0000_0000_0001  canonical NaN
//! Tagged:   s111_1111_1111_TTTT_PPPP...PPPP
//!                          ^^^^-- 4-bit type tag (0x0..=0xE)
//!                               ^^^^^^^^^^^-- 48-bit payload
//! ```
//!
//! ## Reference Tags
//!
//! - 0x0: Pointer (8-byte aligned, 48-bit address)
//! - 0x1: Int (48 payload bits + sign bit, range ±2^48)
//! - 0x2 / 0x3: false / true
//! - 0x4: Null
//! - 0x5..=0xE: free for the embedding VM
//!
//! Booleans and null carry an empty payload and a clear sign bit, and a
//! pointer never sets the sign bit. [`BoxedValue::from_tagged`] will still
//! build a word that breaks those rules; such a word decodes as
//! [`Unboxed::Custom`](crate::Unboxed::Custom) and the typed accessors reject
//! it with [`BoxError::MalformedReference`].
//!
//! ## Float Handling
//!
//! Hardware Infinity lands on tag 0x0 and hardware NaNs land on arbitrary
//! tags, so [`BoxedValue::from_float`] moves both into the reserved 0xF block.
//! Every NaN collapses to one canonical word.

use std::fmt;

use crate::error::{BoxError, BoxResult, Kind};
use crate::layout::{
    self, CANONICAL_NAN, FLOAT_TAG, NEGATIVE_INFINITY, PAYLOAD_MASK, POINTER_ALIGN_MASK,
    POSITIVE_INFINITY,
};
use crate::tag::Tag;
use crate::unboxed::Unboxed;

// =============================================================================
// Constants
// =============================================================================

/// Largest boxable integer: 2^48 - 1
pub const MAX_INT: i64 = (1 << 48) - 1;

/// Smallest boxable integer: -2^48
pub const MIN_INT: i64 = -(1 << 48);

/// Largest boxable address
pub const MAX_ADDRESS: usize = PAYLOAD_MASK as usize;

// =============================================================================
// BoxedValue
// =============================================================================

/// An 8-byte NaN-boxed value
///
/// A plain word: copy it freely, compare it bitwise. Whatever a pointer
/// payload refers to is owned by the caller, never by the value.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxedValue(u64);

impl BoxedValue {
    // =========================================================================
    // Type Checking
    // =========================================================================

    /// Check if this value is a float (including ±Infinity and NaN)
    #[inline(always)]
    pub fn is_float(self) -> bool {
        layout::is_float_bits(self.0)
    }

    /// Check if this value is a tagged (non-float) value
    #[inline(always)]
    pub fn is_tagged(self) -> bool {
        !self.is_float()
    }

    /// The type tag, or `None` for floats
    #[inline(always)]
    pub fn tag(self) -> Option<Tag> {
        if self.is_float() {
            None
        } else {
            Some(Tag::of_word(self.0))
        }
    }

    pub fn kind(self) -> Kind {
        match self.tag() {
            None => Kind::Float,
            Some(tag) if tag.is_bool() => Kind::Bool,
            Some(tag) => Kind::Variant(tag),
        }
    }

    /// Check if this is a tagged value carrying `tag`
    #[inline(always)]
    pub fn has_tag(self, tag: Tag) -> bool {
        self.tag() == Some(tag)
    }

    #[inline(always)]
    pub fn is_pointer(self) -> bool {
        self.has_tag(Tag::POINTER)
    }

    #[inline(always)]
    pub fn is_int(self) -> bool {
        self.has_tag(Tag::INT)
    }

    #[inline(always)]
    pub fn is_bool(self) -> bool {
        self.tag().is_some_and(Tag::is_bool)
    }

    #[inline(always)]
    pub fn is_null(self) -> bool {
        self.has_tag(Tag::NULL)
    }

    // =========================================================================
    // Encoding (Creating BoxedValue)
    // =========================================================================

    /// Create a NaN-boxed float
    ///
    /// Total over `f64`. Every NaN is canonicalized and ±Infinity is moved
    /// into the reserved float block; all other doubles keep their bits.
    #[inline(always)]
    pub fn from_float(f: f64) -> Self {
        if f.is_nan() {
            BoxedValue(CANONICAL_NAN)
        } else if f.is_infinite() {
            if f.is_sign_negative() {
                BoxedValue(NEGATIVE_INFINITY)
            } else {
                BoxedValue(POSITIVE_INFINITY)
            }
        } else {
            BoxedValue(f.to_bits())
        }
    }

    /// Create a tagged value from a raw tag, payload and sign bit
    ///
    /// Fails with `InvalidTag` for tag 0xF and up, `PayloadOverflow` if the
    /// payload needs more than 48 bits, and `MisalignedPointer` if the tag is
    /// the pointer tag and the payload is not 8-byte aligned.
    pub fn from_tagged(tag: u8, payload: u64, sign: bool) -> BoxResult<Self> {
        Self::from_tag(Tag::new(tag)?, payload, sign)
    }

    /// Same as [`from_tagged`](Self::from_tagged) with an already validated tag.
    pub fn from_tag(tag: Tag, payload: u64, sign: bool) -> BoxResult<Self> {
        if !layout::fits_payload(payload) {
            return Err(BoxError::PayloadOverflow(payload));
        }
        if tag == Tag::POINTER && payload & POINTER_ALIGN_MASK != 0 {
            return Err(BoxError::MisalignedPointer(payload));
        }
        Ok(BoxedValue(layout::compose(tag.get(), payload, sign)))
    }

    /// Create a NaN-boxed pointer from an address
    ///
    /// The address must fit in 48 bits and be 8-byte aligned.
    pub fn from_pointer(addr: usize) -> BoxResult<Self> {
        Self::from_tag(Tag::POINTER, addr as u64, false)
    }

    /// Create a NaN-boxed pointer from a raw pointer
    ///
    /// Only the address is stored. The pointee's lifetime is the caller's
    /// business.
    pub fn from_ptr<T>(ptr: *const T) -> BoxResult<Self> {
        Self::from_pointer(ptr as usize)
    }

    /// Create a NaN-boxed integer
    ///
    /// The payload holds the low 48 bits of the two's complement and the
    /// sign bit records `n < 0`, giving the range `[-2^48, 2^48 - 1]`.
    pub fn from_int(n: i64) -> BoxResult<Self> {
        if !(MIN_INT..=MAX_INT).contains(&n) {
            return Err(BoxError::PayloadOverflow(n as u64));
        }
        let payload = (n as u64) & PAYLOAD_MASK;
        Ok(BoxedValue(layout::compose(Tag::INT.get(), payload, n < 0)))
    }

    /// Create a NaN-boxed boolean
    ///
    /// The truth value is the tag; the payload stays empty.
    #[inline(always)]
    pub fn from_bool(b: bool) -> Self {
        let tag = if b { Tag::TRUE } else { Tag::FALSE };
        BoxedValue(layout::compose(tag.get(), 0, false))
    }

    /// The null value
    #[inline(always)]
    pub const fn null() -> Self {
        BoxedValue(layout::compose(Tag::NULL.get(), 0, false))
    }

    // =========================================================================
    // Decoding (Extracting values)
    // =========================================================================

    fn mismatch(self, expected: Kind) -> BoxError {
        BoxError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    /// Extract a float value
    ///
    /// Words in the reserved block decode to the IEEE special they stand
    /// for, so `from_float(v.as_float()?) == v` for every float word.
    #[inline(always)]
    pub fn as_float(self) -> BoxResult<f64> {
        if self.is_float() {
            Ok(layout::decode_float(self.0))
        } else {
            Err(self.mismatch(Kind::Float))
        }
    }

    /// Extract the raw 48-bit payload and the sign bit of a tagged value
    ///
    /// Interpretation is left to the caller.
    #[inline(always)]
    pub fn payload(self) -> BoxResult<(u64, bool)> {
        if self.is_float() {
            Err(self.mismatch(Kind::Tagged))
        } else {
            Ok(self.raw_payload())
        }
    }

    #[inline(always)]
    pub(crate) fn raw_payload(self) -> (u64, bool) {
        (layout::payload_bits(self.0), layout::sign_bit(self.0))
    }

    /// Extract the payload and sign bit of a value carrying `tag`
    ///
    /// Fails with `TypeMismatch` naming `tag` for floats and for every other
    /// tag. This is the accessor for consumer tags.
    pub fn payload_of(self, tag: Tag) -> BoxResult<(u64, bool)> {
        if self.has_tag(tag) {
            Ok(self.raw_payload())
        } else {
            Err(self.mismatch(Kind::Variant(tag)))
        }
    }

    /// Extract the payload of a value carrying `tag`, sign-extended from
    /// the sign bit
    pub fn signed_payload_of(self, tag: Tag) -> BoxResult<i64> {
        let (payload, sign) = self.payload_of(tag)?;
        Ok(layout::sign_extend(payload, sign))
    }

    /// `false` for a reference-tagged word with bits its variant never sets
    pub(crate) fn is_well_formed(self) -> bool {
        let (payload, sign) = self.raw_payload();
        match self.tag() {
            Some(Tag::POINTER) => !sign,
            Some(Tag::FALSE | Tag::TRUE | Tag::NULL) => payload == 0 && !sign,
            _ => true,
        }
    }

    /// Extract a pointer address, zero-extended to `usize`
    pub fn as_pointer(self) -> BoxResult<usize> {
        let (addr, sign) = self.payload_of(Tag::POINTER)?;
        if sign {
            return Err(BoxError::MalformedReference(self.0));
        }
        Ok(addr as usize)
    }

    /// Extract a raw pointer
    ///
    /// Producing the pointer is safe; dereferencing it is only sound while
    /// the owner of the pointee keeps it alive.
    pub fn as_ptr<T>(self) -> BoxResult<*const T> {
        self.as_pointer().map(|addr| addr as *const T)
    }

    /// Extract an integer value, sign-extended from the sign bit
    pub fn as_int(self) -> BoxResult<i64> {
        self.signed_payload_of(Tag::INT)
    }

    /// Extract a boolean value
    ///
    /// A boolean-tagged word with a payload or sign bit is rejected rather
    /// than read as truthy.
    pub fn as_bool(self) -> BoxResult<bool> {
        match self.tag() {
            Some(tag) if tag.is_bool() && self.is_well_formed() => Ok(tag == Tag::TRUE),
            Some(tag) if tag.is_bool() => Err(BoxError::MalformedReference(self.0)),
            _ => Err(self.mismatch(Kind::Bool)),
        }
    }

    // =========================================================================
    // Raw Access
    // =========================================================================

    /// Get the raw 64-bit representation
    #[inline(always)]
    pub fn to_bits(self) -> u64 {
        self.0
    }

    /// Create from a raw 64-bit representation, rejecting words no
    /// constructor could have produced
    pub fn from_bits(bits: u64) -> BoxResult<Self> {
        Self::check_bits(bits)?;
        Ok(BoxedValue(bits))
    }

    /// Create from a raw 64-bit representation without validation
    ///
    /// # Safety
    /// The bits must satisfy [`is_valid_bits`](Self::is_valid_bits). Code
    /// that trusts a pointer-tagged word to hold an aligned address, or a
    /// float word to be canonical, relies on it.
    #[inline(always)]
    pub const unsafe fn from_bits_unchecked(bits: u64) -> Self {
        BoxedValue(bits)
    }

    /// `true` if `bits` could have come out of one of the constructors
    pub fn is_valid_bits(bits: u64) -> bool {
        Self::check_bits(bits).is_ok()
    }

    fn check_bits(bits: u64) -> BoxResult<()> {
        if !layout::exponent_all_ones(bits) {
            return Ok(());
        }
        match layout::tag_bits(bits) {
            FLOAT_TAG => match bits {
                POSITIVE_INFINITY | NEGATIVE_INFINITY | CANONICAL_NAN => Ok(()),
                _ => Err(BoxError::NonCanonicalNan(bits)),
            },
            tag if tag == Tag::POINTER.get() => {
                let addr = layout::payload_bits(bits);
                if addr & POINTER_ALIGN_MASK == 0 {
                    Ok(())
                } else {
                    Err(BoxError::MisalignedPointer(addr))
                }
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for BoxedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unbox() {
            Unboxed::Float(x) => write!(f, "Float({:?})", x),
            Unboxed::Pointer(addr) => write!(f, "Pointer(0x{:012x})", addr),
            Unboxed::Int(n) => write!(f, "Int({})", n),
            Unboxed::Bool(b) => write!(f, "Bool({})", b),
            Unboxed::Null => write!(f, "Null"),
            Unboxed::Custom { tag, payload, sign } => write!(
                f,
                "Tagged(tag={}, payload=0x{:012x}, sign={})",
                tag, payload, sign
            ),
        }
    }
}

impl Default for BoxedValue {
    fn default() -> Self {
        Self::null()
    }
}

impl From<f64> for BoxedValue {
    fn from(f: f64) -> Self {
        Self::from_float(f)
    }
}

impl From<bool> for BoxedValue {
    fn from(b: bool) -> Self {
        Self::from_bool(b)
    }
}

impl TryFrom<i64> for BoxedValue {
    type Error = BoxError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        Self::from_int(n)
    }
}

// =============================================================================
// Tests
// =============================================================================
