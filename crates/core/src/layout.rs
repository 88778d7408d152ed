//! Bit Layout
//!
//! Every boxed value is one IEEE 754 double-width word:
//!
//! ```text
//!  63 62         52 51  48 47                                            0
//! ┌──┬─────────────┬──────┬───────────────────────────────────────────────┐
//! │ s│ 111 1111 1111│ tttt │                 48-bit payload                │
//! └──┴─────────────┴──────┴───────────────────────────────────────────────┘
//! ```
//!
//! A word whose exponent field is not all ones is an ordinary double.
//! When the exponent is all ones the 4-bit tag decides:
//!
//! - `0xF`: the reserved float block. Holds ±Infinity (payload 0) and the
//!   single canonical NaN (payload 1, sign clear). Nothing else.
//! - `0x0`: pointer. The payload is an 8-byte aligned address, so it can
//!   never look like the Infinity (`0x0`) or NaN (`0x1`) mantissa.
//! - `0x1..=0xE`: immediates and consumer-defined variants.
//!
//! The sign bit is carried through untouched for tagged words so a negative
//! integer does not need its own sign-extension scheme.
//!
//! Nothing outside this crate should match on these masks directly; go
//! through [`BoxedValue`](crate::BoxedValue) instead.

// =============================================================================
// Masks
// =============================================================================

/// Sign bit (bit 63)
pub const SIGN_MASK: u64 = 1 << 63;

/// Exponent field (bits 62:52), all ones for every Infinity, NaN and tagged word
pub const EXPONENT_MASK: u64 = 0x7FF << 52;

/// Shift amount for the 4-bit tag (bits 51:48)
pub const TAG_SHIFT: u32 = 48;

/// Mask for the 4-bit tag
pub const TAG_MASK: u64 = 0xF << TAG_SHIFT;

/// Width of the payload field
pub const PAYLOAD_BITS: u32 = 48;

/// Mask for the 48-bit payload (bits 47:0)
pub const PAYLOAD_MASK: u64 = (1 << PAYLOAD_BITS) - 1;

/// Everything above the payload except the sign: exponent plus tag.
pub const RESERVED_BITS_MASK: u64 = EXPONENT_MASK | TAG_MASK;

// =============================================================================
// Reserved patterns
// =============================================================================

/// Tag of the reserved float block. Never assignable to a variant.
pub const FLOAT_TAG: u8 = 0xF;

/// Required alignment of pointer payloads, in bytes
pub const POINTER_ALIGN: u64 = 8;

/// Low payload bits that must be clear for a pointer
pub const POINTER_ALIGN_MASK: u64 = POINTER_ALIGN - 1;

/// The only NaN word the codec ever produces
pub const CANONICAL_NAN: u64 = RESERVED_BITS_MASK | 1;

/// +Infinity relocated into the reserved float block
pub const POSITIVE_INFINITY: u64 = RESERVED_BITS_MASK;

/// -Infinity relocated into the reserved float block
pub const NEGATIVE_INFINITY: u64 = SIGN_MASK | RESERVED_BITS_MASK;

// =============================================================================
// Word helpers
// =============================================================================

/// `true` if the exponent field is all ones (Infinity, NaN or tagged).
#[inline(always)]
pub const fn exponent_all_ones(bits: u64) -> bool {
    (bits & EXPONENT_MASK) == EXPONENT_MASK
}

#[inline(always)]
pub const fn tag_bits(bits: u64) -> u8 {
    ((bits & TAG_MASK) >> TAG_SHIFT) as u8
}

#[inline(always)]
pub const fn payload_bits(bits: u64) -> u64 {
    bits & PAYLOAD_MASK
}

#[inline(always)]
pub const fn sign_bit(bits: u64) -> bool {
    (bits & SIGN_MASK) != 0
}

/// `true` for every word that decodes as a float.
#[inline(always)]
pub const fn is_float_bits(bits: u64) -> bool {
    !exponent_all_ones(bits) || tag_bits(bits) == FLOAT_TAG
}

/// Assemble a tagged word. The caller has already validated `tag` and
/// `payload`; anything above 48 bits in `payload` is dropped.
#[inline(always)]
pub const fn compose(tag: u8, payload: u64, sign: bool) -> u64 {
    let sign = if sign { SIGN_MASK } else { 0 };
    sign | EXPONENT_MASK | (((tag & 0xF) as u64) << TAG_SHIFT) | (payload & PAYLOAD_MASK)
}

#[inline(always)]
pub const fn fits_payload(n: u64) -> bool {
    n <= PAYLOAD_MASK
}

/// Rebuild a two's-complement integer from a payload and the word's sign bit.
#[inline(always)]
pub const fn sign_extend(payload: u64, sign: bool) -> i64 {
    if sign {
        (payload | !PAYLOAD_MASK) as i64
    } else {
        payload as i64
    }
}

/// Decode a float word. Words in the reserved block map back to the IEEE
/// specials they stand for; every other float word is its own bit pattern.
#[inline(always)]
pub fn decode_float(bits: u64) -> f64 {
    if !exponent_all_ones(bits) {
        return f64::from_bits(bits);
    }
    match (payload_bits(bits), sign_bit(bits)) {
        (0, false) => f64::INFINITY,
        (0, true) => f64::NEG_INFINITY,
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_constants() {
        assert_eq!(EXPONENT_MASK, 0x7FF0_0000_0000_0000);
        assert_eq!(TAG_MASK, 0x000F_0000_0000_0000);
        assert_eq!(PAYLOAD_MASK, 0x0000_FFFF_FFFF_FFFF);
        assert_eq!(CANONICAL_NAN, 0x7FFF_0000_0000_0001);
        assert_eq!(POSITIVE_INFINITY, 0x7FFF_0000_0000_0000);
        assert_eq!(NEGATIVE_INFINITY, 0xFFFF_0000_0000_0000);
    }

    #[test]
    fn test_fields_do_not_overlap() {
        assert_eq!(SIGN_MASK & EXPONENT_MASK, 0);
        assert_eq!(EXPONENT_MASK & TAG_MASK, 0);
        assert_eq!(TAG_MASK & PAYLOAD_MASK, 0);
        assert_eq!(SIGN_MASK | RESERVED_BITS_MASK | PAYLOAD_MASK, u64::MAX);
    }

    #[test]
    fn test_compose_places_fields() {
        let bits = compose(0xA, 0xdead_beef, true);
        assert_eq!(bits, 0xFFFA_0000_dead_beef);
        assert!(exponent_all_ones(bits));
        assert_eq!(tag_bits(bits), 0xA);
        assert_eq!(payload_bits(bits), 0xdead_beef);
        assert!(sign_bit(bits));
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(PAYLOAD_MASK, true), -1);
        assert_eq!(sign_extend(0, true), -(1 << 48));
        assert_eq!(sign_extend(12345, false), 12345);
        assert_eq!(sign_extend((-666i64 as u64) & PAYLOAD_MASK, true), -666);
    }

    #[test]
    fn test_raw_ieee_specials_fall_outside_float_block() {
        // Hardware Infinity has tag 0x0 and the default quiet NaN has tag 0x8,
        // which is why the codec has to relocate both.
        assert!(!is_float_bits(f64::INFINITY.to_bits()));
        assert!(!is_float_bits(f64::NAN.to_bits()));
        assert!(is_float_bits(CANONICAL_NAN));
        assert!(is_float_bits(NEGATIVE_INFINITY));
    }

    #[test]
    fn test_decode_float_specials() {
        assert_eq!(decode_float(POSITIVE_INFINITY), f64::INFINITY);
        assert_eq!(decode_float(NEGATIVE_INFINITY), f64::NEG_INFINITY);
        assert!(decode_float(CANONICAL_NAN).is_nan());
        assert_eq!(decode_float(1.5f64.to_bits()), 1.5);
    }
}
