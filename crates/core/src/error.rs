//! Codec errors
//!
//! Every error here is a caller contract violation detected at the point of
//! construction or access. None of them are transient, so nothing retries.

use std::fmt;

use crate::tag::Tag;

pub type BoxResult<T> = Result<T, BoxError>;

/// What a word holds, as far as an accessor is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Float,
    /// Any tagged word, whatever the tag
    Tagged,
    /// Either boolean tag
    Bool,
    Variant(Tag),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Float => write!(f, "float"),
            Kind::Tagged => write!(f, "tagged value"),
            Kind::Bool => write!(f, "bool"),
            Kind::Variant(tag) => match tag.reference_name() {
                Some(name) => write!(f, "{name}"),
                None => write!(f, "tag {tag}"),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoxError {
    /// raw tag
    #[error("InvalidTag: tag {0:#x} is reserved for floats or wider than 4 bits")]
    InvalidTag(u8),

    /// offending payload (raw two's complement bits for integers)
    #[error("PayloadOverflow: {0:#x} does not fit in 48 bits")]
    PayloadOverflow(u64),

    /// offending address
    #[error("MisalignedPointer: address {0:#x} is not 8-byte aligned")]
    MisalignedPointer(u64),

    #[error("TypeMismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: Kind, found: Kind },

    /// raw word
    #[error("NonCanonicalNan: {0:#018x} is a NaN pattern the codec never produces")]
    NonCanonicalNan(u64),

    /// raw word
    #[error("MalformedReference: {0:#018x} sets payload or sign bits its reference tag never uses")]
    MalformedReference(u64),

    /// probed address
    #[error("AddressSpaceTooWide: address {0:#x} lies above the 48-bit pointer range")]
    AddressSpaceTooWide(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message_uses_variant_names() {
        let err = BoxError::TypeMismatch {
            expected: Kind::Variant(Tag::INT),
            found: Kind::Float,
        };
        assert_eq!(err.to_string(), "TypeMismatch: expected int, found float");

        let err = BoxError::TypeMismatch {
            expected: Kind::Tagged,
            found: Kind::Float,
        };
        assert_eq!(
            err.to_string(),
            "TypeMismatch: expected tagged value, found float"
        );
    }

    #[test]
    fn test_custom_tag_kind_display() {
        assert_eq!(Kind::Variant(Tag::MAX).to_string(), "tag 0xe");
        assert_eq!(Kind::Variant(Tag::NULL).to_string(), "null");
        assert_eq!(Kind::Bool.to_string(), "bool");
    }

    #[test]
    fn test_malformed_reference_message() {
        assert_eq!(
            BoxError::MalformedReference(0x7FF3_0000_0000_0001).to_string(),
            "MalformedReference: 0x7ff3000000000001 sets payload or sign bits its reference tag never uses"
        );
    }

    #[test]
    fn test_overflow_message() {
        assert_eq!(
            BoxError::PayloadOverflow(1 << 48).to_string(),
            "PayloadOverflow: 0x1000000000000 does not fit in 48 bits"
        );
    }
}
