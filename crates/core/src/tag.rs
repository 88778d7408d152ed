//! Type tags
//!
//! A [`Tag`] is the 4-bit discriminant of a tagged word. Tag `0xF` belongs to
//! the reserved float block and can never be constructed, so a `Tag` value is
//! always one of the 15 assignable slots.

use std::fmt;

use crate::error::BoxError;
use crate::layout::FLOAT_TAG;

/// A type tag in `0x0..=0xE`.
///
/// Stored as a `u8`, but always fits in the low four bits.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(u8);

impl Tag {
    /// 8-byte aligned address (48 bits)
    pub const POINTER: Tag = Tag(0x0);
    /// Integer, 48 payload bits plus the sign bit
    pub const INT: Tag = Tag(0x1);
    /// Boolean false, empty payload
    pub const FALSE: Tag = Tag(0x2);
    /// Boolean true, empty payload
    pub const TRUE: Tag = Tag(0x3);
    /// Null, empty payload
    pub const NULL: Tag = Tag(0x4);

    /// First tag left to consumers
    pub const FIRST_CUSTOM: Tag = Tag(0x5);
    /// Highest assignable tag
    pub const MAX: Tag = Tag(FLOAT_TAG - 1);

    /// The tags the codec itself gives meaning to.
    pub const REFERENCE: [Tag; 5] = [Tag::POINTER, Tag::INT, Tag::FALSE, Tag::TRUE, Tag::NULL];

    /// Validate a raw tag. Fails with [`BoxError::InvalidTag`] for the reserved
    /// float tag and for anything that does not fit in four bits.
    pub const fn new(raw: u8) -> Result<Tag, BoxError> {
        if raw < FLOAT_TAG {
            Ok(Tag(raw))
        } else {
            Err(BoxError::InvalidTag(raw))
        }
    }

    /// Read the tag field of a word already known to be tagged.
    #[inline(always)]
    pub(crate) const fn of_word(bits: u64) -> Tag {
        Tag(crate::layout::tag_bits(bits))
    }

    #[inline(always)]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// `true` for pointer, int, the two booleans and null.
    pub const fn is_reference(self) -> bool {
        self.0 < Tag::FIRST_CUSTOM.0
    }

    /// Name of a reference variant, `None` for consumer tags.
    pub const fn reference_name(self) -> Option<&'static str> {
        match self.0 {
            0x0 => Some("pointer"),
            0x1 => Some("int"),
            0x2 => Some("false"),
            0x3 => Some("true"),
            0x4 => Some("null"),
            _ => None,
        }
    }

    /// Every assignable tag in ascending order.
    pub fn all() -> impl Iterator<Item = Tag> {
        (0..FLOAT_TAG).map(Tag)
    }

    pub const fn is_bool(self) -> bool {
        self.0 == Tag::FALSE.0 || self.0 == Tag::TRUE.0
    }

    /// The consumer tags, `0x5..=0xE`.
    pub fn custom() -> impl Iterator<Item = Tag> {
        (Tag::FIRST_CUSTOM.0..FLOAT_TAG).map(Tag)
    }
}

impl TryFrom<u8> for Tag {
    type Error = BoxError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Tag::new(raw)
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
