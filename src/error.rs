//! Compact error type for protobuf decoding.
//!
//! All bit manipulation in this module is intentional for packing error info
//! into a single 64-bit value for register returns.

#![allow(clippy::as_conversions)]

use core::fmt;
use core::num::NonZeroU64;

/// The three top-level failure modes a decode can report.
///
/// `MalformedProtobuf` covers structurally invalid input
/// (bad wire type, overlong varint, mismatched group framing, ...).
/// `TruncatedInput` covers input that ends in the middle of a value.
/// `TrailingGarbage` covers a sub-decode that didn't consume its whole
/// sub-slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorKind {
    Malformed = 1,
    Truncated = 2,
    TrailingGarbage = 3,
}

/// Sub-reason for a [`ErrorKind::Malformed`] error (stored in context bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MalformedReason {
    /// A tag's low three bits don't decode to a known wire type.
    InvalidWireType = 1,
    /// A varint's 10th byte still had its continuation bit set, or the
    /// accumulated value overflowed 64 bits.
    OverlongVarint = 2,
    /// A field number of zero was encountered.
    ZeroFieldNumber = 3,
    /// A length prefix is larger than the bytes remaining in the buffer.
    LengthExceedsRemaining = 4,
    /// An `EndGroup` tag appeared with no open `StartGroup` at this level.
    UnmatchedEndGroup = 5,
    /// A `StartGroup` was opened but its enclosing frame ended (or a
    /// differently-numbered `EndGroup` was seen) before the matching
    /// `EndGroup`.
    UnmatchedStartGroup = 6,
    /// A map entry's sub-message was missing its key (field 1) or its
    /// value (field 2).
    MapEntryMissingField = 7,
    /// Recursion nested deeper than the configured maximum.
    MaxDepthExceeded = 8,
    /// A packed payload's length isn't a multiple of its element width.
    InvalidPackedLength = 9,
    /// A length prefix overflows `usize` on this platform.
    LengthOverflow = 10,
    /// A varint-encoded `int32`/`uint32` value doesn't fit after
    /// sign-extension / truncation rules are applied.
    IntegerOverflow = 11,
    /// Invalid UTF-8 encountered in a field routed through the string
    /// setter.
    InvalidUtf8 = 12,
}

/// Sub-reason for a [`ErrorKind::Truncated`] error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TruncatedReason {
    /// Ran out of bytes mid-varint (no byte had its continuation bit clear).
    Varint = 1,
    /// Fewer than 4 bytes remained for a `fixed32`/`sfixed32`/`float`.
    Fixed32 = 2,
    /// Fewer than 8 bytes remained for a `fixed64`/`sfixed64`/`double`.
    Fixed64 = 3,
    /// Fewer than N bytes remained for a length-delimited payload whose
    /// length prefix had already been validated against `remaining`.
    LengthDelimitedBody = 4,
    /// End of input reached while scanning for a group's matching
    /// `EndGroup`.
    Group = 5,
}

const KIND_SHIFT: u32 = 56;

/// Decode error type packed into 8 bytes.
///
/// Bits 56-63 hold the [`ErrorKind`] discriminant (1-255, 0 reserved for
/// niche optimization so `Option<DecodeError>` stays 8 bytes). Bits 0-55
/// hold a sub-reason plus optional numeric context, interpretation
/// depending on `kind`.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct DecodeError(NonZeroU64);

crate::util::assert_eq_size!(Result<u64, DecodeError>, [u8; 16]);
crate::util::assert_eq_size!(Option<DecodeError>, DecodeError);

const REASON_SHIFT: u32 = 48;
const REASON_MASK: u64 = 0xff;

impl DecodeError {
    #[inline(always)]
    const fn new(kind: ErrorKind, reason: u8, context: u64) -> Self {
        let value = ((kind as u64) << KIND_SHIFT)
            | ((reason as u64 & REASON_MASK) << REASON_SHIFT)
            | (context & ((1 << REASON_SHIFT) - 1));
        // SAFETY: kind is always >= 1, so the upper byte is never 0.
        Self(unsafe { NonZeroU64::new_unchecked(value) })
    }

    /// The top-level error kind.
    #[inline(always)]
    pub const fn kind(&self) -> ErrorKind {
        let kind_byte = (self.0.get() >> KIND_SHIFT) as u8;
        // SAFETY: only constructed with valid ErrorKind values above.
        unsafe { core::mem::transmute::<u8, ErrorKind>(kind_byte) }
    }

    #[inline(always)]
    const fn reason_byte(&self) -> u8 {
        ((self.0.get() >> REASON_SHIFT) & REASON_MASK) as u8
    }

    #[inline(always)]
    const fn context(&self) -> u64 {
        self.0.get() & ((1 << REASON_SHIFT) - 1)
    }

    /// The malformed-input sub-reason, if `kind() == Malformed`.
    pub const fn malformed_reason(&self) -> Option<MalformedReason> {
        if matches!(self.kind(), ErrorKind::Malformed) {
            // SAFETY: only constructed with valid MalformedReason values.
            Some(unsafe { core::mem::transmute::<u8, MalformedReason>(self.reason_byte()) })
        } else {
            None
        }
    }

    /// The truncation sub-reason, if `kind() == Truncated`.
    pub const fn truncated_reason(&self) -> Option<TruncatedReason> {
        if matches!(self.kind(), ErrorKind::Truncated) {
            // SAFETY: only constructed with valid TruncatedReason values.
            Some(unsafe { core::mem::transmute::<u8, TruncatedReason>(self.reason_byte()) })
        } else {
            None
        }
    }

    /// Numeric context attached to the error (meaning depends on reason).
    pub const fn context_value(&self) -> u64 {
        self.context()
    }

    #[cold]
    #[inline(never)]
    const fn malformed(reason: MalformedReason) -> Self {
        Self::new(ErrorKind::Malformed, reason as u8, 0)
    }

    #[cold]
    #[inline(never)]
    const fn malformed_ctx(reason: MalformedReason, context: u64) -> Self {
        Self::new(ErrorKind::Malformed, reason as u8, context)
    }

    #[cold]
    #[inline(never)]
    const fn truncated(reason: TruncatedReason) -> Self {
        Self::new(ErrorKind::Truncated, reason as u8, 0)
    }

    /// A tag's wire-type bits don't decode to a known [`crate::WireType`].
    pub const fn invalid_wire_type(value: u8) -> Self {
        Self::malformed_ctx(MalformedReason::InvalidWireType, value as u64)
    }

    /// A varint ran past 10 bytes, or overflowed 64 bits.
    pub const fn overlong_varint() -> Self {
        Self::malformed(MalformedReason::OverlongVarint)
    }

    /// Field number zero, which protobuf reserves as invalid.
    pub const fn zero_field_number() -> Self {
        Self::malformed(MalformedReason::ZeroFieldNumber)
    }

    /// A length prefix claims more bytes than remain in the input.
    pub const fn length_exceeds_remaining(len: u64) -> Self {
        Self::malformed_ctx(MalformedReason::LengthExceedsRemaining, len)
    }

    /// An `EndGroup` tag with no matching open `StartGroup`.
    pub const fn unmatched_end_group(field_number: u32) -> Self {
        Self::malformed_ctx(MalformedReason::UnmatchedEndGroup, field_number as u64)
    }

    /// A `StartGroup`'s enclosing frame ended, or a different field number's
    /// `EndGroup` was seen, before its matching `EndGroup`.
    pub const fn unmatched_start_group(field_number: u32) -> Self {
        Self::malformed_ctx(MalformedReason::UnmatchedStartGroup, field_number as u64)
    }

    /// A map entry sub-message was missing its key or its value field.
    pub const fn map_entry_missing_field() -> Self {
        Self::malformed(MalformedReason::MapEntryMissingField)
    }

    /// Recursion nested past the configured maximum depth.
    pub const fn max_depth_exceeded(max_depth: u32) -> Self {
        Self::malformed_ctx(MalformedReason::MaxDepthExceeded, max_depth as u64)
    }

    /// A packed payload's byte length isn't a multiple of the scalar's
    /// encoded width.
    pub const fn invalid_packed_length(expected_multiple: u8, actual: u32) -> Self {
        let context = ((expected_multiple as u64) << 32) | (actual as u64);
        Self::malformed_ctx(MalformedReason::InvalidPackedLength, context)
    }

    /// A length prefix doesn't fit in `usize` on this platform.
    pub const fn length_overflow(value: u64) -> Self {
        Self::malformed_ctx(MalformedReason::LengthOverflow, value)
    }

    /// A varint value doesn't fit its target integer type.
    pub const fn integer_overflow() -> Self {
        Self::malformed(MalformedReason::IntegerOverflow)
    }

    /// Invalid UTF-8 in a field routed through the string setter.
    pub const fn invalid_utf8() -> Self {
        Self::malformed(MalformedReason::InvalidUtf8)
    }

    /// Input ended mid-varint.
    pub const fn truncated_varint() -> Self {
        Self::truncated(TruncatedReason::Varint)
    }

    /// Fewer than 4 bytes remained for a fixed32-wire value.
    pub const fn truncated_fixed32() -> Self {
        Self::truncated(TruncatedReason::Fixed32)
    }

    /// Fewer than 8 bytes remained for a fixed64-wire value.
    pub const fn truncated_fixed64() -> Self {
        Self::truncated(TruncatedReason::Fixed64)
    }

    /// Fewer than N bytes remained for a length-delimited payload.
    pub const fn truncated_length_delimited_body() -> Self {
        Self::truncated(TruncatedReason::LengthDelimitedBody)
    }

    /// End of input reached while scanning for a group's `EndGroup`.
    pub const fn truncated_group() -> Self {
        Self::truncated(TruncatedReason::Group)
    }

    /// A `decodeFullObject` completed the logical message with bytes
    /// remaining in a sub-slice that should have been fully consumed.
    #[cold]
    #[inline(never)]
    pub const fn trailing_garbage() -> Self {
        Self::new(ErrorKind::TrailingGarbage, 0, 0)
    }
}

impl fmt::Debug for DecodeError {
    #[cold]
    #[inline(never)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("DecodeError");
        d.field("kind", &self.kind());
        if let Some(reason) = self.malformed_reason() {
            d.field("reason", &reason);
        }
        if let Some(reason) = self.truncated_reason() {
            d.field("reason", &reason);
        }
        if self.context() != 0 {
            d.field("context", &self.context());
        }
        d.finish()
    }
}

impl fmt::Display for DecodeError {
    #[cold]
    #[inline(never)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ErrorKind::Malformed => match self.malformed_reason().unwrap() {
                MalformedReason::InvalidWireType => {
                    write!(f, "invalid wire type value: {}", self.context())
                }
                MalformedReason::OverlongVarint => write!(f, "varint exceeds 10 bytes"),
                MalformedReason::ZeroFieldNumber => write!(f, "field number zero is invalid"),
                MalformedReason::LengthExceedsRemaining => write!(
                    f,
                    "length prefix {} exceeds remaining input",
                    self.context()
                ),
                MalformedReason::UnmatchedEndGroup => {
                    write!(f, "end-group with no matching start-group (field {})", self.context())
                }
                MalformedReason::UnmatchedStartGroup => write!(
                    f,
                    "start-group (field {}) never saw its matching end-group",
                    self.context()
                ),
                MalformedReason::MapEntryMissingField => {
                    write!(f, "map entry is missing its key or value field")
                }
                MalformedReason::MaxDepthExceeded => write!(
                    f,
                    "recursion exceeded maximum nesting depth of {}",
                    self.context()
                ),
                MalformedReason::InvalidPackedLength => {
                    let ctx = self.context();
                    let mult = (ctx >> 32) as u8;
                    let actual = ctx as u32;
                    write!(
                        f,
                        "packed field length {actual} is not a multiple of {mult}"
                    )
                }
                MalformedReason::LengthOverflow => write!(
                    f,
                    "length prefix {} exceeds platform addressable memory",
                    self.context()
                ),
                MalformedReason::IntegerOverflow => {
                    write!(f, "varint value does not fit target integer type")
                }
                MalformedReason::InvalidUtf8 => write!(f, "invalid UTF-8 in string field"),
            },
            ErrorKind::Truncated => match self.truncated_reason().unwrap() {
                TruncatedReason::Varint => write!(f, "input ended in the middle of a varint"),
                TruncatedReason::Fixed32 => {
                    write!(f, "fewer than 4 bytes remained for a fixed32 value")
                }
                TruncatedReason::Fixed64 => {
                    write!(f, "fewer than 8 bytes remained for a fixed64 value")
                }
                TruncatedReason::LengthDelimitedBody => write!(
                    f,
                    "input ended before a length-delimited field's body"
                ),
                TruncatedReason::Group => write!(
                    f,
                    "input ended before a group's matching end-group"
                ),
            },
            ErrorKind::TrailingGarbage => {
                write!(f, "bytes remained after the logical message was decoded")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn test_error_display() {
        let err = DecodeError::invalid_wire_type(7);
        assert_eq!(format!("{err}"), "invalid wire type value: 7");

        let err = DecodeError::invalid_packed_length(4, 15);
        assert_eq!(
            format!("{err}"),
            "packed field length 15 is not a multiple of 4"
        );

        let err = DecodeError::trailing_garbage();
        assert_eq!(err.kind(), ErrorKind::TrailingGarbage);
    }

    #[test]
    fn test_error_kind_and_reason_roundtrip() {
        let err = DecodeError::overlong_varint();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.malformed_reason(), Some(MalformedReason::OverlongVarint));

        let err = DecodeError::truncated_varint();
        assert_eq!(err.kind(), ErrorKind::Truncated);
        assert_eq!(err.truncated_reason(), Some(TruncatedReason::Varint));

        let err = DecodeError::unmatched_start_group(4);
        assert_eq!(err.context_value(), 4);
    }

    #[test]
    fn test_niche_optimization() {
        assert_eq!(
            core::mem::size_of::<Option<DecodeError>>(),
            core::mem::size_of::<DecodeError>()
        );
    }
}
