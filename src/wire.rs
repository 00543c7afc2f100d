//! Wire format for Google's Protocol Buffers, aka [protobuf](https://protobuf.dev).

use core::num::NonZeroU64;

use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::util::CastFrom;
use crate::util::{likely, unlikely};

/// Minimum value of a protobuf field number.
pub const MINIMUM_FIELD_NUMBER: u32 = 1;
/// Maximum value of a protobuf field number.
pub const MAXIMUM_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// A decoded protobuf field tag: a field number paired with a wire type.
///
/// Packed into a [`NonZeroU64`] so `Result<FieldTag, DecodeError>` returns
/// entirely in registers.
///
/// Layout mirrors the protobuf wire format:
/// * Bits 0-2: wire type (0-5)
/// * Bits 3-31: field number (1 to 2^29-1)
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct FieldTag(NonZeroU64);

#[allow(clippy::as_conversions)]
impl FieldTag {
    #[inline(always)]
    fn try_from_raw(raw_key: u32) -> Result<Self, DecodeError> {
        let wire_type_raw = (raw_key & 0b111) as u8;
        if unlikely(wire_type_raw > WireType::MAX_VAL) {
            return Err(DecodeError::invalid_wire_type(wire_type_raw));
        }

        let field_number = raw_key >> 3;
        if unlikely(field_number == 0) {
            return Err(DecodeError::zero_field_number());
        }

        // SAFETY: we validated field_number >= 1 above, so raw_key != 0.
        Ok(Self(unsafe { NonZeroU64::new_unchecked(raw_key as u64) }))
    }

    /// Construct a tag directly (used by group-skip bookkeeping and tests).
    #[inline(always)]
    pub(crate) const fn new(wire_type: WireType, field_number: u32) -> Self {
        let raw = ((field_number as u64) << 3) | (wire_type as u64);
        // SAFETY: field_number is assumed caller-validated to be >= 1.
        Self(unsafe { NonZeroU64::new_unchecked(raw) })
    }

    /// The [`WireType`] component of this tag.
    #[inline(always)]
    pub const fn wire_type(self) -> WireType {
        let raw = (self.0.get() & 0b111) as u8;
        // SAFETY: validated during construction.
        unsafe { core::mem::transmute::<u8, WireType>(raw) }
    }

    /// The field-number component of this tag.
    #[inline(always)]
    pub const fn field_number(self) -> u32 {
        (self.0.get() >> 3) as u32
    }

    /// Decomposes this tag into its [`WireType`] and field-number parts.
    #[inline(always)]
    pub const fn into_parts(self) -> (WireType, u32) {
        (self.wire_type(), self.field_number())
    }
}

impl core::fmt::Debug for FieldTag {
    #[cold]
    #[inline(never)]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldTag")
            .field("wire_type", &self.wire_type())
            .field("field_number", &self.field_number())
            .finish()
    }
}

/// Encodes `(field_number, wire_type)` as a protobuf field tag.
#[inline(always)]
pub fn encode_tag<B: bytes::BufMut>(wire_type: WireType, field_number: u32, buf: &mut B) {
    let key = (field_number << 3) | u32::cast_from(wire_type.into_val());
    u32::encode_leb128(key, buf);
}

/// The encoded length of a field tag.
#[inline(always)]
pub fn encoded_tag_len(field_number: u32) -> usize {
    let key = field_number << 3;
    key.encoded_leb128_len()
}

/// Decodes a tag from the front of `data`, returning the tag and bytes read.
///
/// Unlike the hot-path `bytes::Buf`-oriented decoder this replaces, this
/// operates on a plain borrowed slice so the [`crate::scanner::Scanner`]
/// can snapshot and rewind cheaply around it.
#[inline]
pub fn decode_tag(data: &[u8]) -> Result<(FieldTag, usize), DecodeError> {
    if unlikely(data.is_empty()) {
        return Err(DecodeError::truncated_varint());
    }
    // N.B. tags always fit in u32: max field number is 2^29-1, so the max
    // raw key value is `(2^29-1) << 3 | 7`, which is `u32::MAX`.
    let (value, consumed) = u32::decode_leb128_safe(data)?;
    Ok((FieldTag::try_from_raw(value)?, consumed))
}

/// Decodes a length prefix for a length-delimited field, returning the
/// length and bytes read.
#[inline(always)]
pub fn decode_len(data: &[u8]) -> Result<(usize, usize), DecodeError> {
    if likely(!data.is_empty() && data[0] < 0x80) {
        return Ok((usize::cast_from(data[0]), 1));
    }
    let (len, consumed) = u64::decode_leb128_safe(data)?;
    let len = usize::try_from(len).map_err(|_| DecodeError::length_overflow(len))?;
    Ok((len, consumed))
}

/// Denotes the type of a field in an encoded protobuf message.
///
/// Protobuf messages are a series of key-value pairs. When encoded each
/// key-value pair is turned into a record consisting of a field number, a
/// [`WireType`], and a payload. The [`WireType`] indicates how to interpret
/// the proceeding payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum WireType {
    /// Variable length integer.
    ///
    /// Used for: `int32`, `int64`, `uint32`, `uint64`, `sint32`, `sint64`,
    /// `bool`, `enum`.
    Varint = 0,
    /// 64-bit integer.
    ///
    /// Used for: `fixed64`, `sfixed64`, `double`.
    I64 = 1,
    /// Variable length field.
    ///
    /// Used for: `string`, `bytes`, `message`, packed `repeated` fields.
    Len = 2,
    /// Group start (deprecated, proto2 only).
    SGroup = 3,
    /// Group end (deprecated, proto2 only).
    EGroup = 4,
    /// 32-bit integer.
    ///
    /// Used for: `fixed32`, `sfixed32`, `float`.
    I32 = 5,
}

crate::util::assert_eq_size!(WireType, Result<WireType, ()>);

#[allow(clippy::as_conversions)]
impl WireType {
    const MAX_VAL: u8 = WireType::I32 as u8;

    const _DISCRIMINANT_CHECK: () = {
        assert!(WireType::Varint as u8 == 0);
        assert!(WireType::I64 as u8 == 1);
        assert!(WireType::Len as u8 == 2);
        assert!(WireType::SGroup as u8 == 3);
        assert!(WireType::EGroup as u8 == 4);
        assert!(WireType::I32 as u8 == 5);
    };

    #[inline(always)]
    fn try_from_val(value: u8) -> Result<Self, DecodeError> {
        if value <= Self::MAX_VAL {
            // SAFETY: checked above that value is in range, and both sides
            // of the transmute are u8-sized.
            let wire_type: WireType = unsafe { core::mem::transmute(value) };
            Ok(wire_type)
        } else {
            Err(DecodeError::invalid_wire_type(value))
        }
    }

    /// The raw wire-type value (0-5).
    #[inline(always)]
    pub const fn into_val(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for WireType {
    type Error = DecodeError;

    #[inline(always)]
    fn try_from(value: u8) -> Result<Self, DecodeError> {
        WireType::try_from_val(value)
    }
}
