//! Scalar protobuf value types and their wire-level read operations.
//!
//! Each type here corresponds to one of the scalar field types protobuf
//! defines. `ScalarField::from_varint` / `from_fixed32` / `from_fixed64`
//! are a scalar type's "read from scanner" operations: a
//! [`crate::field_decoder::FieldDecoder`] reads the raw wire-level value
//! once, then hands it to the scalar type via whichever of these matches
//! the decoder's wire type. A type that doesn't implement the matching
//! method for the wire type in play declines (the blanket default returns
//! `Ok(None)`, leaving `consumed` false).

use crate::util::ReinterpretCastFrom;
use crate::wire::WireType;

/// A protobuf scalar value decodable directly from a numeric wire read.
///
/// The three `from_*` methods mirror the three [`WireType`]s a
/// `NumericFieldDecoder` might see. Only one matches a well-formed schema;
/// the others carry a default `Ok(None)` "decline" implementation so a
/// [`crate::field_decoder::FieldDecoder`] can try candidates without
/// special-casing each combination.
pub trait ScalarField: Sized + Copy {
    /// The canonical wire type this scalar is encoded with.
    const WIRE_TYPE: WireType;

    /// Interpret a raw varint value as `Self` (e.g. zigzag-decode for
    /// `Sint32`/`Sint64`, sign-extend-then-narrow for `i32`).
    fn from_varint(_value: u64) -> Option<Self> {
        None
    }

    /// Interpret 4 little-endian bytes (already assembled into a `u32`)
    /// as `Self`.
    fn from_fixed32(_value: u32) -> Option<Self> {
        None
    }

    /// Interpret 8 little-endian bytes (already assembled into a `u64`)
    /// as `Self`.
    fn from_fixed64(_value: u64) -> Option<Self> {
        None
    }

    /// Whether a wire-valid raw value should be accepted when decoding a
    /// packed repeated field of this type, or rejected and preserved as an
    /// unknown-field override. No built-in scalar type in this crate ever
    /// rejects a value here — closed enums are out of scope for this crate
    /// — so this always returns `true` for them; it exists for extension
    /// types (e.g. a closed-enum-like wrapper) that want packed values
    /// outside their known set preserved rather than silently accepted.
    fn accepts_packed_value(_raw: u64) -> bool {
        true
    }
}

impl ScalarField for u64 {
    const WIRE_TYPE: WireType = WireType::Varint;
    fn from_varint(value: u64) -> Option<Self> {
        Some(value)
    }
}

impl ScalarField for u32 {
    const WIRE_TYPE: WireType = WireType::Varint;
    fn from_varint(value: u64) -> Option<Self> {
        // protobuf uint32 truncates a 64-bit varint to the low 32 bits.
        Some(value as u32)
    }
}

impl ScalarField for i64 {
    const WIRE_TYPE: WireType = WireType::Varint;
    fn from_varint(value: u64) -> Option<Self> {
        Some(i64::reinterpret_cast_from(value))
    }
}

impl ScalarField for i32 {
    const WIRE_TYPE: WireType = WireType::Varint;
    fn from_varint(value: u64) -> Option<Self> {
        // Negative int32 values are canonically sign-extended to a 10-byte
        // varint on the wire, but decoders must also accept a 5-byte
        // encoding with no sign-extension padding. Either way the correct
        // behavior is to truncate to the low 32 bits, matching upstream
        // protobuf's decoder rather than rejecting non-canonical input.
        Some(i32::reinterpret_cast_from(value as u32))
    }
}

impl ScalarField for bool {
    const WIRE_TYPE: WireType = WireType::Varint;
    fn from_varint(value: u64) -> Option<Self> {
        Some(value != 0)
    }
}

#[inline(always)]
pub(crate) fn zigzag_decode_32(n: u32) -> i32 {
    i32::reinterpret_cast_from(n >> 1) ^ -i32::reinterpret_cast_from(n & 1)
}

#[inline(always)]
pub(crate) fn zigzag_encode_32(n: i32) -> u32 {
    let val = (n << 1) ^ (n >> 31);
    u32::reinterpret_cast_from(val)
}

#[inline(always)]
pub(crate) fn zigzag_decode_64(n: u64) -> i64 {
    i64::reinterpret_cast_from(n >> 1) ^ -i64::reinterpret_cast_from(n & 1)
}

#[inline(always)]
pub(crate) fn zigzag_encode_64(n: i64) -> u64 {
    u64::reinterpret_cast_from((n << 1) ^ (n >> 63))
}

/// Wrapper for protobuf `sint32` (zigzag-encoded signed 32-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Sint32(pub i32);

impl ScalarField for Sint32 {
    const WIRE_TYPE: WireType = WireType::Varint;
    fn from_varint(value: u64) -> Option<Self> {
        Some(Sint32(zigzag_decode_32(value as u32)))
    }
}

/// Wrapper for protobuf `sint64` (zigzag-encoded signed 64-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Sint64(pub i64);

impl ScalarField for Sint64 {
    const WIRE_TYPE: WireType = WireType::Varint;
    fn from_varint(value: u64) -> Option<Self> {
        Some(Sint64(zigzag_decode_64(value)))
    }
}

/// Wrapper for protobuf `fixed32` (little-endian unsigned 32-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Fixed32(pub u32);

impl ScalarField for Fixed32 {
    const WIRE_TYPE: WireType = WireType::I32;
    fn from_fixed32(value: u32) -> Option<Self> {
        Some(Fixed32(value))
    }
}

/// Wrapper for protobuf `fixed64` (little-endian unsigned 64-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Fixed64(pub u64);

impl ScalarField for Fixed64 {
    const WIRE_TYPE: WireType = WireType::I64;
    fn from_fixed64(value: u64) -> Option<Self> {
        Some(Fixed64(value))
    }
}

/// Wrapper for protobuf `sfixed32` (little-endian signed 32-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Sfixed32(pub i32);

impl ScalarField for Sfixed32 {
    const WIRE_TYPE: WireType = WireType::I32;
    fn from_fixed32(value: u32) -> Option<Self> {
        Some(Sfixed32(i32::reinterpret_cast_from(value)))
    }
}

/// Wrapper for protobuf `sfixed64` (little-endian signed 64-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Sfixed64(pub i64);

impl ScalarField for Sfixed64 {
    const WIRE_TYPE: WireType = WireType::I64;
    fn from_fixed64(value: u64) -> Option<Self> {
        Some(Sfixed64(i64::reinterpret_cast_from(value)))
    }
}

impl ScalarField for f32 {
    const WIRE_TYPE: WireType = WireType::I32;
    fn from_fixed32(value: u32) -> Option<Self> {
        Some(f32::from_bits(value))
    }
}

impl ScalarField for f64 {
    const WIRE_TYPE: WireType = WireType::I64;
    fn from_fixed64(value: u64) -> Option<Self> {
        Some(f64::from_bits(value))
    }
}
