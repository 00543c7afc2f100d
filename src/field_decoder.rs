//! Per-field wire-type adapters offered to a message handler.
//!
//! A [`FieldDecoder`] is constructed fresh for each tag the driver reads and
//! is torn down once the handler's callback returns. None of the three
//! variants touch the underlying input beyond what a chosen setter actually
//! reads: declining a field (calling no setter, or calling one whose scalar
//! type doesn't match the wire type in play) leaves the scanner exactly
//! where it was after the tag, so unknown-field preservation can always
//! re-derive the field's raw bytes via [`crate::scanner::Scanner::get_raw_field`]
//! regardless of what happened in between.

use alloc::string::String;
use alloc::vec::Vec;
use bytes::{BufMut, Bytes, BytesMut};

use crate::decoder::{self, DecodeCtx};
use crate::error::DecodeError;
use crate::extension::ExtensionValues;
use crate::leb128::LebCodec;
use crate::message::{MessageHandler, UnknownFieldSet};
use crate::scalar::ScalarField;
use crate::scanner::Scanner;
use crate::wire::{FieldTag, WireType};

/// One adapter per wire-type family, each exposing only the setters that
/// make sense for it.
pub enum FieldDecoder<'s, 'a, 'x> {
    Numeric(NumericFieldDecoder<'s, 'a>),
    LengthDelimited(LengthDelimitedFieldDecoder<'a, 'x>),
    Group(GroupFieldDecoder<'s, 'a, 'x>),
}

impl<'s, 'a, 'x> FieldDecoder<'s, 'a, 'x> {
    /// Construct the variant matching `tag`'s wire type. `Len` eagerly reads
    /// the length prefix and advances `scanner` past the body; `Numeric`
    /// and `Group` borrow `scanner` and read nothing until a setter runs.
    pub(crate) fn new(
        scanner: &'s mut Scanner<'a>,
        tag: FieldTag,
        ctx: DecodeCtx<'x>,
    ) -> Result<Self, DecodeError> {
        match tag.wire_type() {
            WireType::Len => {
                let data = scanner.read_length_delimited()?;
                Ok(FieldDecoder::LengthDelimited(LengthDelimitedFieldDecoder::new(
                    data, ctx,
                )))
            }
            WireType::SGroup => {
                let nested = ctx.nested()?;
                Ok(FieldDecoder::Group(GroupFieldDecoder::new(
                    scanner,
                    nested,
                    tag.field_number(),
                )))
            }
            WireType::EGroup => Err(DecodeError::unmatched_end_group(tag.field_number())),
            _ => Ok(FieldDecoder::Numeric(NumericFieldDecoder::new(scanner, tag))),
        }
    }

    /// Whether a typed setter has absorbed this field.
    pub fn consumed(&self) -> bool {
        match self {
            FieldDecoder::Numeric(n) => n.consumed,
            FieldDecoder::LengthDelimited(l) => l.consumed,
            FieldDecoder::Group(g) => g.consumed,
        }
    }

    /// Take the re-encodable override payload left by a packed decode that
    /// rejected one or more elements, if any.
    pub(crate) fn take_packed_override(&mut self) -> Option<BytesMut> {
        match self {
            FieldDecoder::LengthDelimited(l) => l.override_bytes.take(),
            _ => None,
        }
    }
}

/// Adapter for `Varint` / `I32` / `I64`-wire fields.
///
/// Reading happens lazily, inside whichever setter the handler calls: the
/// scalar type's `WIRE_TYPE` is checked against the tag before anything is
/// read, so a mismatched setter call declines without moving the scanner.
pub struct NumericFieldDecoder<'s, 'a> {
    scanner: &'s mut Scanner<'a>,
    tag: FieldTag,
    consumed: bool,
}

macro_rules! numeric_setters {
    ($singular:ident, $repeated:ident, $ty:ty) => {
        /// Decode this field as a singular scalar, if the wire type matches.
        pub fn $singular(&mut self, target: &mut $ty) -> Result<(), DecodeError> {
            self.decode_singular(target)
        }

        /// Decode this field as one element of a repeated scalar, if the
        /// wire type matches.
        pub fn $repeated(&mut self, target: &mut Vec<$ty>) -> Result<(), DecodeError> {
            self.decode_repeated(target)
        }
    };
}

impl<'s, 'a> NumericFieldDecoder<'s, 'a> {
    fn new(scanner: &'s mut Scanner<'a>, tag: FieldTag) -> Self {
        NumericFieldDecoder {
            scanner,
            tag,
            consumed: false,
        }
    }

    /// Generic singular-scalar setter; the named `decode_*` methods below
    /// are thin wrappers over this for ergonomic call sites.
    pub fn decode_singular<T: ScalarField>(&mut self, target: &mut T) -> Result<(), DecodeError> {
        if let Some(value) = self.read::<T>()? {
            *target = value;
            self.consumed = true;
        }
        Ok(())
    }

    /// Generic repeated-scalar setter (unpacked representation: one value
    /// per field occurrence).
    pub fn decode_repeated<T: ScalarField>(&mut self, target: &mut Vec<T>) -> Result<(), DecodeError> {
        if let Some(value) = self.read::<T>()? {
            target.push(value);
            self.consumed = true;
        }
        Ok(())
    }

    fn read<T: ScalarField>(&mut self) -> Result<Option<T>, DecodeError> {
        if T::WIRE_TYPE != self.tag.wire_type() {
            return Ok(None);
        }
        match T::WIRE_TYPE {
            WireType::Varint => {
                let raw = self
                    .scanner
                    .get_raw_varint()?
                    .ok_or_else(DecodeError::truncated_varint)?;
                Ok(T::from_varint(raw))
            }
            WireType::I32 => {
                let raw = self.scanner.decode_four_byte_number()?;
                Ok(T::from_fixed32(raw))
            }
            WireType::I64 => {
                let raw = self.scanner.decode_eight_byte_number()?;
                Ok(T::from_fixed64(raw))
            }
            WireType::Len | WireType::SGroup | WireType::EGroup => Ok(None),
        }
    }

    numeric_setters!(decode_int32, decode_repeated_int32, i32);
    numeric_setters!(decode_int64, decode_repeated_int64, i64);
    numeric_setters!(decode_uint32, decode_repeated_uint32, u32);
    numeric_setters!(decode_uint64, decode_repeated_uint64, u64);
    numeric_setters!(decode_bool, decode_repeated_bool, bool);
    numeric_setters!(decode_float, decode_repeated_float, f32);
    numeric_setters!(decode_double, decode_repeated_double, f64);

    /// An `enum` field is just an `int32` at the wire level.
    pub fn decode_enum(&mut self, target: &mut i32) -> Result<(), DecodeError> {
        self.decode_int32(target)
    }

    /// `sint32`: zigzag-decoded signed varint.
    pub fn decode_sint32(&mut self, target: &mut i32) -> Result<(), DecodeError> {
        let mut wrapped = crate::scalar::Sint32(*target);
        self.decode_singular(&mut wrapped)?;
        *target = wrapped.0;
        Ok(())
    }

    /// `sint64`: zigzag-decoded signed varint.
    pub fn decode_sint64(&mut self, target: &mut i64) -> Result<(), DecodeError> {
        let mut wrapped = crate::scalar::Sint64(*target);
        self.decode_singular(&mut wrapped)?;
        *target = wrapped.0;
        Ok(())
    }

    /// `fixed32`: little-endian unsigned 32-bit integer.
    pub fn decode_fixed32(&mut self, target: &mut u32) -> Result<(), DecodeError> {
        let mut wrapped = crate::scalar::Fixed32(*target);
        self.decode_singular(&mut wrapped)?;
        *target = wrapped.0;
        Ok(())
    }

    /// `sfixed32`: little-endian signed 32-bit integer.
    pub fn decode_sfixed32(&mut self, target: &mut i32) -> Result<(), DecodeError> {
        let mut wrapped = crate::scalar::Sfixed32(*target);
        self.decode_singular(&mut wrapped)?;
        *target = wrapped.0;
        Ok(())
    }

    /// `fixed64`: little-endian unsigned 64-bit integer.
    pub fn decode_fixed64(&mut self, target: &mut u64) -> Result<(), DecodeError> {
        let mut wrapped = crate::scalar::Fixed64(*target);
        self.decode_singular(&mut wrapped)?;
        *target = wrapped.0;
        Ok(())
    }

    /// `sfixed64`: little-endian signed 64-bit integer.
    pub fn decode_sfixed64(&mut self, target: &mut i64) -> Result<(), DecodeError> {
        let mut wrapped = crate::scalar::Sfixed64(*target);
        self.decode_singular(&mut wrapped)?;
        *target = wrapped.0;
        Ok(())
    }
}

/// Adapter for `Len`-wire fields: strings, bytes, embedded messages, packed
/// repeateds, and map entries all arrive through this variant.
///
/// Unlike [`NumericFieldDecoder`], the sub-slice is carved out and the
/// scanner advanced past it at construction time, so this variant holds a
/// plain borrowed slice rather than a scanner reference.
pub struct LengthDelimitedFieldDecoder<'a, 'x> {
    data: &'a [u8],
    ctx: DecodeCtx<'x>,
    consumed: bool,
    override_bytes: Option<BytesMut>,
}

impl<'a, 'x> LengthDelimitedFieldDecoder<'a, 'x> {
    fn new(data: &'a [u8], ctx: DecodeCtx<'x>) -> Self {
        LengthDelimitedFieldDecoder {
            data,
            ctx,
            consumed: false,
            override_bytes: None,
        }
    }

    /// The field's raw sub-slice, for handlers that want to inspect bytes
    /// directly (extension values commonly do this before delegating to one
    /// of the typed setters below).
    pub fn raw_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// `string`: validates UTF-8 eagerly on construction rather than
    /// deferring to first use.
    pub fn decode_string(&mut self, target: &mut String) -> Result<(), DecodeError> {
        let s = core::str::from_utf8(self.data).map_err(|_| DecodeError::invalid_utf8())?;
        target.clear();
        target.push_str(s);
        self.consumed = true;
        Ok(())
    }

    /// One element of a repeated `string` field.
    pub fn decode_repeated_string(&mut self, target: &mut Vec<String>) -> Result<(), DecodeError> {
        let s = core::str::from_utf8(self.data).map_err(|_| DecodeError::invalid_utf8())?;
        target.push(String::from(s));
        self.consumed = true;
        Ok(())
    }

    /// `bytes`: delivered verbatim, no validation.
    pub fn decode_bytes(&mut self, target: &mut Bytes) -> Result<(), DecodeError> {
        *target = Bytes::copy_from_slice(self.data);
        self.consumed = true;
        Ok(())
    }

    /// One element of a repeated `bytes` field.
    pub fn decode_repeated_bytes(&mut self, target: &mut Vec<Bytes>) -> Result<(), DecodeError> {
        target.push(Bytes::copy_from_slice(self.data));
        self.consumed = true;
        Ok(())
    }

    /// Singular embedded message. The caller is responsible for supplying a
    /// default-constructed target (e.g. via `Option::get_or_insert_with`)
    /// when the field has presence semantics; this setter always decodes
    /// into whatever `target` already is.
    pub fn decode_message<M: MessageHandler>(&mut self, target: &mut M) -> Result<(), DecodeError> {
        self.drive_message(target)?;
        self.consumed = true;
        Ok(())
    }

    /// Repeated embedded message: always appends a freshly decoded element.
    pub fn decode_repeated_message<M: MessageHandler + Default>(
        &mut self,
        target: &mut Vec<M>,
    ) -> Result<(), DecodeError> {
        let mut item = M::default();
        self.drive_message(&mut item)?;
        target.push(item);
        self.consumed = true;
        Ok(())
    }

    fn drive_message<M: MessageHandler>(&mut self, target: &mut M) -> Result<(), DecodeError> {
        let nested_ctx = self.ctx.nested()?;
        let mut scanner = Scanner::sub_scanner(self.data);
        let mut unknown = BytesMut::new();
        let mut extensions_out = ExtensionValues::new();
        decoder::drive(&mut scanner, nested_ctx, target, &mut unknown, &mut extensions_out)?;
        target.attach_unknown_fields(UnknownFieldSet::from_builder(unknown));
        target.attach_extensions(extensions_out);
        Ok(())
    }

    /// Packed repeated scalar: the sub-slice is a concatenation of raw
    /// varint/fixed32/fixed64 values with no tags in between.
    ///
    /// A value the scalar type rejects (see
    /// [`ScalarField::accepts_packed_value`]) is not appended to `target`
    /// but is instead captured into an override buffer that replaces the
    /// naive raw bytes on unknown-field promotion.
    pub fn decode_packed<T: ScalarField>(&mut self, target: &mut Vec<T>) -> Result<(), DecodeError> {
        let element_width = match T::WIRE_TYPE {
            WireType::Varint => None,
            WireType::I32 => Some(4usize),
            WireType::I64 => Some(8usize),
            WireType::Len | WireType::SGroup | WireType::EGroup => return Ok(()),
        };
        if let Some(width) = element_width {
            if self.data.len() % width != 0 {
                return Err(DecodeError::invalid_packed_length(
                    width as u8,
                    self.data.len() as u32,
                ));
            }
        }

        let mut scanner = Scanner::sub_scanner(self.data);
        let mut rejected: Option<BytesMut> = None;
        while !scanner.is_empty() {
            let raw = match T::WIRE_TYPE {
                WireType::Varint => scanner
                    .get_raw_varint()?
                    .ok_or_else(DecodeError::truncated_varint)?,
                WireType::I32 => scanner.decode_four_byte_number()? as u64,
                WireType::I64 => scanner.decode_eight_byte_number()?,
                WireType::Len | WireType::SGroup | WireType::EGroup => unreachable!(),
            };

            if !T::accepts_packed_value(raw) {
                append_packed_raw::<T>(rejected.get_or_insert_with(BytesMut::new), raw);
                continue;
            }

            let value = match T::WIRE_TYPE {
                WireType::Varint => T::from_varint(raw),
                WireType::I32 => T::from_fixed32(raw as u32),
                WireType::I64 => T::from_fixed64(raw),
                WireType::Len | WireType::SGroup | WireType::EGroup => unreachable!(),
            };
            if let Some(value) = value {
                target.push(value);
            }
        }

        self.consumed = true;
        self.override_bytes = rejected;
        Ok(())
    }

    /// Decode the sub-slice as a map entry submessage whose value is a
    /// scalar type: field 1 is the key, field 2 is the value, either
    /// ordering accepted, any other field number ignored. Fails if either
    /// is absent rather than silently substituting a default.
    pub fn decode_map_entry_scalar<K, V, C>(&mut self, map: &mut C) -> Result<(), DecodeError>
    where
        K: crate::map::MapKey + Default,
        V: ScalarField + Default,
        C: Extend<(K, V)>,
    {
        let entry = crate::map::decode_map_entry_scalar::<K, V>(self.data, self.ctx)?;
        map.extend(core::iter::once(entry));
        self.consumed = true;
        Ok(())
    }

    /// As [`Self::decode_map_entry_scalar`], for a map whose value is an
    /// embedded message.
    pub fn decode_map_entry_message<K, M, C>(&mut self, map: &mut C) -> Result<(), DecodeError>
    where
        K: crate::map::MapKey + Default,
        M: MessageHandler + Default,
        C: Extend<(K, M)>,
    {
        let entry = crate::map::decode_map_entry_message::<K, M>(self.data, self.ctx)?;
        map.extend(core::iter::once(entry));
        self.consumed = true;
        Ok(())
    }
}

fn append_packed_raw<T: ScalarField>(buf: &mut BytesMut, raw: u64) {
    match T::WIRE_TYPE {
        WireType::Varint => {
            raw.encode_leb128(buf);
        }
        WireType::I32 => buf.put_u32_le(raw as u32),
        WireType::I64 => buf.put_u64_le(raw),
        WireType::Len | WireType::SGroup | WireType::EGroup => unreachable!(),
    }
}

/// Adapter for legacy `StartGroup`-wire fields.
///
/// Holds the group's field number and a borrow of the shared scanner: a
/// group shares its parent's byte stream rather than a carved-out sub-slice,
/// so decoding one drives the same scanner forward until the matching
/// `EndGroup` is seen.
pub struct GroupFieldDecoder<'s, 'a, 'x> {
    scanner: &'s mut Scanner<'a>,
    ctx: DecodeCtx<'x>,
    field_number: u32,
    consumed: bool,
}

impl<'s, 'a, 'x> GroupFieldDecoder<'s, 'a, 'x> {
    fn new(scanner: &'s mut Scanner<'a>, ctx: DecodeCtx<'x>, field_number: u32) -> Self {
        GroupFieldDecoder {
            scanner,
            ctx,
            field_number,
            consumed: false,
        }
    }

    /// Singular group field: decodes into whatever `target` already is.
    pub fn decode_singular_group<G: MessageHandler>(&mut self, target: &mut G) -> Result<(), DecodeError> {
        self.drive_into(target)?;
        self.consumed = true;
        Ok(())
    }

    /// Repeated group field: always appends a freshly decoded element.
    pub fn decode_repeated_group<G: MessageHandler + Default>(
        &mut self,
        target: &mut Vec<G>,
    ) -> Result<(), DecodeError> {
        let mut item = G::default();
        self.drive_into(&mut item)?;
        target.push(item);
        self.consumed = true;
        Ok(())
    }

    fn drive_into<G: MessageHandler>(&mut self, target: &mut G) -> Result<(), DecodeError> {
        let mut unknown = BytesMut::new();
        let mut extensions_out = ExtensionValues::new();
        decoder::drive_group(
            self.scanner,
            self.ctx,
            target,
            self.field_number,
            &mut unknown,
            &mut extensions_out,
        )?;
        target.attach_unknown_fields(UnknownFieldSet::from_builder(unknown));
        target.attach_extensions(extensions_out);
        Ok(())
    }
}
