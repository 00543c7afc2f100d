//! Low-level cursor over an input byte range.
//!
//! The [`Scanner`] produces tags and primitive numeric values, and supports
//! skip-with-rewind so unknown fields (including nested groups) can be
//! re-materialized as raw bytes without a second parse pass.

use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::wire::{self, FieldTag, WireType};

/// Cursor over a borrowed, immutable byte range.
///
/// Tracks not just the current position but a snapshot of where the most
/// recently returned tag started (`field_start`) and, lazily, where that
/// field ends (`field_end`) — the state needed to support
/// [`Scanner::skip`] and [`Scanner::get_raw_field`] without re-parsing from
/// the top of the input.
pub struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
    field_start: usize,
    field_end: Option<usize>,
    last_wire_type: Option<WireType>,
}

impl<'a> Scanner<'a> {
    /// Construct a scanner over the full input range.
    pub fn new(data: &'a [u8]) -> Self {
        Scanner {
            data,
            pos: 0,
            field_start: 0,
            field_end: None,
            last_wire_type: None,
        }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once the cursor has reached the end of the input.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Read a tag, starting a new field. Returns `None` at a clean
    /// end-of-input (`remaining == 0` before any byte is read).
    ///
    /// Fails [`DecodeError::invalid_wire_type`] / [`DecodeError::zero_field_number`]
    /// for a structurally invalid tag, and truncation errors for a tag that
    /// runs off the end of the input.
    pub fn get_tag(&mut self) -> Result<Option<FieldTag>, DecodeError> {
        if self.is_empty() {
            return Ok(None);
        }
        self.field_start = self.pos;
        self.field_end = None;

        let (tag, consumed) = wire::decode_tag(self.rest())?;
        self.pos += consumed;
        self.last_wire_type = Some(tag.wire_type());
        Ok(Some(tag))
    }

    /// Read a raw varint (up to 10 bytes). Returns `None` only when
    /// `remaining == 0` before the first byte is read.
    pub fn get_raw_varint(&mut self) -> Result<Option<u64>, DecodeError> {
        if self.is_empty() {
            return Ok(None);
        }
        let (value, consumed) = u64::decode_leb128_safe(self.rest())?;
        self.pos += consumed;
        Ok(Some(value))
    }

    /// Copy exactly 4 little-endian bytes into a `u32`.
    pub fn decode_four_byte_number(&mut self) -> Result<u32, DecodeError> {
        if self.remaining() < 4 {
            return Err(DecodeError::truncated_fixed32());
        }
        let bytes: [u8; 4] = self.data[self.pos..self.pos + 4].try_into().unwrap();
        self.pos += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Copy exactly 8 little-endian bytes into a `u64`.
    pub fn decode_eight_byte_number(&mut self) -> Result<u64, DecodeError> {
        if self.remaining() < 8 {
            return Err(DecodeError::truncated_fixed64());
        }
        let bytes: [u8; 8] = self.data[self.pos..self.pos + 8].try_into().unwrap();
        self.pos += 8;
        Ok(u64::from_le_bytes(bytes))
    }

    /// Read a length-delimited field's length prefix, returning a
    /// zero-copy sub-slice of exactly that many bytes and advancing past
    /// it.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8], DecodeError> {
        let (len, consumed) = wire::decode_len(self.rest())?;
        if len > self.remaining() - consumed {
            return Err(DecodeError::length_exceeds_remaining(len as u64));
        }
        let start = self.pos + consumed;
        let end = start + len;
        self.pos = end;
        Ok(&self.data[start..end])
    }

    /// Advance past the current field. If `field_end` is already known,
    /// jump straight to it; otherwise rewind to `field_start`, re-read the
    /// tag, and skip over its payload (recursing into groups).
    pub fn skip(&mut self) -> Result<(), DecodeError> {
        if let Some(end) = self.field_end {
            self.pos = end;
            return Ok(());
        }

        self.pos = self.field_start;
        let (tag, consumed) = wire::decode_tag(self.rest())?;
        self.pos += consumed;
        self.skip_over(tag)?;
        self.field_end = Some(self.pos);
        Ok(())
    }

    /// Skip over the payload of `tag`, whose key bytes have already been
    /// consumed. Recurses into nested groups.
    pub fn skip_over(&mut self, tag: FieldTag) -> Result<(), DecodeError> {
        match tag.wire_type() {
            WireType::Varint => {
                self.get_raw_varint()?
                    .ok_or_else(DecodeError::truncated_varint)?;
                Ok(())
            }
            WireType::I64 => {
                self.decode_eight_byte_number()?;
                Ok(())
            }
            WireType::I32 => {
                self.decode_four_byte_number()?;
                Ok(())
            }
            WireType::Len => {
                self.read_length_delimited()?;
                Ok(())
            }
            WireType::SGroup => self.skip_group(tag.field_number()),
            WireType::EGroup => Err(DecodeError::unmatched_end_group(tag.field_number())),
        }
    }

    /// Recursively skip a group body until its matching `EndGroup` for
    /// `field_number` is seen.
    fn skip_group(&mut self, field_number: u32) -> Result<(), DecodeError> {
        loop {
            let inner = self
                .get_tag()?
                .ok_or_else(DecodeError::truncated_group)?;
            if inner.field_number() == field_number {
                if inner.wire_type() == WireType::EGroup {
                    return Ok(());
                }
                return Err(DecodeError::unmatched_start_group(field_number));
            }
            self.skip_over(inner)?;
        }
    }

    /// Run [`Scanner::skip`] and return the half-open slice
    /// `[field_start, field_end)`: the complete on-the-wire representation
    /// of the field, tag included.
    pub fn get_raw_field(&mut self) -> Result<&'a [u8], DecodeError> {
        self.skip()?;
        let end = self.field_end.expect("skip() always sets field_end");
        Ok(&self.data[self.field_start..end])
    }

    /// The wire type of the most recently read tag, if any.
    #[inline]
    pub fn last_wire_type(&self) -> Option<WireType> {
        self.last_wire_type
    }

    /// Construct a fresh scanner over a borrowed sub-range (used for
    /// recursive decode of nested messages and map entries).
    pub fn sub_scanner(data: &'a [u8]) -> Self {
        Scanner::new(data)
    }
}
