//! The top-level decode driver.
//!
//! [`Decoder`] owns the scanner over a caller-supplied byte range and drives
//! [`MessageHandler::decode_field`] once per tag, routing anything the
//! handler declines through the optional extension table and finally into
//! an unknown-bytes accumulator.

use bytes::{BufMut, BytesMut};

use crate::error::DecodeError;
use crate::extension::{ExtensionRegistry, ExtensionValues};
use crate::field_decoder::FieldDecoder;
use crate::leb128::LebCodec;
use crate::message::{MessageHandler, UnknownFieldSet};
use crate::scanner::Scanner;
use crate::wire::{self, WireType};
use crate::DEFAULT_MAX_DEPTH;

/// Per-decode context threaded through every recursive call: the optional
/// extensions table, and the current/maximum nesting depth. `Copy` so it
/// can be passed by value into each [`FieldDecoder`] without its own
/// lifetime juggling.
#[derive(Clone, Copy)]
pub(crate) struct DecodeCtx<'x> {
    pub(crate) extensions: Option<&'x ExtensionRegistry>,
    depth: u32,
    max_depth: u32,
}

impl<'x> DecodeCtx<'x> {
    fn root(extensions: Option<&'x ExtensionRegistry>, max_depth: u32) -> Self {
        DecodeCtx {
            extensions,
            depth: 0,
            max_depth,
        }
    }

    /// One level deeper, failing if that exceeds the configured maximum.
    pub(crate) fn nested(self) -> Result<Self, DecodeError> {
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(DecodeError::max_depth_exceeded(self.max_depth));
        }
        Ok(DecodeCtx { depth, ..self })
    }
}

/// Top-level driver over a borrowed byte range.
pub struct Decoder<'a, 'x> {
    scanner: Scanner<'a>,
    ctx: DecodeCtx<'x>,
}

impl<'a> Decoder<'a, 'a> {
    /// Construct a decoder with no extension table.
    pub fn new(data: &'a [u8]) -> Self {
        Decoder {
            scanner: Scanner::new(data),
            ctx: DecodeCtx::root(None, DEFAULT_MAX_DEPTH),
        }
    }
}

impl<'a, 'x> Decoder<'a, 'x> {
    /// Construct a decoder that consults `extensions` for any field a
    /// message handler declines.
    pub fn with_extensions(data: &'a [u8], extensions: &'x ExtensionRegistry) -> Self {
        Decoder {
            scanner: Scanner::new(data),
            ctx: DecodeCtx::root(Some(extensions), DEFAULT_MAX_DEPTH),
        }
    }

    /// Override the default recursion-depth limit of
    /// [`DEFAULT_MAX_DEPTH`].
    pub fn max_depth(&mut self, depth: u32) -> &mut Self {
        self.ctx.max_depth = depth;
        self
    }

    /// Decode the entire input as one message, dispatching each field to
    /// `handler`.
    ///
    /// On success, `handler`'s unknown-field bytes and decoded extensions
    /// (if any) have been attached via [`MessageHandler::attach_unknown_fields`]
    /// / [`MessageHandler::attach_extensions`].
    pub fn decode_full_object<H: MessageHandler>(mut self, handler: &mut H) -> Result<(), DecodeError> {
        let mut unknown = BytesMut::new();
        let mut extensions_out = ExtensionValues::new();
        drive(&mut self.scanner, self.ctx, handler, &mut unknown, &mut extensions_out)?;
        handler.attach_unknown_fields(UnknownFieldSet::from_builder(unknown));
        handler.attach_extensions(extensions_out);
        Ok(())
    }
}

/// Drive `scanner` to end-of-input, dispatching each tag to `handler`.
///
/// Shared by [`Decoder::decode_full_object`] and, recursively, by
/// [`crate::field_decoder::LengthDelimitedFieldDecoder::decode_message`]'s
/// sub-decode over a fresh sub-slice scanner.
pub(crate) fn drive<H: MessageHandler>(
    scanner: &mut Scanner<'_>,
    ctx: DecodeCtx<'_>,
    handler: &mut H,
    unknown: &mut BytesMut,
    extensions_out: &mut ExtensionValues,
) -> Result<(), DecodeError> {
    loop {
        let tag = match scanner.get_tag()? {
            Some(tag) => tag,
            None => break,
        };
        dispatch_one(scanner, ctx, handler, tag, unknown, extensions_out)?;
    }
    // Always true in practice: `get_tag` only returns `None` once
    // `remaining == 0`. Checked anyway to surface the TrailingGarbage
    // error kind explicitly.
    if !scanner.is_empty() {
        return Err(DecodeError::trailing_garbage());
    }
    Ok(())
}

/// Drive `scanner` (shared with the enclosing message) until the matching
/// `EndGroup` tag for `field_number` is seen. Precondition: the last tag
/// read off `scanner` was a `StartGroup` for `field_number`.
pub(crate) fn drive_group<H: MessageHandler>(
    scanner: &mut Scanner<'_>,
    ctx: DecodeCtx<'_>,
    handler: &mut H,
    field_number: u32,
    unknown: &mut BytesMut,
    extensions_out: &mut ExtensionValues,
) -> Result<(), DecodeError> {
    loop {
        let tag = scanner.get_tag()?.ok_or_else(DecodeError::truncated_group)?;
        if tag.field_number() == field_number {
            return match tag.wire_type() {
                WireType::EGroup => Ok(()),
                _ => Err(DecodeError::unmatched_start_group(field_number)),
            };
        }
        dispatch_one(scanner, ctx, handler, tag, unknown, extensions_out)?;
    }
}

/// Handle exactly one tag already read off `scanner`: build the matching
/// [`FieldDecoder`], offer it to `handler`, then (if still unconsumed) to
/// the extension table, then preserve whatever remains unclaimed as an
/// unknown field.
fn dispatch_one<H: MessageHandler>(
    scanner: &mut Scanner<'_>,
    ctx: DecodeCtx<'_>,
    handler: &mut H,
    tag: crate::wire::FieldTag,
    unknown: &mut BytesMut,
    extensions_out: &mut ExtensionValues,
) -> Result<(), DecodeError> {
    let field_number = tag.field_number();
    let mut consumed;
    let packed_override;
    {
        let mut field = FieldDecoder::new(scanner, tag, ctx)?;
        handler.decode_field(&mut field, field_number)?;
        consumed = field.consumed();

        if !consumed {
            if let Some(factory) = ctx
                .extensions
                .and_then(|registry| registry.lookup(H::TYPE_NAME, field_number))
            {
                let mut extension = factory();
                extension.decode_field(&mut field)?;
                consumed = field.consumed();
                if consumed {
                    extensions_out.push(field_number, extension);
                }
            }
        }

        packed_override = field.take_packed_override();
        // `field` drops here, releasing its borrow of `scanner` (held for
        // the `Numeric`/`Group` variants) before we touch `scanner` again
        // below.
    }

    if let Some(payload) = packed_override {
        append_override_field(unknown, field_number, &payload);
    }

    if !consumed {
        let raw = scanner.get_raw_field()?;
        unknown.extend_from_slice(raw);
    }

    Ok(())
}

/// Re-encode a packed-scalar override payload as a single fresh
/// length-delimited unknown field.
fn append_override_field(unknown: &mut BytesMut, field_number: u32, payload: &[u8]) {
    wire::encode_tag(WireType::Len, field_number, unknown);
    (payload.len() as u64).encode_leb128(unknown);
    unknown.put_slice(payload);
}
