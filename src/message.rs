//! The message-handler contract: the generated message surface this crate
//! treats as an external collaborator.
//!
//! A concrete message type implements [`MessageHandler`] by matching on
//! `field_number` and invoking exactly one typed setter on the
//! [`FieldDecoder`] it's handed — a push/callback inversion of a more
//! conventional per-message pull loop.

use crate::error::DecodeError;
use crate::extension::ExtensionValues;
use crate::field_decoder::FieldDecoder;

use alloc::vec::Vec;
use bytes::{Bytes, BytesMut};

/// One message type's field-dispatch contract.
///
/// `decode_field` is called once per field encountered on the wire, with
/// a [`FieldDecoder`] already constructed for that field's wire type.
/// Implementations should match `field_number` against their known schema
/// and invoke a typed setter method on `field`. Whether the field actually
/// ended up consumed is read back from `field.consumed()` afterwards, not
/// from this method's return value — a handler that calls a setter which
/// itself declines (wrong wire type for the schema) must not be able to
/// claim the field anyway. Returning without calling a setter (or calling
/// one that declines) leaves the field unconsumed; the driver will then
/// consult extensions and, failing that, preserve it as unknown.
pub trait MessageHandler {
    /// Name used to key extension lookups for this message type. Message
    /// types that never register extensions can leave the default.
    const TYPE_NAME: &'static str = "";

    /// Dispatch one field. See the trait documentation for the contract.
    fn decode_field(
        &mut self,
        field: &mut FieldDecoder<'_, '_, '_>,
        field_number: u32,
    ) -> Result<(), DecodeError>;

    /// Attach the accumulated unknown-field bytes once decoding finishes.
    /// Message types that don't preserve unknown fields can ignore this.
    fn attach_unknown_fields(&mut self, _unknown: UnknownFieldSet) {}

    /// Attach decoded extension values once decoding finishes. Message
    /// types that never register extensions can ignore this.
    fn attach_extensions(&mut self, _extensions: ExtensionValues) {}
}

/// Owned accumulator of unknown-field bytes, attached to a decoded message.
///
/// Bytes are appended verbatim, in encounter order, with no deduplication.
/// Re-encoding a message simply needs to append this set's bytes after its
/// known fields to preserve round-trip fidelity for fields the current
/// schema doesn't recognize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFieldSet {
    bytes: Bytes,
}

impl UnknownFieldSet {
    pub(crate) fn from_builder(builder: BytesMut) -> Self {
        UnknownFieldSet {
            bytes: builder.freeze(),
        }
    }

    /// The raw, re-encodable bytes of every unknown field, concatenated in
    /// encounter order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// True if no unknown fields were encountered.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(feature = "alloc")]
impl From<UnknownFieldSet> for Vec<u8> {
    fn from(set: UnknownFieldSet) -> Self {
        set.bytes.to_vec()
    }
}
