//! Extension field dispatch: an optional table mapping
//! `(message type, field number)` to a factory for a typed extension value,
//! consulted only when a message handler declines a field.

use core::any::Any;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::DecodeError;
use crate::field_decoder::FieldDecoder;

/// One extension field's own dispatch contract: offered the very
/// [`FieldDecoder`] the declining message handler was given, so it can
/// select whichever typed setter its extension schema expects.
pub trait ExtensionValue: Any {
    /// Attempt to absorb the field. Leaves the decoder unconsumed on a
    /// mismatch, same contract as [`crate::message::MessageHandler::decode_field`].
    fn decode_field(&mut self, field: &mut FieldDecoder<'_, '_, '_>) -> Result<(), DecodeError>;

    /// Enables downcasting a decoded value back to its concrete type via
    /// [`ExtensionValues::get`].
    fn as_any(&self) -> &dyn Any;
}

/// Produces a fresh, empty extension value ready to receive one field.
pub type ExtensionFactory = fn() -> Box<dyn ExtensionValue>;

/// Lookup table from `(message type name, field number)` to the factory for
/// that extension's value type.
///
/// A linear scan over a small `Vec` rather than a `BTreeMap` keyed on
/// `(&'static str, u32)`: registries are built once and hold a handful of
/// entries, consulted only on the unknown-field slow path, so simplicity
/// wins over working around `Borrow`'s lack of a convenient blanket impl
/// for tuple-key lookups at a different lifetime.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: Vec<(&'static str, u32, ExtensionFactory)>,
}

impl ExtensionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        ExtensionRegistry { entries: Vec::new() }
    }

    /// Register an extension factory for `field_number` on messages of
    /// type `type_name` (matched against [`crate::message::MessageHandler::TYPE_NAME`]).
    pub fn register(&mut self, type_name: &'static str, field_number: u32, factory: ExtensionFactory) {
        self.entries.push((type_name, field_number, factory));
    }

    pub(crate) fn lookup(&self, type_name: &'static str, field_number: u32) -> Option<ExtensionFactory> {
        self.entries
            .iter()
            .find(|(name, number, _)| *name == type_name && *number == field_number)
            .map(|(_, _, factory)| *factory)
    }
}

/// Decoded extension values collected while decoding one message, attached
/// via [`crate::message::MessageHandler::attach_extensions`].
#[derive(Default)]
pub struct ExtensionValues {
    entries: Vec<(u32, Box<dyn ExtensionValue>)>,
}

impl ExtensionValues {
    pub(crate) fn new() -> Self {
        ExtensionValues { entries: Vec::new() }
    }

    pub(crate) fn push(&mut self, field_number: u32, value: Box<dyn ExtensionValue>) {
        self.entries.push((field_number, value));
    }

    /// True if no extension fields were encountered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The decoded value at `field_number`, downcast to `T`, if present and
    /// of that concrete type.
    pub fn get<T: 'static>(&self, field_number: u32) -> Option<&T> {
        self.entries
            .iter()
            .find(|(number, _)| *number == field_number)
            .and_then(|(_, value)| value.as_any().downcast_ref::<T>())
    }
}
