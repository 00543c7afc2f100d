#![no_std]
#![allow(clippy::as_conversions)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod leb128;
pub mod scalar;
pub mod scanner;
mod util;
pub mod wire;

// Everything above this line operates on a plain borrowed `&[u8]` with no
// allocation. Everything below builds the push/callback decode driver on
// top of it, which needs `Vec`/`BytesMut` for unknown-field accumulation
// and repeated-field storage, hence the `alloc` gate.
#[cfg(feature = "alloc")]
pub mod decoder;
#[cfg(feature = "alloc")]
pub mod extension;
#[cfg(feature = "alloc")]
pub mod field_decoder;
#[cfg(feature = "alloc")]
pub mod map;
#[cfg(feature = "alloc")]
pub mod message;

pub use error::DecodeError;
pub use wire::{FieldTag, WireType};

#[cfg(feature = "alloc")]
pub use decoder::Decoder;
#[cfg(feature = "alloc")]
pub use extension::{ExtensionRegistry, ExtensionValues};
#[cfg(feature = "alloc")]
pub use field_decoder::FieldDecoder;
#[cfg(feature = "alloc")]
pub use map::MapKey;
#[cfg(feature = "alloc")]
pub use message::{MessageHandler, UnknownFieldSet};

/// Default maximum nesting depth for recursive message/group decode.
///
/// Unbounded recursion on adversarial nested input can exhaust the call
/// stack; callers may override via [`Decoder::max_depth`].
pub const DEFAULT_MAX_DEPTH: u32 = 100;
