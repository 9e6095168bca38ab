//! Built-in codecs and the predefined transformer-stack "flavors" composed from them.

mod utf8;
pub use utf8::{Utf8Codec, UTF8};

mod json;
pub use json::{JsonCodec, JSON};

#[cfg(feature = "codec-msgpack")]
mod msgpack;
#[cfg(feature = "codec-msgpack")]
pub use msgpack::{MsgPackCodec, MSGPACK};

#[cfg(feature = "codec-cbor")]
mod cbor;
#[cfg(feature = "codec-cbor")]
pub use cbor::{CborCodec, CBOR};

use crate::codecs::registry::Registry;
use crate::codecs::{Codec, TransformerStack};
use std::sync::OnceLock;

/// Registers every built-in codec into `registry`. Called once to populate
/// [`crate::codecs::registry::global`].
pub fn register_all(registry: &Registry) {
    registry.register(&UTF8 as &'static dyn Codec);
    registry.register(&JSON as &'static dyn Codec);
    #[cfg(feature = "codec-msgpack")]
    registry.register(&MSGPACK as &'static dyn Codec);
    #[cfg(feature = "codec-cbor")]
    registry.register(&CBOR as &'static dyn Codec);
}

/// The `blob` flavor: raw bytes in, raw bytes out. The empty stack.
#[must_use]
pub fn blob_stack() -> &'static TransformerStack {
    static STACK: OnceLock<TransformerStack> = OnceLock::new();
    STACK.get_or_init(TransformerStack::empty)
}

/// The `string` flavor: `{utf8}`, appended onto `blob`.
#[must_use]
pub fn string_stack() -> &'static TransformerStack {
    static STACK: OnceLock<TransformerStack> = OnceLock::new();
    STACK.get_or_init(|| blob_stack().append(&[&UTF8]))
}

/// The `json` flavor: `{utf8, json}`, appended onto `string`.
#[must_use]
pub fn json_stack() -> &'static TransformerStack {
    static STACK: OnceLock<TransformerStack> = OnceLock::new();
    STACK.get_or_init(|| string_stack().append(&[&JSON]))
}

/// The `msgpack` flavor: `{msgpack}`, appended onto `blob` directly (binary codecs skip `utf8`).
#[cfg(feature = "codec-msgpack")]
#[must_use]
pub fn msgpack_stack() -> &'static TransformerStack {
    static STACK: OnceLock<TransformerStack> = OnceLock::new();
    STACK.get_or_init(|| blob_stack().append(&[&MSGPACK]))
}

/// The `cbor` flavor: `{cbor}`, appended onto `blob` directly.
#[cfg(feature = "codec-cbor")]
#[must_use]
pub fn cbor_stack() -> &'static TransformerStack {
    static STACK: OnceLock<TransformerStack> = OnceLock::new();
    STACK.get_or_init(|| blob_stack().append(&[&CBOR]))
}
