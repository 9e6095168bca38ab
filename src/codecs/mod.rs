//! Reversible, registry-discoverable transformations between stored bytes and user-facing values.
//!
//! A [`Codec`] is a named, reversible map between two declared [`ValueType`]s. A [`TransformerStack`]
//! composes an ordered chain of them; applying it forward turns storage bytes into a user value,
//! applying it in reverse turns a user value into storage bytes. [`registry::global`] indexes every
//! built-in codec by its declared types and can discover the shortest chain between any two.

mod value;
pub use crate::codecs::value::{DynValue, ValueType};

mod error;
pub use crate::codecs::error::Error;

mod codec;
pub use crate::codecs::codec::Codec;

mod stack;
pub use crate::codecs::stack::TransformerStack;

pub mod registry;
pub use crate::codecs::registry::Registry;

pub mod builtin;
