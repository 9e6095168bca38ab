//! The cache facade: the entity application code interacts with. Owns the backend, the value
//! codec stack, the compressor, commit accounting, and metadata.

mod cache;
mod error;
mod key_type;
mod metadata;
mod value;

pub use cache::{Base, Cache, CacheOptions, CompressorSelector};
pub use error::Error;
pub use key_type::KeyType;
pub use value::CacheValue;
pub use value::Json;

#[cfg(feature = "codec-msgpack")]
pub use value::MsgPack;

#[cfg(feature = "codec-cbor")]
pub use value::Cbor;
