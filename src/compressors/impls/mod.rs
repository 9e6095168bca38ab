//! Concrete compressor implementations, one module per backing crate.

pub mod none;

#[cfg(feature = "compress-brotli")]
pub mod brotli;

#[cfg(feature = "compress-bzip2")]
pub mod bzip2;

#[cfg(feature = "compress-deflate")]
pub mod deflate;

#[cfg(feature = "compress-lz4")]
pub mod lz4;

#[cfg(feature = "compress-zstd")]
pub mod zstd;

/// Registers every compressor enabled via Cargo features into `registry`. `none` is always
/// registered.
pub fn register_all(registry: &crate::compressors::factory::Registry) {
    registry.register(&none::FACTORY);

    #[cfg(feature = "compress-brotli")]
    registry.register(&brotli::FACTORY);

    #[cfg(feature = "compress-bzip2")]
    registry.register(&bzip2::FACTORY);

    #[cfg(feature = "compress-deflate")]
    registry.register(&deflate::FACTORY);

    #[cfg(feature = "compress-lz4")]
    registry.register(&lz4::FACTORY);

    #[cfg(feature = "compress-zstd")]
    registry.register(&zstd::FACTORY);
}
