/// Identifies which compression algorithm a compressor instance implements, for logging and for
/// the `compression` metadata entry persisted alongside the cache.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Method {
    /// No compression; bytes pass through unchanged.
    None,
    /// Brotli: strong ratios on text, no dictionary support here.
    Brotli,
    /// Bzip2: block-sorting, high ratio, slow; no dictionary support.
    Bzip2,
    /// Deflate (raw, no gzip/zlib framing); no dictionary support here.
    Deflate,
    /// LZ4: very fast decompression, supports a shared dictionary.
    Lz4,
    /// Zstandard: tunable speed/ratio trade-off, supports a shared dictionary.
    Zstd,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl Method {
    /// The stable id persisted in the cache's `compression` metadata entry.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Brotli => "brotli",
            Self::Bzip2 => "bzip2",
            Self::Deflate => "deflate",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }
}
