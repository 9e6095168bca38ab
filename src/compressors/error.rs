/// An error raised while building a compressor, compressing, decompressing, or training a
/// dictionary.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No compressor factory is registered under the requested id.
    #[error("no compressor registered with id `{0}`")]
    UnknownCompressor(String),

    /// The requested compressor doesn't support shared dictionaries at all.
    #[error("compressor `{0}` doesn't support shared dictionaries")]
    DictionariesUnsupported(&'static str),

    /// Compression failed.
    #[error("compression failed")]
    Compress(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Decompression failed.
    #[error("decompression failed")]
    Decompress(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Dictionary training failed.
    #[error("dictionary training failed")]
    Train(#[source] Box<dyn std::error::Error + Send + Sync>),
}
