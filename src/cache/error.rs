/// An error raised by the cache facade, or bubbled up from one of its layers.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A codec-layer failure: unknown codec, no transform path between two types, or a
    /// forward/reverse conversion itself failing.
    #[error(transparent)]
    Codec(#[from] crate::codecs::Error),

    /// A compressor-layer failure: unknown compressor, unsupported dictionary, or the underlying
    /// library rejecting input.
    #[error(transparent)]
    Compressor(#[from] crate::compressors::Error),

    /// A storage-engine failure bubbled up as-is.
    #[error(transparent)]
    Backend(#[from] crate::backend::Error),

    /// `base` (the construction argument naming where/how to open the cache) was of an
    /// unrecognised kind.
    #[error("unrecognised cache base: {0}")]
    BadBase(String),

    /// The persisted `serializers` codec-stack id differs from the one this cache was opened
    /// with.
    #[error("incompatible codec stack: persisted `{persisted:?}`, declared `{declared:?}`")]
    IncompatibleCodecs { persisted: Vec<String>, declared: Vec<String> },

    /// The persisted key type differs from the one this cache was opened with (outside the
    /// declared-`any`-over-stored-`bytes` exception).
    #[error("incompatible key type: persisted `{persisted}`, declared `{declared}`")]
    IncompatibleKeyType { persisted: String, declared: String },

    /// The requested operation doesn't apply in the cache's current state (for example,
    /// `optimize_compression` on a compressor that doesn't support dictionaries).
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// An internal invariant was violated — surfaced rather than silently tolerated. Notably: the
    /// in-database `recompress` function was invoked outside an active dictionary swap.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}
