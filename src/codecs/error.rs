/// An error raised while discovering, composing, or applying codecs.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A value arrived at a codec with a type other than the one the codec declares as its
    /// source or target.
    #[error("expected a value of type `{expected}`, found `{found}`")]
    UnexpectedType {
        expected: crate::codecs::ValueType,
        found: crate::codecs::ValueType,
    },

    /// No codec is registered under the requested id.
    #[error("no codec registered with id `{0}`")]
    UnknownCodec(String),

    /// The registry has no path of declared codec edges between the two types.
    #[error("no path from `{from}` to `{to}` in the codec registry")]
    NoPath {
        from: crate::codecs::ValueType,
        to: crate::codecs::ValueType,
    },

    /// UTF-8 codec: the bytes were not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON codec (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// MessagePack codec decode failure.
    #[cfg(feature = "codec-msgpack")]
    #[error(transparent)]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// MessagePack codec encode failure.
    #[cfg(feature = "codec-msgpack")]
    #[error(transparent)]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// CBOR codec (de)serialization failure.
    #[cfg(feature = "codec-cbor")]
    #[error(transparent)]
    Cbor(#[from] serde_cbor::Error),
}
