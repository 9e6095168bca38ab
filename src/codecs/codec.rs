use crate::codecs::{DynValue, Error, ValueType};

/// A reversible map between two declared [`ValueType`]s, identified by a stable string id.
///
/// A [`crate::codecs::TransformerStack`] is an ordered chain of these; the id of every codec in
/// the chain, in order, is the stack's persisted identity: the on-disk `serializers` metadata
/// entry must match it verbatim.
///
/// # Type Migrations
///
/// `blobcache` does not itself version stored values. If your value type changes shape over time,
/// version it at the application layer (an envelope struct with a schema tag works well with any
/// of the built-in flavors).
pub trait Codec: Send + Sync {
    /// The codec's stable id, persisted as part of a stack's identity.
    fn id(&self) -> &'static str;

    /// The type this codec accepts on its "forward" (decode) side.
    fn source_type(&self) -> ValueType;

    /// The type this codec produces on its "forward" (decode) side.
    fn target_type(&self) -> ValueType;

    /// Converts a value of [`Self::source_type`] into one of [`Self::target_type`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedType`] if `input` doesn't carry `source_type`, or a
    /// codec-specific decode error.
    fn forward(&self, input: DynValue) -> Result<DynValue, Error>;

    /// Converts a value of [`Self::target_type`] back into one of [`Self::source_type`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedType`] if `input` doesn't carry `target_type`, or a
    /// codec-specific encode error.
    fn reverse(&self, input: DynValue) -> Result<DynValue, Error>;
}
