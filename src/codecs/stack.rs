//! Ordered composition of codecs into a stack whose identity is persisted on disk.

use crate::codecs::{Codec, DynValue, Error};

/// An ordered chain of codecs, applied forward (decode, storage -> user value) in list order and
/// reverse (encode, user value -> storage) in reverse list order.
///
/// A stack is immutable once built. Two stacks are equal iff their codec-id tuples match — this
/// is exactly the comparison the cache facade uses against the persisted `serializers` metadata
/// entry when reopening a file.
///
/// # Hierarchical composition
///
/// Predefined flavors build on one another: `blob` is empty, `string` appends `utf8` onto `blob`,
/// `json` appends `json` onto `string`, and so on. [`TransformerStack::append`] is how a derived
/// flavor extends its parent's stack.
#[derive(Clone)]
pub struct TransformerStack {
    codecs: Vec<&'static dyn Codec>,
}

impl TransformerStack {
    /// The empty stack — the `blob` flavor, raw bytes in and out.
    #[must_use]
    pub const fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Builds a stack from an explicit codec chain.
    ///
    /// # Panics
    ///
    /// Panics if the chain isn't composable: `codecs[i].target_type() != codecs[i + 1].source_type()`
    /// for some `i`. This is checked at construction, not on every `forward`/`reverse` call, because
    /// stacks are built once (usually as `static` flavor definitions) and reused for the life of
    /// the program.
    #[must_use]
    pub fn new(codecs: Vec<&'static dyn Codec>) -> Self {
        for pair in codecs.windows(2) {
            assert_eq!(
                pair[0].target_type(),
                pair[1].source_type(),
                "non-composable codec chain: `{}` targets `{}` but `{}` expects `{}`",
                pair[0].id(), pair[0].target_type(), pair[1].id(), pair[1].source_type(),
            );
        }
        Self { codecs }
    }

    /// Returns a new stack with `extra` appended after this stack's existing codecs.
    #[must_use]
    pub fn append(&self, extra: &[&'static dyn Codec]) -> Self {
        let mut codecs = self.codecs.clone();
        codecs.extend_from_slice(extra);
        Self::new(codecs)
    }

    /// The persisted identity of this stack: the ordered tuple of codec ids.
    #[must_use]
    pub fn id(&self) -> Vec<&'static str> {
        self.codecs.iter().map(|c| c.id()).collect()
    }

    /// The [`crate::codecs::ValueType`] this stack expects at its raw (storage) end, or `None` for
    /// an empty stack (which passes its input straight through).
    #[must_use]
    pub fn source_type(&self) -> Option<crate::codecs::ValueType> {
        self.codecs.first().map(|c| c.source_type())
    }

    /// The [`crate::codecs::ValueType`] this stack produces at its user-facing end, or `None` for
    /// an empty stack.
    #[must_use]
    pub fn target_type(&self) -> Option<crate::codecs::ValueType> {
        self.codecs.last().map(|c| c.target_type())
    }

    /// Applies the stack forward: storage-side value -> user-facing value (the read/decode path).
    ///
    /// # Errors
    ///
    /// Propagates the first codec error encountered.
    pub fn forward(&self, mut value: DynValue) -> Result<DynValue, Error> {
        for codec in &self.codecs {
            value = codec.forward(value)?;
        }
        Ok(value)
    }

    /// Applies the stack in reverse: user-facing value -> storage-side value (the write/encode
    /// path).
    ///
    /// # Errors
    ///
    /// Propagates the first codec error encountered.
    pub fn reverse(&self, mut value: DynValue) -> Result<DynValue, Error> {
        for codec in self.codecs.iter().rev() {
            value = codec.reverse(value)?;
        }
        Ok(value)
    }
}

impl PartialEq for TransformerStack {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TransformerStack {}

impl std::fmt::Debug for TransformerStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerStack").field("id", &self.id()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::builtin;

    #[test]
    fn blob_stack_is_empty() {
        assert!(builtin::blob_stack().id().is_empty());
    }

    #[test]
    fn string_stack_round_trips() {
        let stack = builtin::string_stack();
        let encoded = stack.reverse(DynValue::Str("hello".into())).unwrap();
        let bytes = encoded.into_bytes().unwrap();
        assert_eq!(bytes, b"hello");
        let decoded = stack.forward(DynValue::Bytes(bytes)).unwrap();
        assert_eq!(decoded.into_str().unwrap(), "hello");
    }

    #[test]
    fn json_stack_round_trips() {
        let stack = builtin::json_stack();
        let value = serde_json::json!({"a": [1, 2, 3.5], "b": null, "c": {}});
        let encoded = stack.reverse(DynValue::Structured(value.clone())).unwrap();
        let decoded = stack.forward(encoded).unwrap();
        assert_eq!(decoded.into_structured().unwrap(), value);
    }

    #[test]
    fn stack_identity_matches_codec_ids() {
        assert_eq!(builtin::string_stack().id(), vec!["utf8"]);
        assert_eq!(builtin::json_stack().id(), vec!["utf8", "json"]);
    }

    fn prop_string_stack_round_trips(s: String) -> bool {
        let stack = builtin::string_stack();
        let Ok(encoded) = stack.reverse(DynValue::Str(s.clone())) else { return false };
        let Ok(decoded) = stack.forward(encoded) else { return false };
        decoded.into_str().is_ok_and(|out| out == s)
    }

    #[test]
    fn quickcheck_string_stack_round_trips() {
        quickcheck::quickcheck(prop_string_stack_round_trips as fn(String) -> bool);
    }

    /// A small, quickcheck-friendly stand-in for `serde_json::Value`: covers enough of the shape
    /// space to exercise the json codec without needing a recursive `Arbitrary` impl.
    #[derive(Clone, Debug)]
    enum SimpleJson {
        Null,
        Bool(bool),
        Number(i32),
        Text(String),
        List(Vec<i32>),
    }

    impl quickcheck::Arbitrary for SimpleJson {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            match u8::arbitrary(g) % 5 {
                0 => Self::Null,
                1 => Self::Bool(bool::arbitrary(g)),
                2 => Self::Number(i32::arbitrary(g)),
                3 => Self::Text(String::arbitrary(g)),
                _ => Self::List(Vec::<i32>::arbitrary(g)),
            }
        }
    }

    impl From<SimpleJson> for serde_json::Value {
        fn from(v: SimpleJson) -> Self {
            match v {
                SimpleJson::Null => Self::Null,
                SimpleJson::Bool(b) => serde_json::json!(b),
                SimpleJson::Number(n) => serde_json::json!(n),
                SimpleJson::Text(s) => serde_json::json!(s),
                SimpleJson::List(xs) => serde_json::json!(xs),
            }
        }
    }

    fn prop_json_stack_round_trips(value: SimpleJson) -> bool {
        let json: serde_json::Value = value.into();
        let stack = builtin::json_stack();
        let Ok(encoded) = stack.reverse(DynValue::Structured(json.clone())) else { return false };
        let Ok(decoded) = stack.forward(encoded) else { return false };
        decoded.into_structured().is_ok_and(|out| out == json)
    }

    #[test]
    fn quickcheck_json_stack_round_trips() {
        quickcheck::quickcheck(prop_json_stack_round_trips as fn(SimpleJson) -> bool);
    }
}
