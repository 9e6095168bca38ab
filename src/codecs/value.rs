//! The dynamic value representation that flows through a [`crate::codecs::TransformerStack`].
//!
//! Codecs are reversible maps between two *declared types*. Because the set of declared types is
//! open-ended in principle but small in practice (raw bytes, UTF-8 text, and a canonical
//! "structured" value shared by every self-describing serialization format), we represent it as a
//! closed enum rather than reaching for full dynamic typing. `serde_json::Value` stands in for the
//! structured type: msgpack and cbor both deserialize into it just as readily as json does, so a
//! single canonical representation lets one registry and one stack implementation serve every
//! serde-based flavor.

/// Tags the type a value carries as it moves through a [`crate::Codec`] chain.
///
/// These are the nodes of the registry's type graph (see
/// [`crate::codecs::registry::shortest_path`]).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueType {
    /// Raw, uninterpreted bytes. The type every backend can store natively.
    Bytes,
    /// UTF-8 text.
    Str,
    /// A signed 64-bit integer, used for fixed-width integer keys.
    Int,
    /// A structured, self-describing value (the data model shared by JSON/MessagePack/CBOR).
    Structured,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes => write!(f, "bytes"),
            Self::Str => write!(f, "str"),
            Self::Int => write!(f, "int"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

/// A value tagged with its current [`ValueType`], as it is handed between codecs in a stack.
#[derive(Clone, Debug)]
pub enum DynValue {
    Bytes(Vec<u8>),
    Str(String),
    Int(i64),
    Structured(serde_json::Value),
}

impl DynValue {
    /// The [`ValueType`] tag of this value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Bytes(_) => ValueType::Bytes,
            Self::Str(_) => ValueType::Str,
            Self::Int(_) => ValueType::Int,
            Self::Structured(_) => ValueType::Structured,
        }
    }

    /// Consumes the value, returning its bytes. Fails if the value isn't currently [`ValueType::Bytes`].
    pub fn into_bytes(self) -> Result<Vec<u8>, crate::codecs::Error> {
        match self {
            Self::Bytes(b) => Ok(b),
            other => Err(crate::codecs::Error::UnexpectedType {
                expected: ValueType::Bytes,
                found: other.value_type(),
            }),
        }
    }

    /// Consumes the value, returning its string. Fails if the value isn't currently [`ValueType::Str`].
    pub fn into_str(self) -> Result<String, crate::codecs::Error> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(crate::codecs::Error::UnexpectedType {
                expected: ValueType::Str,
                found: other.value_type(),
            }),
        }
    }

    /// Consumes the value, returning the structured `serde_json::Value`.
    pub fn into_structured(self) -> Result<serde_json::Value, crate::codecs::Error> {
        match self {
            Self::Structured(v) => Ok(v),
            other => Err(crate::codecs::Error::UnexpectedType {
                expected: ValueType::Structured,
                found: other.value_type(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_matches_variant() {
        assert_eq!(DynValue::Bytes(vec![]).value_type(), ValueType::Bytes);
        assert_eq!(DynValue::Str(String::new()).value_type(), ValueType::Str);
        assert_eq!(DynValue::Int(0).value_type(), ValueType::Int);
        assert_eq!(DynValue::Structured(serde_json::Value::Null).value_type(), ValueType::Structured);
    }

    #[test]
    fn wrong_accessor_reports_both_types() {
        let err = DynValue::Int(1).into_bytes().unwrap_err();
        match err {
            crate::codecs::Error::UnexpectedType { expected, found } => {
                assert_eq!(expected, ValueType::Bytes);
                assert_eq!(found, ValueType::Int);
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
