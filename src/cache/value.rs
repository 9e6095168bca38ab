use crate::cache::Error;
use crate::codecs::{builtin, DynValue, TransformerStack};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A type a [`crate::Cache`] can store: knows which [`TransformerStack`] flavor it round-trips
/// through and how to move to/from the stack's type-erased currency.
pub trait CacheValue: Sized {
    /// The transformer-stack flavor this type round-trips through.
    fn flavor() -> &'static TransformerStack;

    /// Moves `self` into the stack's type-erased representation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn into_dyn(self) -> Result<DynValue, Error>;

    /// Recovers a value of this type from the stack's type-erased representation.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` isn't of the expected [`crate::codecs::ValueType`] or fails to
    /// deserialize into this type.
    fn from_dyn(value: DynValue) -> Result<Self, Error>;
}

impl CacheValue for Vec<u8> {
    fn flavor() -> &'static TransformerStack {
        builtin::blob_stack()
    }

    fn into_dyn(self) -> Result<DynValue, Error> {
        Ok(DynValue::Bytes(self))
    }

    fn from_dyn(value: DynValue) -> Result<Self, Error> {
        Ok(value.into_bytes()?)
    }
}

impl CacheValue for String {
    fn flavor() -> &'static TransformerStack {
        builtin::string_stack()
    }

    fn into_dyn(self) -> Result<DynValue, Error> {
        Ok(DynValue::Str(self))
    }

    fn from_dyn(value: DynValue) -> Result<Self, Error> {
        Ok(value.into_str()?)
    }
}

impl CacheValue for serde_json::Value {
    fn flavor() -> &'static TransformerStack {
        builtin::json_stack()
    }

    fn into_dyn(self) -> Result<DynValue, Error> {
        Ok(DynValue::Structured(self))
    }

    fn from_dyn(value: DynValue) -> Result<Self, Error> {
        Ok(value.into_structured()?)
    }
}

/// Wraps a serde type to be stored via the `json` flavor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize + DeserializeOwned> CacheValue for Json<T> {
    fn flavor() -> &'static TransformerStack {
        builtin::json_stack()
    }

    fn into_dyn(self) -> Result<DynValue, Error> {
        let value = serde_json::to_value(self.0).map_err(crate::codecs::Error::from)?;
        Ok(DynValue::Structured(value))
    }

    fn from_dyn(value: DynValue) -> Result<Self, Error> {
        let value = value.into_structured()?;
        let inner = serde_json::from_value(value).map_err(crate::codecs::Error::from)?;
        Ok(Self(inner))
    }
}

/// Wraps a serde type to be stored via the `msgpack` flavor.
#[cfg(feature = "codec-msgpack")]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MsgPack<T>(pub T);

#[cfg(feature = "codec-msgpack")]
impl<T: Serialize + DeserializeOwned> CacheValue for MsgPack<T> {
    fn flavor() -> &'static TransformerStack {
        builtin::msgpack_stack()
    }

    fn into_dyn(self) -> Result<DynValue, Error> {
        let value = serde_json::to_value(self.0).map_err(crate::codecs::Error::from)?;
        Ok(DynValue::Structured(value))
    }

    fn from_dyn(value: DynValue) -> Result<Self, Error> {
        let value = value.into_structured()?;
        let inner = serde_json::from_value(value).map_err(crate::codecs::Error::from)?;
        Ok(Self(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn json_wrapper_roundtrips_a_struct() {
        let original = Json(Point { x: 3, y: -4 });
        let dyn_value = original.clone().into_dyn().unwrap();
        let recovered = Json::<Point>::from_dyn(dyn_value).unwrap();
        assert_eq!(recovered.0, original.0);
    }

    #[test]
    fn bytes_roundtrip_through_blob_flavor() {
        let original = vec![1u8, 2, 3, 4];
        let dyn_value = original.clone().into_dyn().unwrap();
        assert_eq!(Vec::<u8>::from_dyn(dyn_value).unwrap(), original);
    }

    #[test]
    fn string_roundtrip_through_string_flavor() {
        let original = "a stored string".to_owned();
        let dyn_value = original.clone().into_dyn().unwrap();
        assert_eq!(String::from_dyn(dyn_value).unwrap(), original);
    }
}

/// Wraps a serde type to be stored via the `cbor` flavor.
#[cfg(feature = "codec-cbor")]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cbor<T>(pub T);

#[cfg(feature = "codec-cbor")]
impl<T: Serialize + DeserializeOwned> CacheValue for Cbor<T> {
    fn flavor() -> &'static TransformerStack {
        builtin::cbor_stack()
    }

    fn into_dyn(self) -> Result<DynValue, Error> {
        let value = serde_json::to_value(self.0).map_err(crate::codecs::Error::from)?;
        Ok(DynValue::Structured(value))
    }

    fn from_dyn(value: DynValue) -> Result<Self, Error> {
        let value = value.into_structured()?;
        let inner = serde_json::from_value(value).map_err(crate::codecs::Error::from)?;
        Ok(Self(inner))
    }
}
