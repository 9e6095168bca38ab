use crate::codecs::{Codec, DynValue, Error, ValueType};

/// Converts directly between raw bytes and a structured value, using CBOR as the wire format.
/// Like `msgpack`, this is a blob-level codec.
pub struct CborCodec;

pub static CBOR: CborCodec = CborCodec;

impl Codec for CborCodec {
    fn id(&self) -> &'static str {
        "cbor"
    }

    fn source_type(&self) -> ValueType {
        ValueType::Bytes
    }

    fn target_type(&self) -> ValueType {
        ValueType::Structured
    }

    fn forward(&self, input: DynValue) -> Result<DynValue, Error> {
        Ok(DynValue::Structured(serde_cbor::from_slice(&input.into_bytes()?)?))
    }

    fn reverse(&self, input: DynValue) -> Result<DynValue, Error> {
        Ok(DynValue::Bytes(serde_cbor::to_vec(&input.into_structured()?)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_an_object() {
        let value = serde_json::json!({"n": 7, "s": "hi"});
        let reverse = CBOR.reverse(DynValue::Structured(value.clone())).unwrap();
        let forward = CBOR.forward(reverse).unwrap();
        assert_eq!(forward.into_structured().unwrap(), value);
    }
}
