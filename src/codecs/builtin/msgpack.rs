use crate::codecs::{Codec, DynValue, Error, ValueType};

/// Converts directly between raw bytes and a structured value, using MessagePack as the wire
/// format. Unlike `json`, this is a blob-level codec: no `utf8` step is needed because MessagePack
/// is binary.
pub struct MsgPackCodec;

pub static MSGPACK: MsgPackCodec = MsgPackCodec;

impl Codec for MsgPackCodec {
    fn id(&self) -> &'static str {
        "msgpack"
    }

    fn source_type(&self) -> ValueType {
        ValueType::Bytes
    }

    fn target_type(&self) -> ValueType {
        ValueType::Structured
    }

    fn forward(&self, input: DynValue) -> Result<DynValue, Error> {
        Ok(DynValue::Structured(rmp_serde::from_slice(&input.into_bytes()?)?))
    }

    fn reverse(&self, input: DynValue) -> Result<DynValue, Error> {
        Ok(DynValue::Bytes(rmp_serde::to_vec(&input.into_structured()?)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_an_object() {
        let value = serde_json::json!({"n": 7, "s": "hi"});
        let reverse = MSGPACK.reverse(DynValue::Structured(value.clone())).unwrap();
        let forward = MSGPACK.forward(reverse).unwrap();
        assert_eq!(forward.into_structured().unwrap(), value);
    }
}
