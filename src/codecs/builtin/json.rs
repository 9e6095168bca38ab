use crate::codecs::{Codec, DynValue, Error, ValueType};

/// Converts between UTF-8 text and a structured value, using JSON as the wire format.
pub struct JsonCodec;

pub static JSON: JsonCodec = JsonCodec;

impl Codec for JsonCodec {
    fn id(&self) -> &'static str {
        "json"
    }

    fn source_type(&self) -> ValueType {
        ValueType::Str
    }

    fn target_type(&self) -> ValueType {
        ValueType::Structured
    }

    fn forward(&self, input: DynValue) -> Result<DynValue, Error> {
        Ok(DynValue::Structured(serde_json::from_str(&input.into_str()?)?))
    }

    fn reverse(&self, input: DynValue) -> Result<DynValue, Error> {
        Ok(DynValue::Str(serde_json::to_string(&input.into_structured()?)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_an_object() {
        let reverse = JSON.reverse(DynValue::Structured(serde_json::json!({"a": 1, "b": [true, null]}))).unwrap();
        let text = reverse.into_str().unwrap();

        let forward = JSON.forward(DynValue::Str(text)).unwrap();
        assert_eq!(forward.into_structured().unwrap(), serde_json::json!({"a": 1, "b": [true, null]}));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(JSON.forward(DynValue::Str("{not json".to_owned())).is_err());
    }
}
