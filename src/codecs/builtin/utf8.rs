use crate::codecs::{Codec, DynValue, Error, ValueType};

/// Converts between raw bytes and UTF-8 text.
pub struct Utf8Codec;

pub static UTF8: Utf8Codec = Utf8Codec;

impl Codec for Utf8Codec {
    fn id(&self) -> &'static str {
        "utf8"
    }

    fn source_type(&self) -> ValueType {
        ValueType::Bytes
    }

    fn target_type(&self) -> ValueType {
        ValueType::Str
    }

    fn forward(&self, input: DynValue) -> Result<DynValue, Error> {
        Ok(DynValue::Str(String::from_utf8(input.into_bytes()?)?))
    }

    fn reverse(&self, input: DynValue) -> Result<DynValue, Error> {
        Ok(DynValue::Bytes(input.into_str()?.into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_valid_utf8() {
        let forward = UTF8.forward(DynValue::Bytes(b"hello".to_vec())).unwrap();
        assert_eq!(forward.into_str().unwrap(), "hello");

        let reverse = UTF8.reverse(DynValue::Str("hello".to_owned())).unwrap();
        assert_eq!(reverse.into_bytes().unwrap(), b"hello".to_vec());
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(UTF8.forward(DynValue::Bytes(vec![0xff, 0xfe])).is_err());
    }
}
