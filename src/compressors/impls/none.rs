use crate::compressors::{CompressorFactory, CompressorOptions, Error, Method};

/// The sentinel "no compression" compressor: a pass-through. Always registered, regardless of
/// which `compress-*` features are enabled, since `compression` absent from metadata means "none"
/// and the cache still needs a concrete instance to call through.
pub struct NoneCompressor;

pub static FACTORY: NoneFactory = NoneFactory;

pub struct NoneFactory;

impl CompressorFactory for NoneFactory {
    fn id(&self) -> &'static str {
        "none"
    }

    fn build(&self, _options: &CompressorOptions) -> Result<Box<dyn crate::compressors::Compressor>, Error> {
        Ok(Box::new(NoneCompressor))
    }
}

impl crate::compressors::Compressor for NoneCompressor {
    fn method(&self) -> Method {
        Method::None
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressors::Compressor as _;

    #[test]
    fn passes_data_through_unchanged() {
        let c = NoneCompressor;
        let data = b"some bytes, not actually compressed".to_vec();
        assert_eq!(c.compress(&data).unwrap(), data);
        assert_eq!(c.decompress(&data).unwrap(), data);
    }

    #[test]
    fn registered_under_none() {
        assert_eq!(FACTORY.id(), "none");
        let built = FACTORY.build(&CompressorOptions::none()).unwrap();
        assert_eq!(built.method(), Method::None);
        assert!(!built.supports_dictionaries());
    }
}
