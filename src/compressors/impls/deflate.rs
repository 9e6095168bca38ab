//! Raw DEFLATE compression via [flate2](https://crates.io/crates/flate2). No dictionary support.

use crate::compressors::{CompressorFactory, CompressorOptions, Error, Method};
use std::io::{Read, Write};

pub static FACTORY: DeflateFactory = DeflateFactory;

pub struct DeflateFactory;

impl CompressorFactory for DeflateFactory {
    fn id(&self) -> &'static str {
        "deflate"
    }

    fn build(&self, options: &CompressorOptions) -> Result<Box<dyn crate::compressors::Compressor>, Error> {
        if options.dictionary.is_some() {
            return Err(Error::DictionariesUnsupported(Method::Deflate.id()));
        }
        Ok(Box::new(Deflate))
    }
}

pub struct Deflate;

impl crate::compressors::Compressor for Deflate {
    fn method(&self) -> Method {
        Method::Deflate
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut encoder = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).map_err(|e| Error::Compress(Box::new(e)))?;
        encoder.finish().map_err(|e| Error::Compress(Box::new(e)))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut decoder = flate2::read::DeflateDecoder::new(data);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).map_err(|e| Error::Decompress(Box::new(e)))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressors::Compressor as _;

    #[test]
    fn roundtrips() {
        let c = Deflate;
        let data = b"some text to deflate and inflate again".to_vec();
        let compressed = c.compress(&data).unwrap();
        assert_eq!(c.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn rejects_dictionary() {
        let err = DeflateFactory.build(&CompressorOptions::with_dictionary(vec![1, 2, 3]));
        assert!(matches!(err, Err(Error::DictionariesUnsupported(_))));
    }
}
