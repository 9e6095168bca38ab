//! Brotli compression via [the `brotli` crate](https://crates.io/crates/brotli). No dictionary
//! support.

use crate::compressors::{CompressorFactory, CompressorOptions, Error, Method};
use std::io::Cursor;

const QUALITY: i32 = 9;

pub static FACTORY: BrotliFactory = BrotliFactory;

pub struct BrotliFactory;

impl CompressorFactory for BrotliFactory {
    fn id(&self) -> &'static str {
        "brotli"
    }

    fn build(&self, options: &CompressorOptions) -> Result<Box<dyn crate::compressors::Compressor>, Error> {
        if options.dictionary.is_some() {
            return Err(Error::DictionariesUnsupported(Method::Brotli.id()));
        }
        Ok(Box::new(Brotli))
    }
}

pub struct Brotli;

impl crate::compressors::Compressor for Brotli {
    fn method(&self) -> Method {
        Method::Brotli
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(data.len());
        let params = brotli::enc::BrotliEncoderParams { quality: QUALITY, size_hint: data.len(), ..Default::default() };
        brotli::BrotliCompress(&mut Cursor::new(data), &mut Cursor::new(&mut out), &params)
            .map_err(|e| Error::Compress(Box::new(e)))?;
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(data.len() * 4);
        brotli::BrotliDecompress(&mut Cursor::new(data), &mut Cursor::new(&mut out))
            .map_err(|e| Error::Decompress(Box::new(e)))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressors::Compressor as _;

    #[test]
    fn roundtrips() {
        let c = Brotli;
        let data = b"brotli handles web text and assets well".repeat(4);
        let compressed = c.compress(&data).unwrap();
        assert_eq!(c.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn rejects_dictionary() {
        let err = BrotliFactory.build(&CompressorOptions::with_dictionary(vec![1, 2, 3]));
        assert!(matches!(err, Err(Error::DictionariesUnsupported(_))));
    }
}
