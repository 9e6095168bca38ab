//! Bzip2 compression via [the `bzip2` crate](https://crates.io/crates/bzip2). No dictionary
//! support.

use crate::compressors::{CompressorFactory, CompressorOptions, Error, Method};
use std::io::{Read, Write};

const LEVEL: u32 = 6;

pub static FACTORY: Bzip2Factory = Bzip2Factory;

pub struct Bzip2Factory;

impl CompressorFactory for Bzip2Factory {
    fn id(&self) -> &'static str {
        "bzip2"
    }

    fn build(&self, options: &CompressorOptions) -> Result<Box<dyn crate::compressors::Compressor>, Error> {
        if options.dictionary.is_some() {
            return Err(Error::DictionariesUnsupported(Method::Bzip2.id()));
        }
        Ok(Box::new(Bzip2))
    }
}

pub struct Bzip2;

impl crate::compressors::Compressor for Bzip2 {
    fn method(&self) -> Method {
        Method::Bzip2
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut encoder = bzip2::write::BzEncoder::new(Vec::with_capacity(data.len()), bzip2::Compression::new(LEVEL));
        encoder.write_all(data).map_err(|e| Error::Compress(Box::new(e)))?;
        encoder.finish().map_err(|e| Error::Compress(Box::new(e)))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut decoder = bzip2::read::BzDecoder::new(data);
        let mut out = Vec::with_capacity(data.len() * 4);
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
        let c = Bzip2;
        let data = b"block-sorting compression over some repeated text".repeat(4);
        let compressed = c.compress(&data).unwrap();
        assert_eq!(c.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn rejects_dictionary() {
        let err = Bzip2Factory.build(&CompressorOptions::with_dictionary(vec![1, 2, 3]));
        assert!(matches!(err, Err(Error::DictionariesUnsupported(_))));
    }
}
