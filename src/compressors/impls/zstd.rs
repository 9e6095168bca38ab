//! Zstandard compression using [Alexandre Bury](https://github.com/gyscos)'s
//! [zstd](https://crates.io/crates/zstd) crate. Supports shared dictionaries and dictionary
//! training.

use crate::compressors::{CompressorFactory, CompressorOptions, Error, Method};

const MAX_CAPACITY: usize = u32::MAX as usize;
const LEVEL: i32 = 3;

pub static FACTORY: ZstdFactory = ZstdFactory;

pub struct ZstdFactory;

impl CompressorFactory for ZstdFactory {
    fn id(&self) -> &'static str {
        "zstd"
    }

    fn build(&self, options: &CompressorOptions) -> Result<Box<dyn crate::compressors::Compressor>, Error> {
        Ok(Box::new(Zstd { dictionary: options.dictionary.clone() }))
    }
}

pub struct Zstd {
    dictionary: Option<Vec<u8>>,
}

impl crate::compressors::Compressor for Zstd {
    fn method(&self) -> Method {
        Method::Zstd
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        if let Some(dictionary) = &self.dictionary {
            let mut compressor = zstd::bulk::Compressor::with_dictionary(LEVEL, dictionary)
                .map_err(|e| Error::Compress(Box::new(e)))?;
            compressor.compress(data).map_err(|e| Error::Compress(Box::new(e)))
        } else {
            zstd::bulk::compress(data, LEVEL).map_err(|e| Error::Compress(Box::new(e)))
        }
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        if let Some(dictionary) = &self.dictionary {
            let mut decompressor = zstd::bulk::Decompressor::with_dictionary(dictionary)
                .map_err(|e| Error::Decompress(Box::new(e)))?;
            decompressor
                .decompress(data, MAX_CAPACITY)
                .map_err(|e| Error::Decompress(Box::new(e)))
        } else {
            zstd::bulk::decompress(data, MAX_CAPACITY).map_err(|e| Error::Decompress(Box::new(e)))
        }
    }

    fn supports_dictionaries(&self) -> bool {
        cfg!(feature = "compress-dictionaries")
    }

    fn train_dictionary(
        &self,
        samples: &mut dyn Iterator<Item = Vec<u8>>,
        target_size: usize,
    ) -> Result<Vec<u8>, Error> {
        #[cfg(feature = "compress-dictionaries")]
        {
            let samples: Vec<Vec<u8>> = samples.collect();
            zstd::dict::from_samples(&samples, target_size).map_err(|e| Error::Train(Box::new(e)))
        }
        #[cfg(not(feature = "compress-dictionaries"))]
        {
            let _ = (samples, target_size);
            Err(Error::DictionariesUnsupported(self.method().id()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressors::Compressor as _;

    #[test]
    fn roundtrips_without_dictionary() {
        let c = Zstd { dictionary: None };
        let data = b"the quick brown fox jumps over the lazy dog".repeat(8);
        let compressed = c.compress(&data).unwrap();
        assert_eq!(c.decompress(&compressed).unwrap(), data);
    }

    #[cfg(feature = "compress-dictionaries")]
    #[test]
    fn roundtrips_with_dictionary() {
        let samples: Vec<Vec<u8>> = (0..20).map(|i| format!("sample payload number {i}").into_bytes()).collect();
        let dict = zstd::dict::from_samples(&samples, 256).unwrap();

        let c = Zstd { dictionary: Some(dict.clone()) };
        let data = b"sample payload number 999".to_vec();
        let compressed = c.compress(&data).unwrap();
        assert_eq!(c.decompress(&compressed).unwrap(), data);

        // A differently-dictionaried instance must not be able to read it back.
        let other = Zstd { dictionary: None };
        assert!(other.decompress(&compressed).is_err());
    }
}
