//! LZ4 block compression using [PSeitz](https://github.com/PSeitz)'s
//! [lz4_flex](https://crates.io/crates/lz4_flex) crate. Supports shared dictionaries.

use crate::compressors::{CompressorFactory, CompressorOptions, Error, Method};

pub static FACTORY: Lz4Factory = Lz4Factory;

pub struct Lz4Factory;

impl CompressorFactory for Lz4Factory {
    fn id(&self) -> &'static str {
        "lz4"
    }

    fn build(&self, options: &CompressorOptions) -> Result<Box<dyn crate::compressors::Compressor>, Error> {
        Ok(Box::new(Lz4 { dictionary: options.dictionary.clone() }))
    }
}

pub struct Lz4 {
    dictionary: Option<Vec<u8>>,
}

impl crate::compressors::Compressor for Lz4 {
    fn method(&self) -> Method {
        Method::Lz4
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        match &self.dictionary {
            Some(dictionary) => Ok(lz4_flex::block::compress_prepend_size_with_dict(data, dictionary)),
            None => Ok(lz4_flex::block::compress_prepend_size(data)),
        }
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        match &self.dictionary {
            Some(dictionary) => lz4_flex::block::decompress_size_prepended_with_dict(data, dictionary)
                .map_err(|e| Error::Decompress(Box::new(e))),
            None => lz4_flex::block::decompress_size_prepended(data).map_err(|e| Error::Decompress(Box::new(e))),
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
        #[cfg(all(feature = "compress-dictionaries", feature = "compress-zstd"))]
        {
            // lz4_flex has no trainer of its own; borrow zstd's, which produces a generic
            // byte-string dictionary usable as a raw prefix for lz4's own dictionary mode.
            zstd::dict::from_samples(&samples.collect::<Vec<_>>(), target_size).map_err(|e| Error::Train(Box::new(e)))
        }
        #[cfg(not(all(feature = "compress-dictionaries", feature = "compress-zstd")))]
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
        let c = Lz4 { dictionary: None };
        let data = b"repeated repeated repeated repeated data".to_vec();
        let compressed = c.compress(&data).unwrap();
        assert_eq!(c.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn roundtrips_with_dictionary() {
        let dict = b"a shared dictionary prefix used across many small values".to_vec();
        let c = Lz4 { dictionary: Some(dict) };
        let data = b"a short value".to_vec();
        let compressed = c.compress(&data).unwrap();
        assert_eq!(c.decompress(&compressed).unwrap(), data);
    }
}
