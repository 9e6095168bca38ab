use crate::compressors::{Error, Method};

/// A compressor instance, built by a [`crate::compressors::CompressorFactory`] and possibly
/// parameterized by a shared dictionary.
///
/// A non-empty dictionary becomes part of the instance's state: bytes compressed with dictionary
/// `D` can only be decompressed by an instance built from that same `D`.
pub trait Compressor: Send + Sync {
    /// Which algorithm this instance implements.
    fn method(&self) -> Method;

    /// Reduces the size of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Compress`] on an underlying encoder failure.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Error>;

    /// Restores previously [`Self::compress`]ed bytes to their original form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decompress`] if `data` is corrupt, truncated, or was compressed with a
    /// different dictionary than this instance holds.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, Error>;

    /// Whether this compressor can be parameterized by a shared dictionary.
    fn supports_dictionaries(&self) -> bool {
        false
    }

    /// Derives a shared dictionary from a sample corpus, sized to approximately `target_size`
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DictionariesUnsupported`] if this compressor doesn't support dictionaries,
    /// or [`Error::Train`] if the underlying trainer fails (for example, too few or too small
    /// samples to produce a dictionary of the requested size).
    fn train_dictionary(
        &self,
        samples: &mut dyn Iterator<Item = Vec<u8>>,
        target_size: usize,
    ) -> Result<Vec<u8>, Error> {
        let _ = (samples, target_size);
        Err(Error::DictionariesUnsupported(self.method().id()))
    }
}
