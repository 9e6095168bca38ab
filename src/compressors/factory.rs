//! Compressor factories: build a [`crate::Compressor`] instance from a parameter map, and the
//! process-wide catalog that looks factories up by id.

use crate::compressors::{Compressor, Error};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Parameters passed to a [`CompressorFactory`] when building an instance.
#[derive(Clone, Debug, Default)]
pub struct CompressorOptions {
    /// A previously trained shared dictionary, if any. Ignored by compressors that don't support
    /// dictionaries.
    pub dictionary: Option<Vec<u8>>,
}

impl CompressorOptions {
    /// No options: build a fresh, dictionary-less compressor.
    #[must_use]
    pub const fn none() -> Self {
        Self { dictionary: None }
    }

    /// Build with the given dictionary.
    #[must_use]
    pub const fn with_dictionary(dictionary: Vec<u8>) -> Self {
        Self { dictionary: Some(dictionary) }
    }
}

/// A named factory that builds [`Compressor`] instances.
pub trait CompressorFactory: Send + Sync {
    /// The stable id this factory is registered under (and the id persisted in the cache's
    /// `compression` metadata entry).
    fn id(&self) -> &'static str;

    /// Builds a compressor instance from `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if `options.dictionary` is set but this compressor doesn't support
    /// dictionaries, or if the underlying library rejects the dictionary bytes.
    fn build(&self, options: &CompressorOptions) -> Result<Box<dyn Compressor>, Error>;
}

/// The process-wide compressor catalog.
pub struct Registry {
    factories: std::sync::RwLock<HashMap<&'static str, &'static dyn CompressorFactory>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self { factories: std::sync::RwLock::new(HashMap::new()) }
    }

    pub fn register(&self, factory: &'static dyn CompressorFactory) {
        self.factories.write().expect("compressor registry lock poisoned").insert(factory.id(), factory);
    }

    /// Looks a factory up by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCompressor`] if no factory is registered under `id`.
    pub fn get(&self, id: &str) -> Result<&'static dyn CompressorFactory, Error> {
        self.factories
            .read()
            .expect("compressor registry lock poisoned")
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownCompressor(id.to_owned()))
    }

    /// Resolves the `"best"` sentinel to an implementation-defined, highest-ratio factory among
    /// those compiled in. Preference order: zstd, brotli, bzip2, deflate, lz4, falling back to
    /// `none` if nothing else was compiled in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCompressor`] only if, somehow, even `none` isn't registered (never
    /// happens in practice; `none` is always registered).
    pub fn best(&self) -> Result<&'static dyn CompressorFactory, Error> {
        for id in ["zstd", "brotli", "bzip2", "deflate", "lz4", "none"] {
            if let Ok(factory) = self.get(id) {
                return Ok(factory);
            }
        }
        self.get("none")
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide default registry, pre-populated with the compressors enabled via Cargo
/// features.
pub fn global() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(|| {
        let registry = Registry::new();
        crate::compressors::impls::register_all(&registry);
        registry
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_always_registered() {
        assert_eq!(global().get("none").unwrap().id(), "none");
    }

    #[test]
    fn unknown_id_errors() {
        assert!(matches!(global().get("not-a-real-compressor"), Err(Error::UnknownCompressor(_))));
    }

    #[test]
    fn best_resolves_to_something_registered() {
        let best = global().best().unwrap();
        assert!(global().get(best.id()).is_ok());
    }
}
