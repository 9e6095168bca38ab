use crate::backend::{self, Key as BackendKey, Logical, NativeType, StorageBackend};
use crate::cache::{metadata, CacheValue, Error, KeyType};
use crate::codecs::{DynValue, TransformerStack};
use crate::compressors::{Compressor, CompressorOptions};
use crate::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const RECOMPRESS_FN: &str = "recompress";

/// Where and how to open a cache's backend.
pub enum Base {
    /// A path on disk. The backend is chosen by extension: `.sqlite` for the relational backend,
    /// `.mdb` for the memory-mapped one.
    Path(PathBuf),
    /// An already-constructed backend handle.
    Backend(Box<dyn StorageBackend>),
}

impl From<PathBuf> for Base {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Base {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Box<dyn StorageBackend>> for Base {
    fn from(backend: Box<dyn StorageBackend>) -> Self {
        Self::Backend(backend)
    }
}

fn backend_for_path(path: &Path) -> Result<Box<dyn StorageBackend>, Error> {
    match path.extension().and_then(std::ffi::OsStr::to_str) {
        #[cfg(feature = "backend-sqlite")]
        Some("sqlite") => Ok(Box::new(crate::backend::sqlite::SqliteBackend::new(path))),
        #[cfg(feature = "backend-redb")]
        Some("mdb") => Ok(Box::new(crate::backend::mmap::RedbBackend::new(path))),
        other => Err(Error::BadBase(format!("unrecognised extension: {other:?}"))),
    }
}

/// Which compressor a cache should use.
#[derive(Clone, Debug, Default)]
pub enum CompressorSelector {
    /// No compression.
    #[default]
    None,
    /// A specific factory, looked up by id.
    Id(String),
    /// The implementation-defined highest-ratio compressor compiled in.
    Best,
}

/// Construction options for [`Cache::open`].
pub struct CacheOptions {
    pub compressor: CompressorSelector,
    pub commit_every_n_ops: u32,
    pub key_type: Option<KeyType>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self { compressor: CompressorSelector::default(), commit_every_n_ops: 1, key_type: None }
    }
}

/// An embedded, persistent key/value cache for blobs.
///
/// Owns a [`StorageBackend`], a value [`TransformerStack`], a [`Compressor`], commit accounting,
/// and cache-level metadata. See the crate documentation for the full contract.
pub struct Cache<V: CacheValue> {
    backend: Box<dyn StorageBackend>,
    codec_stack: &'static TransformerStack,
    key_type: KeyType,
    compressor: Arc<dyn Compressor>,
    compressor_id: String,
    ops_pending: u32,
    commit_every_n_ops: u32,
    _marker: std::marker::PhantomData<V>,
}

impl<V: CacheValue> Cache<V> {
    /// Opens (creating if necessary) a cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadBase`] if `base` doesn't resolve to a concrete backend,
    /// [`Error::IncompatibleCodecs`] or [`Error::IncompatibleKeyType`] if reopening an existing
    /// cache whose persisted metadata disagrees with this call's declared stack/key type, or any
    /// backend/compressor error encountered along the way.
    #[tracing::instrument(level = "debug", skip(base, options))]
    pub fn open(base: impl Into<Base>, options: CacheOptions) -> Result<Self, Error> {
        let mut backend = match base.into() {
            Base::Path(path) => backend_for_path(&path)?,
            Base::Backend(backend) => backend,
        };
        backend.open()?;

        let codec_stack = V::flavor();
        let declared_key_type = options.key_type.unwrap_or(KeyType::Native(NativeType::Str));

        let (compressor, compressor_id, key_type) = if metadata::exists(backend.as_mut())? {
            Self::attach(backend.as_mut(), codec_stack, declared_key_type, &options.compressor)?
        } else {
            Self::initialize(backend.as_mut(), codec_stack, declared_key_type, &options.compressor)?
        };

        let mut cache = Self {
            backend,
            codec_stack,
            key_type,
            compressor,
            compressor_id,
            ops_pending: 0,
            commit_every_n_ops: options.commit_every_n_ops.max(1),
            _marker: std::marker::PhantomData,
        };
        cache.register_recompress()?;
        Ok(cache)
    }

    fn initialize(
        backend: &mut dyn StorageBackend,
        codec_stack: &'static TransformerStack,
        key_type: KeyType,
        selector: &CompressorSelector,
    ) -> Result<(Arc<dyn Compressor>, String, KeyType), Error> {
        tracing::debug!("initializing new cache metadata");
        let factory = resolve_factory(selector)?;
        let compressor: Arc<dyn Compressor> = Arc::from(factory.build(&CompressorOptions::none())?);

        backend.table(Logical::Metadata)?.create(NativeType::Str, NativeType::Bytes)?;
        metadata::write_compression(backend, factory.id())?;
        metadata::write_serializers(backend, &codec_stack.id())?;
        metadata::write_key_type(backend, key_type)?;

        let physical_key_type = match key_type {
            KeyType::Native(native) => native,
            KeyType::Any => NativeType::Bytes,
        };
        backend.table(Logical::Data)?.create(physical_key_type, NativeType::Bytes)?;
        backend.commit()?;

        Ok((compressor, factory.id().to_owned(), key_type))
    }

    fn attach(
        backend: &mut dyn StorageBackend,
        codec_stack: &'static TransformerStack,
        declared_key_type: KeyType,
        selector: &CompressorSelector,
    ) -> Result<(Arc<dyn Compressor>, String, KeyType), Error> {
        tracing::debug!("attaching to existing cache metadata");
        let persisted_ids = metadata::serializers(backend)?.unwrap_or_default();
        if persisted_ids != codec_stack.id() {
            return Err(Error::IncompatibleCodecs { persisted: persisted_ids, declared: codec_stack.id().iter().map(|s| (*s).to_owned()).collect() });
        }

        let stored_key_type = metadata::key_type(backend)?.unwrap_or(KeyType::Native(NativeType::Str));
        if !declared_key_type.compatible_with_stored(stored_key_type) {
            return Err(Error::IncompatibleKeyType { persisted: stored_key_type.id(), declared: declared_key_type.id() });
        }

        // The compressor in use is whatever the file was written with; `selector` only matters on
        // the initialization path, where there's no persisted choice yet.
        let _ = selector;
        let compressor_id = metadata::compression(backend)?.unwrap_or_else(|| "none".to_owned());
        let factory = crate::compressors::global().get(&compressor_id)?;

        // A present-but-empty dictionary is treated as no dictionary at all.
        let dict = metadata::dict(backend)?;
        let options = match dict {
            Some(dict) if !dict.is_empty() => CompressorOptions::with_dictionary(dict),
            _ => CompressorOptions::none(),
        };
        let compressor: Arc<dyn Compressor> = Arc::from(factory.build(&options)?);

        Ok((compressor, compressor_id, stored_key_type))
    }

    fn register_recompress(&mut self) -> Result<(), Error> {
        self.backend.clear_function(RECOMPRESS_FN)?;
        Ok(())
    }

    /// Looks up `key`, decompressing and decoding its value if present.
    ///
    /// # Errors
    ///
    /// Returns an error on backend, decompression, or decode failure.
    pub fn get(&mut self, key: &BackendKey) -> Result<Option<V>, Error> {
        let physical = self.encode_key(key)?;
        let Some(raw) = self.backend.table(Logical::Data)?.get(&physical)? else { return Ok(None) };
        Ok(Some(self.decode_value(&raw)?))
    }

    /// Stores `value` under `key`, or deletes `key` if `value` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error on backend, compression, or encode failure.
    pub fn put(&mut self, key: &BackendKey, value: Option<V>) -> Result<(), Error> {
        match value {
            None => {
                self.delete(key)?;
            }
            Some(value) => {
                let physical = self.encode_key(key)?;
                let bytes = self.encode_value(value)?;
                self.backend.table(Logical::Data)?.put(&physical, &bytes)?;
                self.count_op()?;
            }
        }
        Ok(())
    }

    /// Removes `key`. Idempotent; counts as an op even if `key` was absent.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn delete(&mut self, key: &BackendKey) -> Result<bool, Error> {
        let physical = self.encode_key(key)?;
        let removed = self.backend.table(Logical::Data)?.delete(&physical)?;
        self.count_op()?;
        Ok(removed)
    }

    /// Equivalent to `get(key).is_some()`.
    ///
    /// A stored but empty value reads as present here — `get` returning `Some` is the only
    /// signal consulted, since an empty byte string is a legitimate encoded value for several
    /// flavors.
    ///
    /// # Errors
    ///
    /// Returns an error on backend, decompression, or decode failure.
    pub fn contains(&mut self, key: &BackendKey) -> Result<bool, Error> {
        let physical = self.encode_key(key)?;
        Ok(self.backend.table(Logical::Data)?.get(&physical)?.is_some())
    }

    /// Number of rows in the data table.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn len(&mut self) -> Result<u64, Error> {
        Ok(self.backend.table(Logical::Data)?.len()?)
    }

    /// Whether the cache currently holds no entries.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn is_empty(&mut self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// Every currently-stored key, decoded back to its logical form.
    ///
    /// # Errors
    ///
    /// Returns an error on backend or decode failure.
    pub fn keys(&mut self) -> Result<Vec<BackendKey>, Error> {
        let key_type = self.key_type;
        let codec_stack = self.codec_stack;
        let physical_keys: Vec<BackendKey> =
            self.backend.table(Logical::Data)?.keys()?.collect::<Result<_, _>>()?;
        physical_keys.into_iter().map(|k| decode_key(k, key_type, codec_stack)).collect()
    }

    /// Every currently-stored value, decompressed and decoded.
    ///
    /// # Errors
    ///
    /// Returns an error on backend, decompression, or decode failure.
    pub fn values(&mut self) -> Result<Vec<V>, Error> {
        let raw: Vec<Vec<u8>> = self.backend.table(Logical::Data)?.values()?.collect::<Result<_, _>>()?;
        raw.into_iter().map(|bytes| self.decode_value(&bytes)).collect()
    }

    /// Every currently-stored `(key, value)` pair.
    ///
    /// # Errors
    ///
    /// Returns an error on backend, decompression, or decode failure.
    pub fn items(&mut self) -> Result<Vec<(BackendKey, V)>, Error> {
        let key_type = self.key_type;
        let codec_stack = self.codec_stack;
        let rows: Vec<(BackendKey, Vec<u8>)> =
            self.backend.table(Logical::Data)?.items()?.collect::<Result<_, _>>()?;
        rows.into_iter()
            .map(|(k, v)| Ok((decode_key(k, key_type, codec_stack)?, self.decode_value(&v)?)))
            .collect()
    }

    /// Bulk-assigns `(key, value)` pairs, reporting progress per pair.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; prior assignments in the batch remain applied.
    pub fn populate(
        &mut self,
        pairs: impl IntoIterator<Item = (BackendKey, V)>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<(), Error> {
        for (i, (key, value)) in pairs.into_iter().enumerate() {
            self.put(&key, Some(value))?;
            progress.report("populate", None, Some(1), None);
            let _ = i;
        }
        Ok(())
    }

    /// Flushes pending mutations, resetting the batch counter.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn commit(&mut self) -> Result<(), Error> {
        self.backend.commit()?;
        self.ops_pending = 0;
        Ok(())
    }

    /// Drops and recreates the data table, preserving metadata.
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure.
    pub fn empty(&mut self) -> Result<(), Error> {
        let physical_key_type = match self.key_type {
            KeyType::Native(native) => native,
            KeyType::Any => NativeType::Bytes,
        };
        {
            let table = self.backend.table(Logical::Data)?;
            table.drop_table()?;
            table.create(physical_key_type, NativeType::Bytes)?;
        }
        self.backend.commit()?;
        Ok(())
    }

    /// Retrains the shared dictionary from the current corpus and applies it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] if the active compressor doesn't support
    /// dictionaries, or any error encountered training or applying the new dictionary.
    pub fn optimize_compression(
        &mut self,
        dict_size: Option<usize>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<(), Error> {
        if !self.compressor.supports_dictionaries() {
            return Err(Error::UnsupportedOperation("compressor does not support dictionaries".to_owned()));
        }
        self.commit()?;

        let target_size = match dict_size {
            Some(size) => size,
            None => {
                let size = self.backend.data_size()?;
                match (size.total, size.wasted) {
                    (Some(total), Some(wasted)) => ((total.saturating_sub(wasted)) / 10).max(MIN_DICT_SIZE as u64) as usize,
                    _ => MIN_DICT_SIZE,
                }
            }
        };

        let raw_values: Vec<Vec<u8>> = self
            .backend
            .table(Logical::Data)?
            .values()?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|v| self.compressor.decompress(&v))
            .collect::<Result<_, _>>()?;

        let mut samples = raw_values.into_iter();
        let new_dict = self.compressor.train_dictionary(&mut samples, target_size)?;
        self.apply_compression_dictionary(new_dict, progress)
    }

    /// Applies `new_dict` as the cache's shared dictionary, recompressing every stored value.
    ///
    /// A no-op if `new_dict` already matches the persisted dictionary.
    ///
    /// # Errors
    ///
    /// Returns an error if recompression fails; on failure the on-disk state (values and
    /// metadata) is left unchanged.
    pub fn apply_compression_dictionary(
        &mut self,
        new_dict: Vec<u8>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<(), Error> {
        if metadata::dict(self.backend.as_mut())?.as_deref() == Some(new_dict.as_slice()) {
            return Ok(());
        }

        let factory = crate::compressors::global().get(&self.compressor_id)?;
        let new_compressor: Arc<dyn Compressor> =
            Arc::from(factory.build(&CompressorOptions::with_dictionary(new_dict.clone()))?);
        let old_compressor = Arc::clone(&self.compressor);

        self.backend.begin_transaction()?;
        let old = Arc::clone(&old_compressor);
        let new = Arc::clone(&new_compressor);
        self.backend.create_function(
            RECOMPRESS_FN,
            Arc::new(move |bytes: &[u8]| -> Result<Vec<u8>, backend::Error> {
                let plain = old.decompress(bytes).map_err(|e| backend::Error::FunctionFailed(Box::new(e)))?;
                new.compress(&plain).map_err(|e| backend::Error::FunctionFailed(Box::new(e)))
            }),
        )?;

        let result = self.backend.table(Logical::Data)?.apply_to_values(RECOMPRESS_FN, progress);
        self.backend.clear_function(RECOMPRESS_FN)?;

        match result {
            Ok(()) => {
                self.compressor = new_compressor;
                metadata::write_dict(self.backend.as_mut(), &new_dict)?;
                self.backend.commit()?;
                Ok(())
            }
            Err(e) => {
                if let Err(abort_err) = self.backend.abort() {
                    tracing::warn!(error = %abort_err, "failed to abort dictionary-swap transaction");
                }
                Err(e.into())
            }
        }
    }

    /// Opens a fresh cache at `target_path` with `compressor`, copies every entry from this one
    /// into it, vacuums it, and returns the new cache. Not production-grade: a bench/migration
    /// helper, not a safe in-place rewrite.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cache can't be opened, populated, or vacuumed.
    pub fn recompress(
        &mut self,
        target_path: impl AsRef<Path>,
        compressor: CompressorSelector,
        progress: &mut dyn ProgressReporter,
    ) -> Result<Self, Error> {
        let items = self.items()?;
        let options = CacheOptions { compressor, commit_every_n_ops: self.commit_every_n_ops, key_type: Some(self.key_type) };
        let mut target = Self::open(Base::Path(target_path.as_ref().to_path_buf()), options)?;
        target.populate(items, progress)?;
        target.backend.vacuum()?;
        Ok(target)
    }

    /// Flushes and releases the backend. Best-effort: failures here are logged rather than
    /// propagated, so a `close` during unwind never shadows the original error.
    pub fn close(mut self) {
        if let Err(e) = self.backend.close() {
            tracing::warn!(error = %e, "error closing cache backend");
        }
    }

    fn count_op(&mut self) -> Result<(), Error> {
        self.ops_pending += 1;
        if self.ops_pending >= self.commit_every_n_ops {
            self.commit()?;
        }
        Ok(())
    }

    fn encode_key(&self, key: &BackendKey) -> Result<BackendKey, Error> {
        match self.key_type {
            KeyType::Native(native) => {
                if key.native_type() != native {
                    return Err(Error::IncompatibleKeyType { persisted: native.id().to_owned(), declared: key.native_type().id().to_owned() });
                }
                Ok(key.clone())
            }
            KeyType::Any => {
                let dyn_value = key_to_dynvalue(key.clone());
                let encoded = self.codec_stack.reverse(dyn_value)?;
                Ok(BackendKey::Bytes(encoded.into_bytes()?))
            }
        }
    }

    fn encode_value(&self, value: V) -> Result<Vec<u8>, Error> {
        let dyn_value = value.into_dyn()?;
        let encoded = self.codec_stack.reverse(dyn_value)?;
        let bytes = encoded.into_bytes()?;
        Ok(self.compressor.compress(&bytes)?)
    }

    fn decode_value(&self, bytes: &[u8]) -> Result<V, Error> {
        let raw = self.compressor.decompress(bytes)?;
        let dyn_value = self.codec_stack.forward(DynValue::Bytes(raw))?;
        Ok(V::from_dyn(dyn_value)?)
    }
}

const MIN_DICT_SIZE: usize = 1024;

fn key_to_dynvalue(key: BackendKey) -> DynValue {
    match key {
        BackendKey::Int(i) => DynValue::Int(i),
        BackendKey::Str(s) => DynValue::Str(s),
        BackendKey::Bytes(b) => DynValue::Bytes(b),
    }
}

fn decode_key(physical: BackendKey, key_type: KeyType, codec_stack: &TransformerStack) -> Result<BackendKey, Error> {
    match key_type {
        KeyType::Native(_) => Ok(physical),
        KeyType::Any => {
            let BackendKey::Bytes(bytes) = physical else {
                return Ok(physical);
            };
            let decoded = codec_stack.forward(DynValue::Bytes(bytes))?;
            Ok(match decoded {
                DynValue::Bytes(b) => BackendKey::Bytes(b),
                DynValue::Str(s) => BackendKey::Str(s),
                DynValue::Int(i) => BackendKey::Int(i),
                DynValue::Structured(v) => BackendKey::Bytes(serde_json::to_vec(&v).unwrap_or_default()),
            })
        }
    }
}

fn resolve_factory(selector: &CompressorSelector) -> Result<&'static dyn crate::compressors::CompressorFactory, Error> {
    Ok(match selector {
        CompressorSelector::None => crate::compressors::global().get("none")?,
        CompressorSelector::Id(id) => crate::compressors::global().get(id)?,
        CompressorSelector::Best => crate::compressors::global().best()?,
    })
}

impl<V: CacheValue> Drop for Cache<V> {
    fn drop(&mut self) {
        if let Err(e) = self.backend.commit() {
            tracing::warn!(error = %e, "error flushing cache on drop");
        }
    }
}
