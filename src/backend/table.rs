use crate::backend::{Error, Key, NativeType};
use crate::ProgressReporter;

/// A single table within a [`crate::backend::StorageBackend`]: a key → value mapping plus the
/// bulk in-place rewrite primitive used for dictionary recompression.
pub trait Table {
    /// Whether this table has already been created in the backing store.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn exists(&mut self) -> Result<bool, Error>;

    /// Creates this table with the given key and value physical types.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] if this backend can't natively store `key_type`.
    fn create(&mut self, key_type: NativeType, value_type: NativeType) -> Result<(), Error>;

    /// Number of rows currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn len(&mut self) -> Result<u64, Error>;

    /// Whether the table is empty.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn is_empty(&mut self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// Reads the raw value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn get(&mut self, key: &Key) -> Result<Option<Vec<u8>>, Error>;

    /// Writes `value` under `key`, overwriting any existing row.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn put(&mut self, key: &Key, value: &[u8]) -> Result<(), Error>;

    /// Removes the row under `key`. Returns whether a row was actually removed.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn delete(&mut self, key: &Key) -> Result<bool, Error>;

    /// Drops the table entirely.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn drop_table(&mut self) -> Result<(), Error>;

    /// The physical key type this table was created with.
    fn key_type(&self) -> NativeType;

    /// Lazily iterates over every key currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn keys(&mut self) -> Result<Box<dyn Iterator<Item = Result<Key, Error>> + '_>, Error>;

    /// Lazily iterates over every value currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn values(&mut self) -> Result<Box<dyn Iterator<Item = Result<Vec<u8>, Error>> + '_>, Error>;

    /// Lazily iterates over every `(key, value)` pair currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn items(&mut self) -> Result<Box<dyn Iterator<Item = Result<(Key, Vec<u8>), Error>> + '_>, Error>;

    /// Rewrites every value in place via the function previously registered under
    /// `function_name` (see [`crate::backend::StorageBackend::create_function`]), reporting
    /// progress per row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFunction`] if no function is registered under that name, or an
    /// error on I/O failure or if the function itself fails.
    fn apply_to_values(
        &mut self,
        function_name: &str,
        progress: &mut dyn ProgressReporter,
    ) -> Result<(), Error>;
}
