//! Storage backends: the physical layer underneath a [`crate::Cache`]. A backend owns an engine
//! handle, exposes named tables (`data`, `metadata`), and runs transactions.

mod error;
mod key;
mod table;
mod types;

pub use error::Error;
pub use key::Key;
pub use table::Table;
pub use types::{DataSize, NativeType};

#[cfg(feature = "backend-sqlite")]
pub mod sqlite;

#[cfg(feature = "backend-redb")]
pub mod mmap;

/// Which logical table a `data`/`metadata` reference resolves to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Logical {
    Data,
    Metadata,
}

/// A named-key-value store supporting multiple tables, transactions, and in-database bulk
/// transforms.
///
/// Implementors own their engine handle exclusively; `open`/`close` bracket a scope in which the
/// handle is guaranteed to exist, with `close` guaranteeing a final commit on every exit path.
pub trait StorageBackend {
    /// Opens (or creates) the backing file and acquires the engine handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying engine fails to open.
    fn open(&mut self) -> Result<(), Error>;

    /// Commits any pending mutations and releases the engine handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the final commit fails.
    fn close(&mut self) -> Result<(), Error>;

    /// Flushes pending mutations durably.
    ///
    /// # Errors
    ///
    /// Returns an error on commit failure.
    fn commit(&mut self) -> Result<(), Error>;

    /// Opens an explicit transaction; subsequent mutations until the next `commit` form one
    /// atomic group.
    ///
    /// # Errors
    ///
    /// Returns an error if a transaction could not be started.
    fn begin_transaction(&mut self) -> Result<(), Error>;

    /// Discards every mutation made since the last successful `commit`, leaving on-disk state as
    /// it was at that point, then opens a fresh transaction so the backend remains usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback itself fails.
    fn abort(&mut self) -> Result<(), Error>;

    /// Storage-maintenance hook: reclaims space. May be a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn vacuum(&mut self) -> Result<(), Error>;

    /// Storage-maintenance hook: refreshes engine-internal statistics. May be a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn optimize(&mut self) -> Result<(), Error>;

    /// Registers an in-database single-argument function, callable by name from
    /// [`Table::apply_to_values`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend can't register a function under this name.
    fn create_function(
        &mut self,
        name: &str,
        f: std::sync::Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, Error> + Send + Sync>,
    ) -> Result<(), Error>;

    /// Drops a previously-registered in-database function. A no-op if none is registered.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn clear_function(&mut self, name: &str) -> Result<(), Error>;

    /// Borrows the `data` or `metadata` table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table hasn't been created yet and couldn't be looked up.
    fn table(&mut self, which: Logical) -> Result<&mut dyn Table, Error>;

    /// Reports page-level size accounting, used to auto-size a trained dictionary.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    fn data_size(&mut self) -> Result<DataSize, Error>;

    /// Physical source types this backend can store without a codec prefix.
    fn native_value_types(&self) -> &'static [NativeType];

    /// Physical key types this backend can store without a codec prefix.
    fn native_key_types(&self) -> &'static [NativeType];
}
