/// An error raised by a storage backend.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The SQLite backend reported an error.
    #[cfg(feature = "backend-sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// The memory-mapped backend reported an error.
    #[cfg(feature = "backend-redb")]
    #[error(transparent)]
    Redb(#[from] redb::Error),

    #[cfg(feature = "backend-redb")]
    #[error(transparent)]
    RedbTransaction(#[from] redb::TransactionError),

    #[cfg(feature = "backend-redb")]
    #[error(transparent)]
    RedbTable(#[from] redb::TableError),

    #[cfg(feature = "backend-redb")]
    #[error(transparent)]
    RedbStorage(#[from] redb::StorageError),

    #[cfg(feature = "backend-redb")]
    #[error(transparent)]
    RedbCommit(#[from] redb::CommitError),

    #[cfg(feature = "backend-redb")]
    #[error(transparent)]
    RedbDatabase(#[from] redb::DatabaseError),

    #[cfg(feature = "backend-redb")]
    #[error(transparent)]
    RedbCompaction(#[from] redb::CompactionError),

    /// Filesystem I/O failure opening or manipulating the backing file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A key or value physical type outside what this backend natively supports.
    #[error("backend does not support physical type `{0}`")]
    UnsupportedType(&'static str),

    /// The requested logical table has no mapped physical name.
    #[error("no such logical table: `{0}`")]
    UnknownTable(String),

    /// A bulk transform was requested under a function name no `create_function` call registered.
    #[error("no such registered function: `{0}`")]
    UnknownFunction(String),

    /// A registered in-database function itself failed (for example, a `recompress` callback
    /// hitting a decompression error).
    #[error("registered function failed")]
    FunctionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}
