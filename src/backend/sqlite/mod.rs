//! SQLite-backed storage, via [rusqlite](https://crates.io/crates/rusqlite). Tables are plain SQL
//! tables `(key PRIMARY KEY, val)`; bulk rewrites run as a single `REPLACE INTO ... SELECT`
//! driven by a registered scalar function.

mod table;

use crate::backend::{DataSize, Error, Logical, NativeType, StorageBackend, Table};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

pub use table::SqliteTable;

const NATIVE_VALUE_TYPES: [NativeType; 3] = [NativeType::Int, NativeType::Str, NativeType::Bytes];
const NATIVE_KEY_TYPES: [NativeType; 3] = [NativeType::Int, NativeType::Str, NativeType::Bytes];

/// A backend over a single SQLite file.
pub struct SqliteBackend {
    path: PathBuf,
    conn: Option<Rc<RefCell<rusqlite::Connection>>>,
    data: Option<SqliteTable>,
    metadata: Option<SqliteTable>,
    functions: HashMap<String, Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, Error> + Send + Sync>>,
}

impl SqliteBackend {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            conn: None,
            data: None,
            metadata: None,
            functions: HashMap::new(),
        }
    }

    fn conn(&self) -> Result<Rc<RefCell<rusqlite::Connection>>, Error> {
        self.conn.clone().ok_or_else(|| Error::UnknownTable("backend not open".to_owned()))
    }
}

impl StorageBackend for SqliteBackend {
    #[tracing::instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn open(&mut self) -> Result<(), Error> {
        let conn = rusqlite::Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let conn = Rc::new(RefCell::new(conn));
        self.data = Some(SqliteTable::new(Rc::clone(&conn), "data", NativeType::Str));
        self.metadata = Some(SqliteTable::new(Rc::clone(&conn), "metadata", NativeType::Str));
        self.conn = Some(conn);
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn close(&mut self) -> Result<(), Error> {
        self.commit()?;
        self.data = None;
        self.metadata = None;
        self.conn = None;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error> {
        let conn = self.conn()?;
        let conn = conn.borrow();
        if conn.is_autocommit() {
            return Ok(());
        }
        conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn begin_transaction(&mut self) -> Result<(), Error> {
        let conn = self.conn()?;
        let conn = conn.borrow();
        if !conn.is_autocommit() {
            return Ok(());
        }
        conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn abort(&mut self) -> Result<(), Error> {
        let conn = self.conn()?;
        let conn = conn.borrow();
        if conn.is_autocommit() {
            return Ok(());
        }
        conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn vacuum(&mut self) -> Result<(), Error> {
        let conn = self.conn()?;
        let conn = conn.borrow();
        conn.execute_batch("REINDEX; VACUUM;")?;
        Ok(())
    }

    fn optimize(&mut self) -> Result<(), Error> {
        let conn = self.conn()?;
        let conn = conn.borrow();
        conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }

    fn create_function(
        &mut self,
        name: &str,
        f: Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, Error> + Send + Sync>,
    ) -> Result<(), Error> {
        let conn = self.conn()?;
        let conn = conn.borrow();
        let captured = Arc::clone(&f);
        conn.create_scalar_function(
            name,
            1,
            rusqlite::functions::FunctionFlags::SQLITE_UTF8 | rusqlite::functions::FunctionFlags::SQLITE_DETERMINISTIC,
            move |ctx| {
                let input: Vec<u8> = ctx.get(0)?;
                captured(&input).map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))
            },
        )?;
        drop(conn);
        self.functions.insert(name.to_owned(), f);
        Ok(())
    }

    fn clear_function(&mut self, name: &str) -> Result<(), Error> {
        self.functions.remove(name);
        Ok(())
    }

    fn table(&mut self, which: Logical) -> Result<&mut dyn Table, Error> {
        let table = match which {
            Logical::Data => &mut self.data,
            Logical::Metadata => &mut self.metadata,
        };
        table
            .as_mut()
            .map(|t| t as &mut dyn Table)
            .ok_or_else(|| Error::UnknownTable("backend not open".to_owned()))
    }

    fn data_size(&mut self) -> Result<DataSize, Error> {
        let conn = self.conn()?;
        let conn = conn.borrow();
        let page_count: u64 = conn.pragma_query_value(None, "page_count", |row| row.get(0))?;
        let freelist_count: u64 = conn.pragma_query_value(None, "freelist_count", |row| row.get(0))?;
        Ok(DataSize { total: Some(page_count), wasted: Some(freelist_count) })
    }

    fn native_value_types(&self) -> &'static [NativeType] {
        &NATIVE_VALUE_TYPES
    }

    fn native_key_types(&self) -> &'static [NativeType] {
        &NATIVE_KEY_TYPES
    }
}
