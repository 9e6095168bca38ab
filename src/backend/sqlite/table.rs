use crate::backend::{Error, Key, NativeType, Table};
use crate::ProgressReporter;
use rusqlite::types::Value as SqlValue;
use std::cell::RefCell;
use std::rc::Rc;

fn key_to_sql(key: &Key) -> SqlValue {
    match key {
        Key::Int(i) => SqlValue::Integer(*i),
        Key::Str(s) => SqlValue::Text(s.clone()),
        Key::Bytes(b) => SqlValue::Blob(b.clone()),
    }
}

fn sql_column(ty: NativeType) -> &'static str {
    match ty {
        NativeType::Int => "INTEGER",
        NativeType::Str => "TEXT",
        NativeType::Bytes => "BLOB",
    }
}

fn row_to_key(value: SqlValue, ty: NativeType) -> Key {
    match (ty, value) {
        (NativeType::Int, SqlValue::Integer(i)) => Key::Int(i),
        (NativeType::Str, SqlValue::Text(s)) => Key::Str(s),
        (_, SqlValue::Blob(b)) => Key::Bytes(b),
        (_, SqlValue::Text(s)) => Key::Str(s),
        (_, SqlValue::Integer(i)) => Key::Int(i),
        (_, other) => Key::Bytes(format!("{other:?}").into_bytes()),
    }
}

/// A single SQL table `(key PRIMARY KEY, val)` within a [`super::SqliteBackend`].
pub struct SqliteTable {
    conn: Rc<RefCell<rusqlite::Connection>>,
    name: &'static str,
    key_type: NativeType,
}

impl SqliteTable {
    pub(super) fn new(conn: Rc<RefCell<rusqlite::Connection>>, name: &'static str, key_type: NativeType) -> Self {
        Self { conn, name, key_type }
    }
}

impl Table for SqliteTable {
    fn exists(&mut self) -> Result<bool, Error> {
        let conn = self.conn.borrow();
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = ?1",
            [self.name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn create(&mut self, key_type: NativeType, value_type: NativeType) -> Result<(), Error> {
        self.key_type = key_type;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (key {} PRIMARY KEY, val {})",
            self.name,
            sql_column(key_type),
            sql_column(value_type),
        );
        self.conn.borrow().execute_batch(&sql)?;
        Ok(())
    }

    fn len(&mut self) -> Result<u64, Error> {
        let conn = self.conn.borrow();
        let count: u64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", self.name), [], |row| row.get(0))?;
        Ok(count)
    }

    fn get(&mut self, key: &Key) -> Result<Option<Vec<u8>>, Error> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare_cached(&format!("SELECT val FROM {} WHERE key = ?1", self.name))?;
        let result = stmt.query_row([key_to_sql(key)], |row| row.get::<_, Vec<u8>>(0));
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&mut self, key: &Key, value: &[u8]) -> Result<(), Error> {
        let conn = self.conn.borrow();
        conn.execute(
            &format!("REPLACE INTO {} (key, val) VALUES (?1, ?2)", self.name),
            rusqlite::params![key_to_sql(key), value],
        )?;
        Ok(())
    }

    fn delete(&mut self, key: &Key) -> Result<bool, Error> {
        let conn = self.conn.borrow();
        let changed = conn.execute(&format!("DELETE FROM {} WHERE key = ?1", self.name), [key_to_sql(key)])?;
        Ok(changed > 0)
    }

    fn drop_table(&mut self) -> Result<(), Error> {
        self.conn.borrow().execute_batch(&format!("DROP TABLE IF EXISTS {}", self.name))?;
        Ok(())
    }

    fn key_type(&self) -> NativeType {
        self.key_type
    }

    fn keys(&mut self) -> Result<Box<dyn Iterator<Item = Result<Key, Error>> + '_>, Error> {
        let conn = self.conn.borrow();
        let key_type = self.key_type;
        let mut stmt = conn.prepare(&format!("SELECT key FROM {}", self.name))?;
        let rows: Vec<Result<Key, Error>> = stmt
            .query_map([], |row| row.get::<_, SqlValue>(0))?
            .map(|r| r.map(|v| row_to_key(v, key_type)).map_err(Error::from))
            .collect();
        Ok(Box::new(rows.into_iter()))
    }

    fn values(&mut self) -> Result<Box<dyn Iterator<Item = Result<Vec<u8>, Error>> + '_>, Error> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&format!("SELECT val FROM {}", self.name))?;
        let rows: Vec<Result<Vec<u8>, Error>> =
            stmt.query_map([], |row| row.get::<_, Vec<u8>>(0))?.map(|r| r.map_err(Error::from)).collect();
        Ok(Box::new(rows.into_iter()))
    }

    fn items(&mut self) -> Result<Box<dyn Iterator<Item = Result<(Key, Vec<u8>), Error>> + '_>, Error> {
        let conn = self.conn.borrow();
        let key_type = self.key_type;
        let mut stmt = conn.prepare(&format!("SELECT key, val FROM {}", self.name))?;
        let rows: Vec<Result<(Key, Vec<u8>), Error>> = stmt
            .query_map([], |row| Ok((row.get::<_, SqlValue>(0)?, row.get::<_, Vec<u8>>(1)?)))?
            .map(|r| r.map(|(k, v)| (row_to_key(k, key_type), v)).map_err(Error::from))
            .collect();
        Ok(Box::new(rows.into_iter()))
    }

    fn apply_to_values(&mut self, function_name: &str, progress: &mut dyn ProgressReporter) -> Result<(), Error> {
        let conn = self.conn.borrow();
        let affected = conn.execute(
            &format!("REPLACE INTO {table} SELECT key, {func}(val) FROM {table}", table = self.name, func = function_name),
            [],
        )?;
        progress.report(self.name, None, Some(affected as u64), Some("recompress"));
        Ok(())
    }
}
