use crate::backend::mmap::{RedbState, DATA, METADATA};
use crate::backend::{Error, Key, NativeType, Table};
use crate::ProgressReporter;
use std::cell::RefCell;
use std::rc::Rc;

/// A single table within a [`super::RedbBackend`]. Keys are physically stored as byte strings;
/// integers are encoded big-endian. This is a stable, fixed-width encoding, not an
/// order-preserving one: two's-complement big-endian sorts negative `i64` values after all
/// non-negative ones.
pub struct RedbTable {
    state: Rc<RefCell<RedbState>>,
    name: &'static str,
    key_type: NativeType,
}

impl RedbTable {
    pub(crate) fn new(state: Rc<RefCell<RedbState>>, name: &'static str, key_type: NativeType) -> Self {
        Self { state, name, key_type }
    }

    fn definition(&self) -> redb::TableDefinition<&'static [u8], Vec<u8>> {
        match self.name {
            "data" => DATA,
            "metadata" => METADATA,
            other => unreachable!("no such logical table: {other}"),
        }
    }

    fn key_bytes(&self, key: &Key) -> Vec<u8> {
        match key {
            Key::Int(i) => i.to_be_bytes().to_vec(),
            Key::Str(s) => s.as_bytes().to_vec(),
            Key::Bytes(b) => b.clone(),
        }
    }

    fn bytes_to_key(&self, bytes: &[u8]) -> Key {
        match self.key_type {
            NativeType::Int if bytes.len() == 8 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(bytes);
                Key::Int(i64::from_be_bytes(buf))
            }
            NativeType::Str => String::from_utf8(bytes.to_vec()).map_or_else(|_| Key::Bytes(bytes.to_vec()), Key::Str),
            _ => Key::Bytes(bytes.to_vec()),
        }
    }
}

impl Table for RedbTable {
    fn exists(&mut self) -> Result<bool, Error> {
        let state = self.state.borrow();
        let txn = state.txn()?;
        Ok(txn.list_tables()?.any(|t| t.name() == self.name))
    }

    fn create(&mut self, key_type: NativeType, _value_type: NativeType) -> Result<(), Error> {
        self.key_type = key_type;
        let state = self.state.borrow();
        let txn = state.txn()?;
        let _ = txn.open_table(self.definition())?;
        state.set_key_type_of(self.name, key_type)?;
        Ok(())
    }

    fn len(&mut self) -> Result<u64, Error> {
        let state = self.state.borrow();
        let txn = state.txn()?;
        let table = txn.open_table(self.definition())?;
        Ok(table.len()?)
    }

    fn get(&mut self, key: &Key) -> Result<Option<Vec<u8>>, Error> {
        let state = self.state.borrow();
        let txn = state.txn()?;
        let table = txn.open_table(self.definition())?;
        let bytes = self.key_bytes(key);
        Ok(table.get(bytes.as_slice())?.map(|v| v.value()))
    }

    fn put(&mut self, key: &Key, value: &[u8]) -> Result<(), Error> {
        let state = self.state.borrow();
        let txn = state.txn()?;
        let mut table = txn.open_table(self.definition())?;
        let bytes = self.key_bytes(key);
        table.insert(bytes.as_slice(), value.to_vec())?;
        Ok(())
    }

    fn delete(&mut self, key: &Key) -> Result<bool, Error> {
        let state = self.state.borrow();
        let txn = state.txn()?;
        let mut table = txn.open_table(self.definition())?;
        let bytes = self.key_bytes(key);
        Ok(table.remove(bytes.as_slice())?.is_some())
    }

    fn drop_table(&mut self) -> Result<(), Error> {
        let state = self.state.borrow();
        let txn = state.txn()?;
        txn.delete_table(self.definition())?;
        Ok(())
    }

    fn key_type(&self) -> NativeType {
        self.key_type
    }

    fn keys(&mut self) -> Result<Box<dyn Iterator<Item = Result<Key, Error>> + '_>, Error> {
        let state = self.state.borrow();
        let txn = state.txn()?;
        let table = txn.open_table(self.definition())?;
        let rows: Vec<Result<Key, Error>> = table
            .iter()?
            .map(|r| r.map(|(k, _)| self.bytes_to_key(k.value())).map_err(Error::from))
            .collect();
        Ok(Box::new(rows.into_iter()))
    }

    fn values(&mut self) -> Result<Box<dyn Iterator<Item = Result<Vec<u8>, Error>> + '_>, Error> {
        let state = self.state.borrow();
        let txn = state.txn()?;
        let table = txn.open_table(self.definition())?;
        let rows: Vec<Result<Vec<u8>, Error>> =
            table.iter()?.map(|r| r.map(|(_, v)| v.value()).map_err(Error::from)).collect();
        Ok(Box::new(rows.into_iter()))
    }

    fn items(&mut self) -> Result<Box<dyn Iterator<Item = Result<(Key, Vec<u8>), Error>> + '_>, Error> {
        let state = self.state.borrow();
        let txn = state.txn()?;
        let table = txn.open_table(self.definition())?;
        let rows: Vec<Result<(Key, Vec<u8>), Error>> = table
            .iter()?
            .map(|r| r.map(|(k, v)| (self.bytes_to_key(k.value()), v.value())).map_err(Error::from))
            .collect();
        Ok(Box::new(rows.into_iter()))
    }

    fn apply_to_values(&mut self, function_name: &str, progress: &mut dyn ProgressReporter) -> Result<(), Error> {
        let state = self.state.borrow();
        let txn = state.txn()?;
        let mut table = txn.open_table(self.definition())?;
        let rewrites: Vec<(Vec<u8>, Vec<u8>)> = {
            let mut out = Vec::new();
            for row in table.iter()? {
                let (k, v) = row?;
                out.push((k.value().to_vec(), v.value()));
            }
            out
        };
        let total = rewrites.len() as u64;
        for (i, (key, value)) in rewrites.into_iter().enumerate() {
            let rewritten = state.call_function(function_name, &value)?;
            table.insert(key.as_slice(), rewritten)?;
            progress.report(self.name, Some(total), Some(1), Some(function_name));
            let _ = i;
        }
        Ok(())
    }
}
