//! Reading and writing the reserved `metadata` table: `compression`, `serializers`, `dict`, and
//! `key_type`.

use crate::backend::{Key, Logical, StorageBackend};
use crate::cache::{Error, KeyType};

const COMPRESSION: &str = "compression";
const SERIALIZERS: &str = "serializers";
const DICT: &str = "dict";
const KEY_TYPE: &str = "key_type";

pub(crate) fn exists(backend: &mut dyn StorageBackend) -> Result<bool, Error> {
    Ok(backend.table(Logical::Metadata)?.exists()?)
}

pub(crate) fn read_string(backend: &mut dyn StorageBackend, key: &str) -> Result<Option<String>, Error> {
    let table = backend.table(Logical::Metadata)?;
    Ok(table.get(&Key::Str(key.to_owned()))?.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

pub(crate) fn read_bytes(backend: &mut dyn StorageBackend, key: &str) -> Result<Option<Vec<u8>>, Error> {
    let table = backend.table(Logical::Metadata)?;
    Ok(table.get(&Key::Str(key.to_owned()))?)
}

pub(crate) fn write_bytes(backend: &mut dyn StorageBackend, key: &str, value: &[u8]) -> Result<(), Error> {
    let table = backend.table(Logical::Metadata)?;
    table.put(&Key::Str(key.to_owned()), value)?;
    Ok(())
}

pub(crate) fn compression(backend: &mut dyn StorageBackend) -> Result<Option<String>, Error> {
    read_string(backend, COMPRESSION)
}

pub(crate) fn write_compression(backend: &mut dyn StorageBackend, id: &str) -> Result<(), Error> {
    write_bytes(backend, COMPRESSION, id.as_bytes())
}

pub(crate) fn serializers(backend: &mut dyn StorageBackend) -> Result<Option<Vec<String>>, Error> {
    let Some(bytes) = read_bytes(backend, SERIALIZERS)? else { return Ok(None) };
    let ids: Vec<String> = serde_json::from_slice(&bytes).unwrap_or_default();
    Ok(Some(ids))
}

pub(crate) fn write_serializers(backend: &mut dyn StorageBackend, ids: &[&'static str]) -> Result<(), Error> {
    let bytes = serde_json::to_vec(ids).expect("codec id list is always representable as JSON");
    write_bytes(backend, SERIALIZERS, &bytes)
}

pub(crate) fn dict(backend: &mut dyn StorageBackend) -> Result<Option<Vec<u8>>, Error> {
    read_bytes(backend, DICT)
}

pub(crate) fn write_dict(backend: &mut dyn StorageBackend, dict: &[u8]) -> Result<(), Error> {
    write_bytes(backend, DICT, dict)
}

pub(crate) fn key_type(backend: &mut dyn StorageBackend) -> Result<Option<KeyType>, Error> {
    Ok(read_string(backend, KEY_TYPE)?.map(|id| KeyType::from_id(&id)))
}

pub(crate) fn write_key_type(backend: &mut dyn StorageBackend, key_type: KeyType) -> Result<(), Error> {
    write_bytes(backend, KEY_TYPE, key_type.id().as_bytes())
}
