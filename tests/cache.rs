//! End-to-end tests exercising [`blobcache::Cache`] against real on-disk backends.

use blobcache::backend::Key;
use blobcache::cache::{CacheOptions, CompressorSelector};
use blobcache::{Cache, Error, KeyType};

#[cfg(feature = "backend-sqlite")]
fn sqlite_path(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
    dir.path().join(format!("{name}.sqlite"))
}

#[cfg(feature = "backend-redb")]
fn mmap_path(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
    dir.path().join(format!("{name}.mdb"))
}

#[cfg(feature = "backend-sqlite")]
fn prop_put_get_roundtrip_across_reopen(pairs: Vec<(String, String)>) -> quickcheck::TestResult {
    let mut dedup = std::collections::HashMap::new();
    for (k, v) in pairs {
        if !k.is_empty() {
            dedup.insert(k, v);
        }
    }
    if dedup.is_empty() {
        return quickcheck::TestResult::discard();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "quickcheck-roundtrip");

    {
        let mut cache: Cache<String> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
        for (k, v) in &dedup {
            cache.put(&Key::Str(k.clone()), Some(v.clone())).unwrap();
        }
        cache.close();
    }

    let mut reopened: Cache<String> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
    for (k, v) in &dedup {
        if reopened.get(&Key::Str(k.clone())).unwrap().as_ref() != Some(v) {
            return quickcheck::TestResult::failed();
        }
    }
    quickcheck::TestResult::from_bool(reopened.len().unwrap() == dedup.len() as u64)
}

#[cfg(feature = "backend-sqlite")]
#[test]
fn quickcheck_put_get_roundtrip_across_reopen() {
    quickcheck::quickcheck(prop_put_get_roundtrip_across_reopen as fn(Vec<(String, String)>) -> quickcheck::TestResult);
}

#[cfg(feature = "backend-sqlite")]
fn prop_put_none_is_delete(key: String, value: String) -> quickcheck::TestResult {
    if key.is_empty() {
        return quickcheck::TestResult::discard();
    }

    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "quickcheck-tombstone");
    let mut cache: Cache<String> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
    let k = Key::Str(key);

    cache.put(&k, Some(value)).unwrap();
    cache.put(&k, None).unwrap();

    quickcheck::TestResult::from_bool(!cache.contains(&k).unwrap() && cache.get(&k).unwrap().is_none())
}

#[cfg(feature = "backend-sqlite")]
#[test]
fn quickcheck_put_none_is_delete() {
    quickcheck::quickcheck(prop_put_none_is_delete as fn(String, String) -> quickcheck::TestResult);
}

#[cfg(feature = "backend-sqlite")]
#[test]
fn empty_init_then_put_get_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "blob");

    let mut cache: Cache<Vec<u8>> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
    assert!(cache.is_empty().unwrap());

    let key = Key::Str("greeting".to_owned());
    cache.put(&key, Some(b"hello world".to_vec())).unwrap();

    assert_eq!(cache.get(&key).unwrap(), Some(b"hello world".to_vec()));
    assert!(cache.contains(&key).unwrap());
    assert_eq!(cache.len().unwrap(), 1);
}

#[cfg(feature = "backend-sqlite")]
#[test]
fn json_flavor_roundtrips_structured_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "json");

    let mut cache: Cache<serde_json::Value> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
    let key = Key::Str("record".to_owned());
    let value = serde_json::json!({"id": 42, "tags": ["a", "b"], "active": true});

    cache.put(&key, Some(value.clone())).unwrap();
    assert_eq!(cache.get(&key).unwrap(), Some(value));
}

#[cfg(feature = "backend-sqlite")]
#[test]
fn data_survives_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "durable");

    {
        let mut cache: Cache<String> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
        cache.put(&Key::Str("a".to_owned()), Some("first".to_owned())).unwrap();
        cache.close();
    }

    let mut reopened: Cache<String> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
    assert_eq!(reopened.get(&Key::Str("a".to_owned())).unwrap(), Some("first".to_owned()));
}

#[cfg(feature = "backend-sqlite")]
#[test]
fn put_none_deletes_and_clears_contains() {
    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "tombstone");

    let mut cache: Cache<String> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
    let key = Key::Str("k".to_owned());

    cache.put(&key, Some("value".to_owned())).unwrap();
    assert!(cache.contains(&key).unwrap());
    assert_eq!(cache.len().unwrap(), 1);

    cache.put(&key, None).unwrap();
    assert!(!cache.contains(&key).unwrap());
    assert_eq!(cache.len().unwrap(), 0);
}

#[cfg(feature = "backend-sqlite")]
#[test]
fn reopening_with_a_different_key_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "keytype");

    {
        let options = CacheOptions { key_type: Some(KeyType::Native(blobcache::backend::NativeType::Int)), ..CacheOptions::default() };
        let mut cache: Cache<String> = Cache::open(path.as_path(), options).unwrap();
        cache.put(&Key::Int(1), Some("one".to_owned())).unwrap();
        cache.close();
    }

    let options = CacheOptions { key_type: Some(KeyType::Native(blobcache::backend::NativeType::Str)), ..CacheOptions::default() };
    let result: Result<Cache<String>, Error> = Cache::open(path.as_path(), options);
    assert!(matches!(result, Err(Error::IncompatibleKeyType { .. })));
}

#[cfg(feature = "backend-sqlite")]
#[test]
fn reopening_with_a_different_value_flavor_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "flavor");

    {
        let mut cache: Cache<String> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
        cache.put(&Key::Str("a".to_owned()), Some("hi".to_owned())).unwrap();
        cache.close();
    }

    let result: Result<Cache<serde_json::Value>, Error> = Cache::open(path.as_path(), CacheOptions::default());
    assert!(matches!(result, Err(Error::IncompatibleCodecs { .. })));
}

#[cfg(feature = "backend-sqlite")]
#[test]
fn populate_then_keys_values_items_agree() {
    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "populate");

    let mut cache: Cache<String> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
    let pairs: Vec<(Key, String)> =
        (0..10).map(|i| (Key::Str(format!("key-{i}")), format!("value-{i}"))).collect();

    let mut progress_calls = 0usize;
    cache
        .populate(pairs.clone(), &mut |_key: &str, _progress: Option<u64>, incr: Option<u64>, _op: Option<&str>| {
            progress_calls += incr.unwrap_or(0) as usize;
        })
        .unwrap();
    assert_eq!(progress_calls, pairs.len());

    assert_eq!(cache.len().unwrap(), 10);
    let mut keys = cache.keys().unwrap();
    keys.sort_by_key(|k| match k {
        Key::Str(s) => s.clone(),
        _ => String::new(),
    });
    assert_eq!(keys.len(), 10);

    let mut values = cache.values().unwrap();
    values.sort();
    assert_eq!(values.first().unwrap(), "value-0");

    let items = cache.items().unwrap();
    assert_eq!(items.len(), 10);
}

#[cfg(all(feature = "backend-sqlite", feature = "compress-zstd", feature = "compress-dictionaries"))]
#[test]
fn optimize_compression_retrains_dictionary_without_losing_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "optimize");

    let options = CacheOptions { compressor: CompressorSelector::Id("zstd".to_owned()), ..CacheOptions::default() };
    let mut cache: Cache<String> = Cache::open(path.as_path(), options).unwrap();

    let shared_phrase = "the quick brown fox jumps over the lazy dog, repeated across every entry; ";
    for i in 0..100 {
        let value = format!("{shared_phrase}entry number {i} with some extra padding text to bulk up the sample");
        cache.put(&Key::Str(format!("k{i}")), Some(value)).unwrap();
    }

    let mut reports = 0usize;
    cache
        .optimize_compression(Some(512), &mut |_key: &str, _progress: Option<u64>, _incr: Option<u64>, _op: Option<&str>| {
            reports += 1;
        })
        .unwrap();

    for i in 0..100 {
        let expected = format!("{shared_phrase}entry number {i} with some extra padding text to bulk up the sample");
        assert_eq!(cache.get(&Key::Str(format!("k{i}"))).unwrap(), Some(expected));
    }
}

#[cfg(feature = "backend-sqlite")]
#[test]
fn optimize_compression_without_dictionary_support_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "none-compressor");

    let options = CacheOptions { compressor: CompressorSelector::None, ..CacheOptions::default() };
    let mut cache: Cache<String> = Cache::open(path.as_path(), options).unwrap();
    cache.put(&Key::Str("a".to_owned()), Some("value".to_owned())).unwrap();

    let result = cache.optimize_compression(None, &mut |_: &str, _: Option<u64>, _: Option<u64>, _: Option<&str>| {});
    assert!(matches!(result, Err(Error::UnsupportedOperation(_))));
}

#[cfg(feature = "backend-sqlite")]
#[test]
fn empty_drops_and_recreates_the_data_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = sqlite_path(&dir, "empty");

    let mut cache: Cache<String> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
    cache.put(&Key::Str("a".to_owned()), Some("x".to_owned())).unwrap();
    cache.put(&Key::Str("b".to_owned()), Some("y".to_owned())).unwrap();
    assert_eq!(cache.len().unwrap(), 2);

    cache.empty().unwrap();
    assert!(cache.is_empty().unwrap());

    cache.put(&Key::Str("c".to_owned()), Some("z".to_owned())).unwrap();
    assert_eq!(cache.get(&Key::Str("c".to_owned())).unwrap(), Some("z".to_owned()));
}

#[cfg(feature = "backend-redb")]
#[test]
fn mmap_backend_roundtrips_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = mmap_path(&dir, "mmap");

    {
        let mut cache: Cache<String> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
        cache.put(&Key::Str("a".to_owned()), Some("hello".to_owned())).unwrap();
        cache.close();
    }

    let mut reopened: Cache<String> = Cache::open(path.as_path(), CacheOptions::default()).unwrap();
    assert_eq!(reopened.get(&Key::Str("a".to_owned())).unwrap(), Some("hello".to_owned()));
}

#[cfg(feature = "backend-redb")]
#[test]
fn mmap_backend_roundtrips_integer_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = mmap_path(&dir, "mmap-int");

    let options = CacheOptions { key_type: Some(KeyType::Native(blobcache::backend::NativeType::Int)), ..CacheOptions::default() };
    let mut cache: Cache<String> = Cache::open(path.as_path(), options).unwrap();

    for i in [-3_i64, 10, 0, 5] {
        cache.put(&Key::Int(i), Some(i.to_string())).unwrap();
    }

    for i in [-3_i64, 10, 0, 5] {
        assert_eq!(cache.get(&Key::Int(i)).unwrap(), Some(i.to_string()));
    }
}
