//! The process-wide codec catalog: indexes codecs by id and by `(source_type, target_type)`,
//! and answers shortest-path queries over the declared edges between types.

use crate::codecs::{Codec, Error, ValueType};
use std::collections::{HashMap, VecDeque};
use std::sync::{OnceLock, RwLock};

/// A handle to a registered codec catalog.
///
/// The default instance is a process-wide singleton populated with the built-in codecs
/// ([`crate::codecs::builtin`]). Tests that want an isolated catalog can construct their own
/// with [`Registry::new`] and register codecs into it directly.
pub struct Registry {
    by_id: RwLock<HashMap<&'static str, &'static dyn Codec>>,
}

impl Registry {
    /// Builds an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self { by_id: RwLock::new(HashMap::new()) }
    }

    /// Registers a codec, keyed by its id. Re-registering the same id replaces the entry.
    pub fn register(&self, codec: &'static dyn Codec) {
        self.by_id.write().expect("codec registry lock poisoned").insert(codec.id(), codec);
    }

    /// Looks up a codec by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCodec`] if no codec is registered under `id`.
    pub fn get(&self, id: &str) -> Result<&'static dyn Codec, Error> {
        self.by_id
            .read()
            .expect("codec registry lock poisoned")
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownCodec(id.to_owned()))
    }

    /// Finds the shortest chain of registered codecs whose composed source/target types connect
    /// `from` to `to`, via breadth-first search over the declared `(source_type, target_type)`
    /// edges. Ties are broken by BFS discovery order, which is already shortest-path-first.
    ///
    /// Returns `Ok(vec![])` when `from == to` (the identity chain).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPath`] if no chain of registered codecs connects the two types.
    pub fn shortest_path(&self, from: ValueType, to: ValueType) -> Result<Vec<&'static dyn Codec>, Error> {
        if from == to {
            return Ok(Vec::new());
        }

        let codecs = self.by_id.read().expect("codec registry lock poisoned");

        let mut came_from: HashMap<ValueType, (ValueType, &'static dyn Codec)> = HashMap::new();
        let mut seen: std::collections::HashSet<ValueType> = std::collections::HashSet::new();
        seen.insert(from);
        let mut queue: VecDeque<ValueType> = VecDeque::new();
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            if current == to {
                break;
            }
            for codec in codecs.values() {
                if codec.source_type() == current && seen.insert(codec.target_type()) {
                    came_from.insert(codec.target_type(), (current, *codec));
                    queue.push_back(codec.target_type());
                }
            }
        }

        if to != from && !came_from.contains_key(&to) {
            return Err(Error::NoPath { from, to });
        }

        let mut path = Vec::new();
        let mut node = to;
        while node != from {
            let (prev, codec) = came_from[&node];
            path.push(codec);
            node = prev;
        }
        path.reverse();
        Ok(path)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide default registry, pre-populated with the built-in codecs.
pub fn global() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(|| {
        let registry = Registry::new();
        crate::codecs::builtin::register_all(&registry);
        registry
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::ValueType;

    #[test]
    fn shortest_path_identity_is_empty() {
        let path = global().shortest_path(ValueType::Bytes, ValueType::Bytes).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn shortest_path_bytes_to_str() {
        let path = global().shortest_path(ValueType::Bytes, ValueType::Str).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].id(), "utf8");
    }

    #[test]
    fn shortest_path_bytes_to_structured_via_utf8_and_json() {
        let path = global().shortest_path(ValueType::Bytes, ValueType::Structured).unwrap();
        // utf8 -> json is one candidate edge; msgpack/cbor (bytes -> structured directly) may be
        // shorter if those features are enabled, which is fine: either is a valid shortest path.
        assert!(!path.is_empty());
        assert_eq!(path.last().unwrap().target_type(), ValueType::Structured);
    }

    #[test]
    fn no_path_from_structured_to_int() {
        let err = global().shortest_path(ValueType::Structured, ValueType::Int).unwrap_err();
        assert!(matches!(err, Error::NoPath { .. }));
    }
}
