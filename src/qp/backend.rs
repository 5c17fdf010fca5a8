//! [`QpBackend`]: the lock-free QP-trie wired up to [`Backend`] (§4.G, §6.2).

use std::marker::PhantomData;

use super::build;
use super::cursor;
use super::trie::Trie;
use crate::backend::Backend;
use crate::codec::Codec;
use crate::error::{BackendError, BackendResult};
use crate::key::{self, EncodingMode};
use crate::{log_method, log_result};
use crate::options::QpOptions;

/// Domain-keyed store backed by a lock-free QP-trie. Every entry is an
/// immutable `Leaf`; structural changes are single-word CAS operations on
/// one branch at a time (no global lock, no blocking).
pub struct QpBackend<V, C: Codec<V>> {
    options: QpOptions,
    codec: C,
    trie: Trie<Vec<u8>>,
    _value: PhantomData<fn() -> V>,
}

impl<V, C: Codec<V>> QpBackend<V, C> {
    pub fn new(options: QpOptions, codec: C) -> Self {
        log_method!("QpBackend", "new");
        Self { options, codec, trie: Trie::new(), _value: PhantomData }
    }

    /// Builds a backend from a finite sequence of entries in one pass
    /// (§4.G.5), instead of inserting them one at a time.
    pub fn build(options: QpOptions, codec: C, entries: impl IntoIterator<Item = (String, V)>) -> BackendResult<Self>
    where
        C: Clone,
    {
        log_method!("QpBackend", "build");
        log_result!(
            "QpBackend",
            "build",
            (|| -> BackendResult<Self> {
                let mut items = Vec::new();
                for (name, value) in entries {
                    let encoded = Self::encode_key(&name)?;
                    let bytes = codec.encode(&value).map_err(|e| BackendError::Codec(e.to_string()))?;
                    items.push((encoded, bytes));
                }
                Ok(Self { options, codec, trie: build::build(items), _value: PhantomData })
            })()
        )
    }

    fn encode_key(key: &str) -> BackendResult<Vec<u8>> {
        Ok(key::encode(key, EncodingMode::WireLength)?)
    }

    fn decode_value(&self, bytes: &[u8]) -> BackendResult<V> {
        self.codec.decode(bytes).map_err(|e| BackendError::Codec(e.to_string()))
    }

    fn encode_value(&self, value: &V) -> BackendResult<Vec<u8>> {
        self.codec.encode(value).map_err(|e| BackendError::Codec(e.to_string()))
    }
}

impl<V, C: Codec<V>> Backend<V> for QpBackend<V, C> {
    type Iter<'a>
        = QpIter<'a, V, C>
    where
        Self: 'a;

    fn add(&self, key: &str, value: V) -> BackendResult<()> {
        log_method!("QpBackend", "add", key);
        log_result!(
            "QpBackend",
            "add",
            (|| -> BackendResult<()> {
                let encoded = Self::encode_key(key)?;
                if self.trie.contains(&encoded) {
                    return Err(BackendError::AlreadyExists);
                }
                let bytes = self.encode_value(&value)?;
                // A concurrent add of the same key between the check above and this
                // `set` wins the race silently here, matching the "last write wins
                // on a raced CAS" semantics the lock-free core uses everywhere else.
                self.trie.set(&encoded, bytes);
                Ok(())
            })()
        )
    }

    fn try_add(&self, key: &str, value: V) -> bool {
        self.add(key, value).is_ok()
    }

    fn get(&self, key: &str) -> BackendResult<V> {
        log_method!("QpBackend", "get", key);
        log_result!(
            "QpBackend",
            "get",
            (|| -> BackendResult<V> {
                let encoded = Self::encode_key(key)?;
                let bytes = self.trie.lookup(&encoded).ok_or(BackendError::KeyNotFound)?;
                self.decode_value(&bytes)
            })()
        )
    }

    fn try_get(&self, key: &str) -> Option<V> {
        self.get(key).ok()
    }

    fn contains(&self, key: &str) -> bool {
        log_method!("QpBackend", "contains", key);
        let Ok(encoded) = Self::encode_key(key) else { return false };
        self.trie.contains(&encoded)
    }

    fn get_or_add(&self, key: &str, factory: impl FnOnce() -> V) -> BackendResult<V> {
        log_method!("QpBackend", "get_or_add", key);
        log_result!(
            "QpBackend",
            "get_or_add",
            (|| -> BackendResult<V> {
                let encoded = Self::encode_key(key)?;
                if let Some(bytes) = self.trie.lookup(&encoded) {
                    return self.decode_value(&bytes);
                }
                let value = factory();
                let bytes = self.encode_value(&value)?;
                self.trie.set(&encoded, bytes);
                Ok(value)
            })()
        )
    }

    fn add_or_update(
        &self,
        key: &str,
        add_factory: impl FnOnce() -> V,
        update_factory: impl FnOnce(&V) -> V,
    ) -> BackendResult<V> {
        log_method!("QpBackend", "add_or_update", key);
        log_result!(
            "QpBackend",
            "add_or_update",
            (|| -> BackendResult<V> {
                let encoded = Self::encode_key(key)?;
                let value = match self.trie.lookup(&encoded) {
                    Some(bytes) => update_factory(&self.decode_value(&bytes)?),
                    None => add_factory(),
                };
                let bytes = self.encode_value(&value)?;
                self.trie.set(&encoded, bytes);
                Ok(value)
            })()
        )
    }

    fn try_update(&self, key: &str, new: V, expected: &V) -> bool
    where
        V: PartialEq,
    {
        log_method!("QpBackend", "try_update", key);
        let Ok(encoded) = Self::encode_key(key) else { return false };
        let Some(bytes) = self.trie.lookup(&encoded) else { return false };
        let Ok(current) = self.decode_value(&bytes) else { return false };
        if current != *expected {
            return false;
        }
        let Ok(new_bytes) = self.encode_value(&new) else { return false };
        self.trie.set(&encoded, new_bytes);
        true
    }

    fn try_remove(&self, key: &str) -> Option<V> {
        log_method!("QpBackend", "try_remove", key);
        let encoded = Self::encode_key(key).ok()?;
        let bytes = self.trie.delete(&encoded)?;
        self.decode_value(&bytes).ok()
    }

    fn clear(&self) {
        log_method!("QpBackend", "clear");
        self.trie.clear();
    }

    fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    fn enumerate(&self) -> Self::Iter<'_> {
        log_method!("QpBackend", "enumerate");
        let root = self.trie.root.load_full();
        let entries = cursor::collect_entries(&root.as_deref().cloned(), false);
        QpIter { entries: entries.into_iter(), backend: self }
    }

    fn reverse_enumerate(&self) -> Self::Iter<'_> {
        log_method!("QpBackend", "reverse_enumerate");
        let root = self.trie.root.load_full();
        let entries = cursor::collect_entries(&root.as_deref().cloned(), true);
        QpIter { entries: entries.into_iter(), backend: self }
    }
}

pub struct QpIter<'a, V, C: Codec<V>> {
    entries: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
    backend: &'a QpBackend<V, C>,
}

impl<'a, V, C: Codec<V>> Iterator for QpIter<'a, V, C> {
    type Item = (String, V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.entries.next()?;
        let domain = key::decode_wire_length(&key);
        let decoded = self
            .backend
            .decode_value(&value)
            .expect("value encoded by this backend's own codec must decode");
        Some((domain, decoded))
    }
}
