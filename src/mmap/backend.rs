//! [`MmapBackend`]: the mmap blue/green trie wired up to [`Backend`] (§4.D, §6.2).

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use super::cursor;
use super::state::State;
use super::staging::StagingTrie;
use super::writer;
use crate::backend::Backend;
use crate::codec::Codec;
use crate::error::{BackendError, BackendResult};
use crate::key::{self, EncodingMode};
use crate::{log_method, log_result};
use crate::options::MmapOptions;

/// Domain-keyed store backed by a memory-mapped, blue/green-published
/// snapshot file. Every mutation rebuilds the whole file from an in-memory
/// mirror ([`StagingTrie`]) and atomically republishes it; readers already
/// holding the old mapping keep working against it until they drop it.
pub struct MmapBackend<V, C: Codec<V>> {
    path: PathBuf,
    codec: C,
    staging: Mutex<StagingTrie>,
    state: ArcSwap<State>,
    _value: PhantomData<fn() -> V>,
}

impl<V, C: Codec<V>> MmapBackend<V, C> {
    /// Opens the snapshot at `options.path`, creating an empty one if it
    /// does not exist yet, and reconstructs the in-memory staging mirror
    /// from its current contents.
    pub fn open(options: MmapOptions, codec: C) -> BackendResult<Self> {
        log_method!("MmapBackend", "open", &options.path.display().to_string());
        log_result!(
            "MmapBackend",
            "open",
            (|| -> BackendResult<Self> {
                writer::recover(&options.path)?;
                if !options.path.exists() {
                    writer::publish(&options.path, &writer::serialize(&StagingTrie::new()))?;
                }
                let state = State::open(&options.path)?;
                let entries = cursor::collect_entries(&state, false)?;
                let mut staging = StagingTrie::new();
                for (key, value) in entries {
                    staging.set(&key, value);
                }
                Ok(Self {
                    path: options.path,
                    codec,
                    staging: Mutex::new(staging),
                    state: ArcSwap::new(Arc::new(state)),
                    _value: PhantomData,
                })
            })()
        )
    }

    fn encode_key(key: &str) -> BackendResult<Vec<u8>> {
        Ok(key::encode(key, EncodingMode::ReverseLabel)?)
    }

    fn decode_value(&self, bytes: &[u8]) -> BackendResult<V> {
        self.codec.decode(bytes).map_err(|e| BackendError::Codec(e.to_string()))
    }

    fn encode_value(&self, value: &V) -> BackendResult<Vec<u8>> {
        self.codec.encode(value).map_err(|e| BackendError::Codec(e.to_string()))
    }

    /// Serializes `staging` to a new file image and swaps it in. Caller
    /// holds `self.staging`'s lock for the duration of the edit that led here.
    fn republish(&self, staging: &StagingTrie) -> BackendResult<()> {
        let bytes = writer::serialize(staging);
        writer::publish(&self.path, &bytes)?;
        let state = State::open(&self.path)?;
        self.state.store(Arc::new(state));
        Ok(())
    }
}

impl<V, C: Codec<V>> Backend<V> for MmapBackend<V, C> {
    type Iter<'a>
        = MmapIter<'a, V, C>
    where
        Self: 'a;

    fn add(&self, key: &str, value: V) -> BackendResult<()> {
        log_method!("MmapBackend", "add", key);
        log_result!(
            "MmapBackend",
            "add",
            (|| -> BackendResult<()> {
                let encoded = Self::encode_key(key)?;
                let mut staging = self.staging.lock().unwrap();
                if staging.contains(&encoded) {
                    return Err(BackendError::AlreadyExists);
                }
                let bytes = self.encode_value(&value)?;
                staging.set(&encoded, bytes);
                self.republish(&staging)
            })()
        )
    }

    fn try_add(&self, key: &str, value: V) -> bool {
        self.add(key, value).is_ok()
    }

    fn get(&self, key: &str) -> BackendResult<V> {
        log_method!("MmapBackend", "get", key);
        log_result!(
            "MmapBackend",
            "get",
            (|| -> BackendResult<V> {
                let encoded = Self::encode_key(key)?;
                let state = self.state.load();
                let node = state.find(&encoded)?.ok_or(BackendError::KeyNotFound)?;
                let bytes = state.value(&node)?.ok_or(BackendError::KeyNotFound)?;
                self.decode_value(bytes)
            })()
        )
    }

    fn try_get(&self, key: &str) -> Option<V> {
        self.get(key).ok()
    }

    fn contains(&self, key: &str) -> bool {
        log_method!("MmapBackend", "contains", key);
        let Ok(encoded) = Self::encode_key(key) else { return false };
        let state = self.state.load();
        let Ok(Some(node)) = state.find(&encoded) else { return false };
        matches!(state.value(&node), Ok(Some(_)))
    }

    fn get_or_add(&self, key: &str, factory: impl FnOnce() -> V) -> BackendResult<V> {
        log_method!("MmapBackend", "get_or_add", key);
        log_result!(
            "MmapBackend",
            "get_or_add",
            (|| -> BackendResult<V> {
                let encoded = Self::encode_key(key)?;
                let mut staging = self.staging.lock().unwrap();
                if let Some(bytes) = staging.get(&encoded) {
                    return self.decode_value(bytes);
                }
                let value = factory();
                let bytes = self.encode_value(&value)?;
                staging.set(&encoded, bytes);
                self.republish(&staging)?;
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
        log_method!("MmapBackend", "add_or_update", key);
        log_result!(
            "MmapBackend",
            "add_or_update",
            (|| -> BackendResult<V> {
                let encoded = Self::encode_key(key)?;
                let mut staging = self.staging.lock().unwrap();
                let value = match staging.get(&encoded) {
                    Some(bytes) => update_factory(&self.decode_value(bytes)?),
                    None => add_factory(),
                };
                let bytes = self.encode_value(&value)?;
                staging.set(&encoded, bytes);
                self.republish(&staging)?;
                Ok(value)
            })()
        )
    }

    fn try_update(&self, key: &str, new: V, expected: &V) -> bool
    where
        V: PartialEq,
    {
        log_method!("MmapBackend", "try_update", key);
        let Ok(encoded) = Self::encode_key(key) else { return false };
        let mut staging = self.staging.lock().unwrap();
        let Some(bytes) = staging.get(&encoded) else { return false };
        let Ok(current) = self.decode_value(bytes) else { return false };
        if current != *expected {
            return false;
        }
        let Ok(new_bytes) = self.encode_value(&new) else { return false };
        staging.set(&encoded, new_bytes);
        self.republish(&staging).is_ok()
    }

    fn try_remove(&self, key: &str) -> Option<V> {
        log_method!("MmapBackend", "try_remove", key);
        let encoded = Self::encode_key(key).ok()?;
        let mut staging = self.staging.lock().unwrap();
        let bytes = staging.remove(&encoded)?;
        let value = self.decode_value(&bytes).ok()?;
        self.republish(&staging).ok()?;
        Some(value)
    }

    fn clear(&self) {
        log_method!("MmapBackend", "clear");
        let mut staging = self.staging.lock().unwrap();
        staging.clear();
        let _ = log_result!("MmapBackend", "clear", self.republish(&staging));
    }

    fn is_empty(&self) -> bool {
        self.state.load().is_empty().unwrap_or(true)
    }

    fn enumerate(&self) -> Self::Iter<'_> {
        log_method!("MmapBackend", "enumerate");
        let entries = cursor::collect_entries(&self.state.load(), false).unwrap_or_default();
        MmapIter { entries: entries.into_iter(), backend: self }
    }

    fn reverse_enumerate(&self) -> Self::Iter<'_> {
        log_method!("MmapBackend", "reverse_enumerate");
        let entries = cursor::collect_entries(&self.state.load(), true).unwrap_or_default();
        MmapIter { entries: entries.into_iter(), backend: self }
    }
}

pub struct MmapIter<'a, V, C: Codec<V>> {
    entries: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
    backend: &'a MmapBackend<V, C>,
}

impl<'a, V, C: Codec<V>> Iterator for MmapIter<'a, V, C> {
    type Item = (String, V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.entries.next()?;
        let domain = key::decode_reverse_label(&key);
        let decoded = self
            .backend
            .decode_value(&value)
            .expect("value encoded by this backend's own codec must decode");
        Some((domain, decoded))
    }
}
