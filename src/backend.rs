//! The shared backend contract (§6.1) implemented by both [`crate::mmap::MmapBackend`]
//! and [`crate::qp::QpBackend`].

use crate::error::BackendResult;

/// CRUD + enumeration surface common to both tries, keyed by domain name.
///
/// Every method validates `key` through [`crate::key::encode`] first. The
/// "try" methods turn every *input* error into a silent `false`/`None`
/// (§7 propagation policy); the throwing methods surface it as
/// [`crate::error::BackendError::Key`].
pub trait Backend<V> {
    /// Ordered iterator returned by [`Backend::enumerate`] / [`Backend::reverse_enumerate`].
    type Iter<'a>: Iterator<Item = (String, V)> + 'a
    where
        Self: 'a;

    /// Inserts `key -> value`. Fails with `AlreadyExists` if already present.
    fn add(&self, key: &str, value: V) -> BackendResult<()>;

    /// Inserts `key -> value` unless already present or `key` is invalid.
    /// Never raises for an invalid key.
    fn try_add(&self, key: &str, value: V) -> bool;

    /// Looks up `key`. Fails with `KeyNotFound` if absent.
    fn get(&self, key: &str) -> BackendResult<V>;

    /// Looks up `key`, returning `None` on any failure (absent or invalid key).
    fn try_get(&self, key: &str) -> Option<V>;

    /// Membership check; `false` for an invalid key.
    fn contains(&self, key: &str) -> bool;

    /// Returns the existing value for `key`, or atomically inserts and
    /// returns the result of `factory` if absent.
    fn get_or_add(&self, key: &str, factory: impl FnOnce() -> V) -> BackendResult<V>;

    /// Atomic read-modify-write: inserts `add_factory()` if absent, else
    /// replaces the existing value with `update_factory(&existing)`.
    fn add_or_update(
        &self,
        key: &str,
        add_factory: impl FnOnce() -> V,
        update_factory: impl FnOnce(&V) -> V,
    ) -> BackendResult<V>;

    /// Compare-and-set: replaces `key`'s value with `new` iff the current
    /// value equals `expected`. `false` if absent, mismatched, or invalid key.
    fn try_update(&self, key: &str, new: V, expected: &V) -> bool
    where
        V: PartialEq;

    /// Removes `key` if present, returning its prior value. Idempotent.
    fn try_remove(&self, key: &str) -> Option<V>;

    /// Drops every entry.
    fn clear(&self);

    /// `true` if the tree holds no entries.
    fn is_empty(&self) -> bool;

    /// Forward (ascending encoded-key) traversal (§4.I).
    fn enumerate(&self) -> Self::Iter<'_>;

    /// Reverse (descending encoded-key) traversal (§4.I).
    fn reverse_enumerate(&self) -> Self::Iter<'_>;
}
