//! The external value-codec contract (§2 component B).
//!
//! Both cores store raw bytes; turning a `V` into bytes and back is the
//! embedder's concern. This crate only requires the contract, not any
//! particular serialization format — `tests/support` and `demos/` supply a
//! JSON reference implementation for development and end-to-end testing.

/// Encodes/decodes values of type `V` to/from the byte strings the tries
/// actually store.
pub trait Codec<V>: Send + Sync {
    /// Encoding failures are reported as plain strings; this crate never
    /// inspects them beyond propagating `Display`.
    type Error: std::fmt::Display;

    fn encode(&self, value: &V) -> Result<Vec<u8>, Self::Error>;
    fn decode(&self, bytes: &[u8]) -> Result<V, Self::Error>;
}
