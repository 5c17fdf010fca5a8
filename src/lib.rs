//! Domain-name indexed key-value store with two pluggable trie backends:
//! an mmap-backed blue/green snapshot engine ([`mmap::MmapBackend`]) and a
//! lock-free CAS-based QP-trie ([`qp::QpBackend`]), both implementing the
//! shared [`backend::Backend`] contract.

pub mod backend;
pub mod codec;
pub mod error;
pub mod key;
pub mod log_format;
pub mod mmap;
pub mod options;
pub mod qp;

pub use backend::Backend;
pub use codec::Codec;
pub use error::{BackendError, BackendResult, KeyError};
