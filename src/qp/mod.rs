//! Lock-free QP-trie core (§3.4, §4.G, §6.2).

mod backend;
pub mod bitmap;
mod build;
mod cursor;
mod node;
mod trie;

pub use backend::QpBackend;
pub(crate) use trie::Trie;
