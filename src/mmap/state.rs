//! One published, immutable snapshot: a memory map plus its validated header.
//!
//! A [`State`] is read-only and cheap to clone behind an `Arc` — readers hold
//! a reference and keep working against it even after a writer publishes a
//! newer one (§4.D). The file itself is never modified in place; the mapping
//! simply becomes stale data nobody looks at once its last `Arc` drops.

use std::path::Path;

use memmap2::Mmap;

use super::layout::{self, Header, Node};
use crate::error::BackendResult;

pub struct State {
    mmap: Mmap,
    header: Header,
}

impl State {
    pub fn open(path: &Path) -> BackendResult<Self> {
        let file = std::fs::File::open(path)?;
        // SAFETY: `path` is only ever replaced wholesale via `writer::publish`'s
        // atomic rename, never truncated or modified in place while mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        let header = layout::parse_header(&mmap)?;
        Ok(Self { mmap, header })
    }

    pub fn buf(&self) -> &[u8] {
        &self.mmap
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn root(&self) -> BackendResult<Node> {
        layout::read_node(&self.mmap, &self.header, self.header.node_region_offset)
    }

    /// Walks `key` (already-encoded bytes, one edge per byte) from the root,
    /// returning the terminal node if every edge exists.
    pub fn find(&self, key: &[u8]) -> BackendResult<Option<Node>> {
        let mut node = self.root()?;
        for &code in key {
            match layout::find_child(&self.mmap, &self.header, &node, code)? {
                Some((_, child)) => node = child,
                None => return Ok(None),
            }
        }
        Ok(Some(node))
    }

    pub fn value(&self, node: &Node) -> BackendResult<Option<&[u8]>> {
        layout::read_value(&self.mmap, &self.header, node)
    }

    pub fn children(&self, node: &Node) -> BackendResult<Vec<(u64, Node)>> {
        let Some((first, count)) = layout::children_region(&self.mmap, &self.header, node)? else {
            return Ok(Vec::new());
        };
        (0..count).map(|i| layout::read_child(&self.mmap, first, i)).collect()
    }

    pub fn is_empty(&self) -> BackendResult<bool> {
        let root = self.root()?;
        Ok(root.child_count == 0 && self.value(&root)?.is_none())
    }
}
