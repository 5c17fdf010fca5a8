//! Flattens a [`StagingTrie`] into a file image and publishes it atomically
//! (§4.D blue/green swap).

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use super::layout::{self, Header, Node, HEADER_LEN, NODE_LEN};
use super::staging::StagingTrie;
use crate::error::BackendResult;

/// Breadth-first flattens `trie` into the packed format [`layout::parse_header`]
/// understands: nodes for a level are laid out contiguously right after their
/// parent generation, so each node's children sit at one `firstChildPos`.
pub fn serialize(trie: &StagingTrie) -> Vec<u8> {
    let node_region_offset = HEADER_LEN as u64;

    let mut nodes: Vec<Node> = vec![Node::default()];
    // Relative offset 0 is reserved to mean "no value" (§3.2); pad it out.
    let mut values: Vec<u8> = vec![0u8];

    let mut queue: VecDeque<(usize, &super::staging::StagingNode)> = VecDeque::new();
    queue.push_back((0, &trie.root));

    while let Some((idx, staging)) = queue.pop_front() {
        if let Some(value) = &staging.value {
            nodes[idx].value_offset = values.len() as i64;
            nodes[idx].value_length = value.len() as i32;
            values.extend_from_slice(&(value.len() as i32).to_le_bytes());
            values.extend_from_slice(value);
        }

        if !staging.children.is_empty() {
            let first_index = nodes.len();
            nodes[idx].first_child_pos =
                node_region_offset as i64 + (first_index * NODE_LEN) as i64;
            nodes[idx].child_count = staging.children.len() as u32;
            for (&label, child) in &staging.children {
                let child_index = nodes.len();
                nodes.push(Node { label_id: label as u32, ..Default::default() });
                queue.push_back((child_index, child));
            }
        }
    }

    let node_count = nodes.len() as u64;
    let value_region_offset = node_region_offset + node_count * NODE_LEN as u64;

    let mut out = Vec::with_capacity(HEADER_LEN + nodes.len() * NODE_LEN + values.len());
    layout::write_header(
        &mut out,
        &Header { node_region_offset, node_count, value_region_offset },
    );
    for node in &nodes {
        out.extend_from_slice(&node.to_bytes());
    }
    out.extend_from_slice(&values);
    out
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Writes `bytes` to `<path>.tmp`, retains the previous file as `<path>.bak`,
/// then renames the temp file into place (§4.F step 2-3). The rename is
/// atomic on any POSIX filesystem, so there is no window where `path` is
/// partially written; readers with the old file already mapped keep seeing a
/// complete, valid image for as long as they hold it open. Deterministic
/// sidecar names (rather than a randomly-named scratch file) are what let
/// [`recover`] find and promote a publish interrupted mid-way (§6.2).
pub fn publish(path: &Path, bytes: &[u8]) -> BackendResult<()> {
    let tmp_path = sidecar(path, "tmp");
    let bak_path = sidecar(path, "bak");

    {
        let mut file = std::fs::File::create(&tmp_path)?;
        std::io::Write::write_all(&mut file, bytes)?;
        file.sync_all()?;
    }

    if path.exists() {
        let _ = std::fs::remove_file(&bak_path);
        if std::fs::rename(path, &bak_path).is_err() {
            // Platform couldn't retain a backup via rename; fall back to a
            // non-atomic delete-then-move (§4.F step 3's documented trade-off).
            std::fs::remove_file(path)?;
        }
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Crash recovery (§6.2): if `path` is missing, promotes `<path>.tmp` (a
/// publish that wrote its new image but never got to rename it in) or else
/// `<path>.bak` (a publish that completed the rename for a prior generation
/// but crashed before cleanup) into place. If `path` exists and a stray
/// `.tmp` is left over from an interrupted publish, it is simply discarded.
pub fn recover(path: &Path) -> BackendResult<()> {
    let tmp_path = sidecar(path, "tmp");
    let bak_path = sidecar(path, "bak");

    if !path.exists() {
        if tmp_path.exists() {
            std::fs::rename(&tmp_path, path)?;
        } else if bak_path.exists() {
            std::fs::rename(&bak_path, path)?;
        }
    } else if tmp_path.exists() {
        std::fs::remove_file(&tmp_path)?;
    }
    Ok(())
}
