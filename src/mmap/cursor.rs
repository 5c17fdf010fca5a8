//! Ordered enumeration over a published [`State`] (§4.I).
//!
//! A node's own value sorts immediately before its children's values in
//! ascending order (a prefix is lexicographically smaller than anything it
//! prefixes) and immediately after them in descending order.

use super::layout::Node;
use super::state::State;
use crate::error::BackendResult;

pub fn collect_entries(state: &State, reverse: bool) -> BackendResult<Vec<(Vec<u8>, Vec<u8>)>> {
    let mut out = Vec::new();
    let root = state.root()?;
    let mut path = Vec::new();
    visit(state, &root, &mut path, reverse, &mut out)?;
    Ok(out)
}

fn visit(
    state: &State,
    node: &Node,
    path: &mut Vec<u8>,
    reverse: bool,
    out: &mut Vec<(Vec<u8>, Vec<u8>)>,
) -> BackendResult<()> {
    if !reverse {
        emit(state, node, path, out)?;
    }

    let mut children = state.children(node)?;
    if reverse {
        children.reverse();
    }
    for (_, child) in &children {
        path.push(child.label_id as u8);
        visit(state, child, path, reverse, out)?;
        path.pop();
    }

    if reverse {
        emit(state, node, path, out)?;
    }
    Ok(())
}

fn emit(state: &State, node: &Node, path: &[u8], out: &mut Vec<(Vec<u8>, Vec<u8>)>) -> BackendResult<()> {
    if let Some(value) = state.value(node)? {
        out.push((path.to_vec(), value.to_vec()));
    }
    Ok(())
}
