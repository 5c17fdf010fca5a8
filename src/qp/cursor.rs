//! Ordered enumeration over a quiescent snapshot of the trie (§4.G.4, §4.I).
//!
//! `enumerate`/`reverse_enumerate` take one root snapshot up front (a single
//! `ArcSwapOption::load_full`) and walk it depth-first; twigs are already
//! stored sorted by bit value, so a plain recursive walk yields ascending (or,
//! reversed, descending) encoded-key order without needing the incremental
//! "record the nearest right sibling" bookkeeping a live `TryGetNext` driver
//! would use to avoid holding the whole trie in memory at once.

use super::node::Node;

pub fn collect_entries<V: Clone>(root: &Option<Node<V>>, reverse: bool) -> Vec<(Vec<u8>, V)> {
    let mut out = Vec::new();
    if let Some(node) = root {
        visit(node, reverse, &mut out);
    }
    out
}

fn visit<V: Clone>(node: &Node<V>, reverse: bool, out: &mut Vec<(Vec<u8>, V)>) {
    match node {
        Node::Leaf(leaf) => out.push((leaf.encoded_key.clone(), leaf.value.clone())),
        Node::Branch(branch) => {
            let state = branch.state.load_full();
            if reverse {
                for child in state.twigs.iter().rev() {
                    visit(child, reverse, out);
                }
            } else {
                for child in state.twigs.iter() {
                    visit(child, reverse, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qp::node::Branch;
    use std::sync::Arc;

    #[test]
    fn test_empty_root_enumerates_nothing() {
        assert!(collect_entries::<i32>(&None, false).is_empty());
    }

    #[test]
    fn test_single_leaf() {
        let root = Some(Node::new_leaf(vec![1], 10));
        assert_eq!(collect_entries(&root, false), vec![(vec![1], 10)]);
    }

    #[test]
    fn test_branch_ascending_then_descending() {
        let a = Node::new_leaf(vec![1], 1);
        let b = Node::new_leaf(vec![9], 2);
        let branch = Node::Branch(Arc::new(Branch::from_two_children(0, a, &[1], b, &[9])));
        let root = Some(branch);
        let ascending = collect_entries(&root, false);
        let mut descending = collect_entries(&root, true);
        descending.reverse();
        assert_eq!(ascending, descending);
        assert_eq!(ascending.len(), 2);
    }
}
