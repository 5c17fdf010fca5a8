//! Bulk builder: sort + recursive partition construction (§4.G.5).

use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::bitmap;
use super::node::{Branch, Node};
use super::trie::Trie;

/// Builds a trie from `items` (already encoded `(key, value)` pairs). Later
/// duplicates of the same key win. Small inputs just call [`Trie::set`]
/// repeatedly; larger ones sort, dedup, and build the tree directly in one
/// top-down pass instead of paying for per-key CAS retries.
pub fn build<V: Clone>(items: Vec<(Vec<u8>, V)>) -> Trie<V> {
    let trie = Trie::new();
    if items.len() <= 16 {
        for (key, value) in items {
            trie.set(&key, value);
        }
        return trie;
    }

    let mut sorted = items;
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let mut deduped: Vec<(Vec<u8>, V)> = Vec::with_capacity(sorted.len());
    for (key, value) in sorted {
        if deduped.last().is_some_and(|(k, _)| *k == key) {
            deduped.pop();
        }
        deduped.push((key, value));
    }

    let count = deduped.len();
    if let Some(root) = build_subtree(&deduped) {
        trie.root.store(Some(Arc::new(root)));
    }
    trie.count.store(count, Ordering::Release);
    trie
}

fn build_subtree<V: Clone>(items: &[(Vec<u8>, V)]) -> Option<Node<V>> {
    match items {
        [] => None,
        [(key, value)] => Some(Node::new_leaf(key.clone(), value.clone())),
        _ => {
            let split_offset = find_split_offset(items);

            let mut groups: Vec<(u8, Vec<(Vec<u8>, V)>)> = Vec::new();
            for (key, value) in items {
                let bit = bitmap::symbol_at(key, split_offset);
                match groups.last_mut() {
                    Some((last_bit, bucket)) if *last_bit == bit => bucket.push((key.clone(), value.clone())),
                    _ => groups.push((bit, vec![(key.clone(), value.clone())])),
                }
            }
            groups.sort_by_key(|(bit, _)| *bit);

            let mut bits = 0u64;
            let mut twigs = Vec::with_capacity(groups.len());
            for (bit, bucket) in groups {
                bits |= 1u64 << bit;
                twigs.push(build_subtree(&bucket).expect("bucket is non-empty by construction"));
            }
            Some(Node::Branch(Arc::new(Branch::from_split(split_offset, bits, twigs))))
        }
    }
}

/// The smallest offset at which not every item agrees (§4.G.5).
fn find_split_offset<V>(items: &[(Vec<u8>, V)]) -> usize {
    let first = &items[0].0;
    let max_len = items.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let bound = 2 * max_len + 2;
    (0..bound)
        .find(|&offset| {
            let symbol = bitmap::symbol_at(first, offset);
            items.iter().any(|(k, _)| bitmap::symbol_at(k, offset) != symbol)
        })
        .unwrap_or(bound)
}
