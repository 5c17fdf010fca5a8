//! Lock-free lookup/insert/delete over the node types in [`super::node`] (§4.G.1-3).
//!
//! Every structural change is a single CAS on exactly one [`arc_swap::ArcSwap`]
//! — either the trie's root or one branch's state — built with [`ArcSwap::rcu`],
//! which retries the supplied closure itself on a lost race. The surrounding
//! `loop` in [`Trie::set`]/[`Trie::delete`] handles races that change the
//! *shape* of the tree out from under an in-flight operation (a concurrent
//! delete collapsing the very branch this operation meant to grow), which a
//! single `rcu` can't detect on its own.

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use super::bitmap;
use super::node::{Branch, BranchState, Node};

pub struct Trie<V> {
    pub root: ArcSwapOption<Node<V>>,
    pub count: AtomicUsize,
}

fn same_node<V>(a: &Node<V>, b: &Node<V>) -> bool {
    match (a, b) {
        (Node::Leaf(x), Node::Leaf(y)) => Arc::ptr_eq(x, y),
        (Node::Branch(x), Node::Branch(y)) => Arc::ptr_eq(x, y),
        _ => false,
    }
}

/// The twig at the other slot of a 2-child branch state, or `None` if it no
/// longer has exactly two children (a concurrent change raced us).
fn other_of_two<V: Clone>(state: &BranchState<V>, bit: u8) -> Option<Node<V>> {
    if state.twigs.len() != 2 {
        return None;
    }
    let idx = bitmap::slot_index(state.bitmap, bit);
    state.twigs.get(1 - idx).cloned()
}

struct NearDescent<V> {
    leaf_key: Vec<u8>,
    parent: Option<(Arc<Branch<V>>, u8)>,
}

/// `NearTwig` descent (§4.G.2 step 2): follows `key`'s bits, falling back to
/// slot 0 at any branch where the bit is absent, and returns whichever leaf
/// it lands on plus the parent chain that led there.
fn near_descend<V: Clone>(root: &Node<V>, key: &[u8]) -> NearDescent<V> {
    let mut current = root.clone();
    let mut parent = None;
    loop {
        match current {
            Node::Leaf(leaf) => return NearDescent { leaf_key: leaf.encoded_key.clone(), parent },
            Node::Branch(branch) => {
                let bit = bitmap::symbol_at(key, branch.key_offset);
                let state = branch.state.load_full();
                let next = state.near(bit).clone();
                parent = Some((Arc::clone(&branch), bit));
                current = next;
            }
        }
    }
}

impl<V: Clone> Trie<V> {
    pub fn new() -> Self {
        Self { root: ArcSwapOption::from(None), count: AtomicUsize::new(0) }
    }

    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.root.store(None);
        self.count.store(0, Ordering::SeqCst);
    }

    /// §4.G.1.
    pub fn lookup(&self, key: &[u8]) -> Option<V> {
        let mut current: Node<V> = (*self.root.load_full()?).clone();
        loop {
            match current {
                Node::Leaf(leaf) => return (leaf.encoded_key == key).then(|| leaf.value.clone()),
                Node::Branch(branch) => {
                    let bit = bitmap::symbol_at(key, branch.key_offset);
                    let state = branch.state.load_full();
                    current = state.get(bit)?.clone();
                }
            }
        }
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.lookup(key).is_some()
    }

    /// §4.G.2. Returns `true` if `key` was newly inserted, `false` if an
    /// existing entry was updated in place.
    pub fn set(&self, key: &[u8], value: V) -> bool {
        loop {
            let Some(root_arc) = self.root.load_full() else {
                let outcome: Cell<Option<bool>> = Cell::new(None);
                self.root.rcu(|current: &Option<Arc<Node<V>>>| -> Option<Arc<Node<V>>> {
                    match current {
                        Some(_) => {
                            outcome.set(None);
                            current.clone()
                        }
                        None => {
                            outcome.set(Some(true));
                            Some(Arc::new(Node::new_leaf(key.to_vec(), value.clone())))
                        }
                    }
                });
                match outcome.get() {
                    Some(inserted) => {
                        self.count.fetch_add(1, Ordering::AcqRel);
                        return inserted;
                    }
                    None => continue,
                }
            };

            let root_node = (*root_arc).clone();
            let descent = near_descend(&root_node, key);

            match bitmap::first_diff_offset(key, &descent.leaf_key) {
                None => {
                    // Identical key already present: single-CAS update.
                    match descent.parent {
                        None => {
                            let outcome = Cell::new(false);
                            self.root.rcu(|current: &Option<Arc<Node<V>>>| -> Option<Arc<Node<V>>> {
                                match current.as_deref() {
                                    Some(Node::Leaf(leaf)) if leaf.encoded_key == key => {
                                        outcome.set(true);
                                        Some(Arc::new(Node::new_leaf(key.to_vec(), value.clone())))
                                    }
                                    _ => {
                                        outcome.set(false);
                                        current.clone()
                                    }
                                }
                            });
                            if outcome.get() {
                                return false;
                            }
                        }
                        Some((branch, bit)) => {
                            let outcome = Cell::new(false);
                            branch.state.rcu(|state: &Arc<BranchState<V>>| -> Arc<BranchState<V>> {
                                if state.get(bit).is_some() {
                                    outcome.set(true);
                                    Arc::new(state.with_replaced(bit, Node::new_leaf(key.to_vec(), value.clone())))
                                } else {
                                    outcome.set(false);
                                    Arc::clone(state)
                                }
                            });
                            if outcome.get() {
                                return false;
                            }
                        }
                    }
                }
                Some(diff_off) => {
                    if self.insert_at(&root_node, key, &value, diff_off) {
                        return true;
                    }
                }
            }
            // Any miss above falls through to retry the whole operation.
        }
    }

    /// §4.G.2 step 5: second, exact descent to the precise insertion point,
    /// then a single CAS there (GROW an existing branch, or split a leaf /
    /// subtree into a fresh two-child branch).
    fn insert_at(&self, root_node: &Node<V>, key: &[u8], value: &V, diff_off: usize) -> bool {
        let mut current = root_node.clone();
        let mut parent: Option<(Arc<Branch<V>>, u8)> = None;

        loop {
            match current {
                Node::Leaf(_) => break,
                Node::Branch(ref branch) => {
                    if branch.key_offset >= diff_off {
                        break;
                    }
                    let bit = bitmap::symbol_at(key, branch.key_offset);
                    let state = branch.state.load_full();
                    match state.get(bit) {
                        Some(child) => {
                            let next = child.clone();
                            parent = Some((Arc::clone(branch), bit));
                            current = next;
                        }
                        None => break,
                    }
                }
            }
        }

        if let Node::Branch(ref branch) = current {
            if branch.key_offset == diff_off {
                let target_bit = bitmap::symbol_at(key, branch.key_offset);
                let outcome = Cell::new(false);
                branch.state.rcu(|state: &Arc<BranchState<V>>| -> Arc<BranchState<V>> {
                    if state.get(target_bit).is_some() {
                        outcome.set(false);
                        Arc::clone(state)
                    } else {
                        outcome.set(true);
                        Arc::new(state.with_inserted(target_bit, Node::new_leaf(key.to_vec(), value.clone())))
                    }
                });
                if outcome.get() {
                    self.count.fetch_add(1, Ordering::AcqRel);
                }
                return outcome.get();
            }
        }

        let existing_key = current.near_encoded_key(key);
        let outcome = Cell::new(false);
        match parent {
            None => {
                self.root.rcu(|root_current: &Option<Arc<Node<V>>>| -> Option<Arc<Node<V>>> {
                    match root_current {
                        Some(arc) if same_node(arc, &current) => {
                            outcome.set(true);
                            let new_leaf = Node::new_leaf(key.to_vec(), value.clone());
                            Some(Arc::new(Node::Branch(Arc::new(Branch::from_two_children(
                                diff_off,
                                current.clone(),
                                &existing_key,
                                new_leaf,
                                key,
                            )))))
                        }
                        other => {
                            outcome.set(false);
                            other.clone()
                        }
                    }
                });
            }
            Some((parent_branch, bit)) => {
                parent_branch.state.rcu(|state: &Arc<BranchState<V>>| -> Arc<BranchState<V>> {
                    match state.get(bit) {
                        Some(existing) if same_node(existing, &current) => {
                            outcome.set(true);
                            let new_leaf = Node::new_leaf(key.to_vec(), value.clone());
                            let new_branch = Node::Branch(Arc::new(Branch::from_two_children(
                                diff_off,
                                current.clone(),
                                &existing_key,
                                new_leaf,
                                key,
                            )));
                            Arc::new(state.with_replaced(bit, new_branch))
                        }
                        _ => {
                            outcome.set(false);
                            Arc::clone(state)
                        }
                    }
                });
            }
        }
        if outcome.get() {
            self.count.fetch_add(1, Ordering::AcqRel);
        }
        outcome.get()
    }

    /// §4.G.3. Strict (non-NearTwig) descent; three cases once the leaf is found.
    pub fn delete(&self, key: &[u8]) -> Option<V> {
        loop {
            self.root.load_full()?;
            let root_node: Node<V> = (*self.root.load_full().unwrap()).clone();

            let mut current = root_node;
            let mut parent: Option<(Arc<Branch<V>>, u8)> = None;
            let mut grandparent: Option<(Arc<Branch<V>>, u8)> = None;

            loop {
                match current {
                    Node::Leaf(_) => break,
                    Node::Branch(ref branch) => {
                        let bit = bitmap::symbol_at(key, branch.key_offset);
                        let state = branch.state.load_full();
                        match state.get(bit) {
                            Some(child) => {
                                let next = child.clone();
                                grandparent = parent.take();
                                parent = Some((Arc::clone(branch), bit));
                                current = next;
                            }
                            None => return None,
                        }
                    }
                }
            }

            let Node::Leaf(leaf) = current else { unreachable!("loop only exits on a Leaf") };
            if leaf.encoded_key != key {
                return None;
            }
            let removed_value = leaf.value.clone();
            let outcome = Cell::new(false);

            match parent {
                None => {
                    self.root.rcu(|root_current: &Option<Arc<Node<V>>>| -> Option<Arc<Node<V>>> {
                        match root_current.as_deref() {
                            Some(Node::Leaf(l)) if l.encoded_key == key => {
                                outcome.set(true);
                                None
                            }
                            _ => {
                                outcome.set(false);
                                root_current.clone()
                            }
                        }
                    });
                }
                Some((parent_branch, parent_bit)) => {
                    let parent_state = parent_branch.state.load_full();
                    if parent_state.twigs.len() <= 2 {
                        let Some(sibling) = other_of_two(&parent_state, parent_bit) else {
                            continue;
                        };
                        match &grandparent {
                            None => {
                                self.root.rcu(|root_current: &Option<Arc<Node<V>>>| -> Option<Arc<Node<V>>> {
                                    match root_current {
                                        Some(arc) if same_node(arc, &Node::Branch(Arc::clone(&parent_branch))) => {
                                            outcome.set(true);
                                            Some(Arc::new(sibling.clone()))
                                        }
                                        other => {
                                            outcome.set(false);
                                            other.clone()
                                        }
                                    }
                                });
                            }
                            Some((gp_branch, gp_bit)) => {
                                gp_branch.state.rcu(|state: &Arc<BranchState<V>>| -> Arc<BranchState<V>> {
                                    match state.get(*gp_bit) {
                                        Some(existing) if same_node(existing, &Node::Branch(Arc::clone(&parent_branch))) => {
                                            outcome.set(true);
                                            Arc::new(state.with_replaced(*gp_bit, sibling.clone()))
                                        }
                                        _ => {
                                            outcome.set(false);
                                            Arc::clone(state)
                                        }
                                    }
                                });
                            }
                        }
                    } else {
                        parent_branch.state.rcu(|state: &Arc<BranchState<V>>| -> Arc<BranchState<V>> {
                            if state.get(parent_bit).is_some() {
                                outcome.set(true);
                                Arc::new(state.with_removed(parent_bit))
                            } else {
                                outcome.set(false);
                                Arc::clone(state)
                            }
                        });
                    }
                }
            }

            if outcome.get() {
                self.count.fetch_sub(1, Ordering::AcqRel);
                return Some(removed_value);
            }
        }
    }
}

impl<V: Clone> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}
