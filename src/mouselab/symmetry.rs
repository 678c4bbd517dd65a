//! Symmetry reduction for belief states over symmetric trees
//!
//! Two strategies collapse belief states that differ only by a permutation of
//! structurally identical sibling subtrees:
//!
//! - [`hash_tree`] folds the tree bottom-up, combining each node's entry hash
//!   with the *sum* of its children's hashes. Summation is order-independent,
//!   so permuted siblings produce the same digest.
//! - [`sort_tree`] rewrites the state itself so that interchangeable sibling
//!   subtrees appear in ascending lexicographic order.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use super::tree::Tree;

/// Digest reserved for the terminal state.
pub fn terminal_hash() -> u64 {
    hash_one("__term_state__")
}

fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Symmetry-breaking digest of per-node entries.
///
/// `entries[i]` is the entry for node `i`; it may be a plain belief or a belief
/// paired with an action-subset flag.
pub fn hash_tree<K: Hash>(tree: &Tree, entries: &[K]) -> u64 {
    fn rec<K: Hash>(tree: &Tree, entries: &[K], node: usize) -> u64 {
        let own = hash_one(&entries[node]);
        let children = tree
            .children(node)
            .iter()
            .fold(0u64, |acc, &child| acc.wrapping_add(rec(tree, entries, child)));
        hash_one(&own.wrapping_add(children))
    }

    rec(tree, entries, 0)
}

/// Canonical reordering of per-node entries.
///
/// Nodes are visited from the last index to the first so that deeper subtrees
/// are already canonical when their parents are sorted. Only children whose
/// subtrees occupy contiguous index ranges and share the same shape are
/// permuted; other nodes are left as they are.
pub fn sort_tree<K: Ord + Clone>(tree: &Tree, entries: &[K]) -> Vec<K> {
    let mut state = entries.to_vec();
    for node in (0..tree.len()).rev() {
        let children = tree.children(node);
        if children.len() < 2 {
            continue;
        }
        let shape = tree.shape(children[0]);
        if children.iter().any(|&child| tree.shape(child) != shape) {
            continue;
        }
        let Some(ranges) = children
            .iter()
            .map(|&child| tree.subtree_range(child))
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };

        let mut blocks: Vec<Vec<K>> = ranges
            .iter()
            .map(|range| state[range.clone()].to_vec())
            .collect();
        blocks.sort();

        let mut slots: Vec<_> = ranges.into_iter().collect();
        slots.sort_by_key(|range| range.start);
        for (range, block) in slots.into_iter().zip(blocks) {
            state[range].clone_from_slice(&block);
        }
    }
    state
}
