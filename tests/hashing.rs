//! Tests for symmetry reduction on the 3-1-2 tree.

use std::collections::BTreeSet;

use mouselab::{
    Belief, BeliefState, MouselabEnv, Registry, Solver,
    exact::{CacheKey, Canonicalization},
    mouselab::{EnvOptions, GroundTruth, State, hash_tree, sort_tree, terminal_hash},
};

fn high_increasing() -> MouselabEnv {
    let registry = Registry::standard().expect("standard registry");
    MouselabEnv::new_symmetric_registered(
        "high_increasing",
        &registry,
        EnvOptions::new().with_ground_truth(GroundTruth::Omitted),
    )
    .expect("high_increasing environment")
}

fn revealed_at(env: &MouselabEnv, node: usize, value: f64) -> BeliefState {
    env.init().with_revealed(node, value)
}

#[test]
fn identical_distributions_collapse() {
    let env = high_increasing();
    let unique: BTreeSet<&Belief> = env.init().entries().iter().collect();
    assert_eq!(unique.len(), 4, "root plus one distribution per depth");
}

#[test]
fn sibling_leaves_hash_equal() {
    let env = high_increasing();
    let a = revealed_at(&env, 12, 48.0);
    let b = revealed_at(&env, 11, 48.0);
    assert_eq!(
        hash_tree(env.tree(), a.entries()),
        hash_tree(env.tree(), b.entries())
    );
    assert_eq!(
        sort_tree(env.tree(), a.entries()),
        sort_tree(env.tree(), b.entries())
    );
}

#[test]
fn leaves_in_different_branches_hash_equal() {
    let env = high_increasing();
    let a = revealed_at(&env, 3, -24.0);
    let b = revealed_at(&env, 8, -24.0);
    assert_eq!(
        hash_tree(env.tree(), a.entries()),
        hash_tree(env.tree(), b.entries())
    );
}

#[test]
fn different_depths_hash_differently() {
    let env = high_increasing();
    let leaf = revealed_at(&env, 3, 4.0);
    let middle = revealed_at(&env, 2, 4.0);
    assert_ne!(
        hash_tree(env.tree(), leaf.entries()),
        hash_tree(env.tree(), middle.entries())
    );
    assert_ne!(
        sort_tree(env.tree(), leaf.entries()),
        sort_tree(env.tree(), middle.entries())
    );
}

#[test]
fn solver_keys_follow_canonicalization() {
    let env = high_increasing();
    let a = State::Belief(revealed_at(&env, 4, 24.0));
    let b = State::Belief(revealed_at(&env, 12, 24.0));

    let hashed = Solver::new(&env);
    assert!(matches!(hashed.cache_key(&a, None), CacheKey::Digest(_)));
    assert_eq!(hashed.cache_key(&a, None), hashed.cache_key(&b, None));

    let sorted = Solver::new(&env).with_canonicalization(Canonicalization::SortTree);
    assert_eq!(sorted.cache_key(&a, None), sorted.cache_key(&b, None));

    let identity = Solver::new(&env).with_canonicalization(Canonicalization::Identity);
    assert_ne!(identity.cache_key(&a, None), identity.cache_key(&b, None));
}

#[test]
fn terminal_digest_is_distinct_and_stable() {
    let env = high_increasing();
    assert_eq!(terminal_hash(), terminal_hash());
    assert_ne!(terminal_hash(), hash_tree(env.tree(), env.init().entries()));
}
