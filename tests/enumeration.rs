//! Tests for state enumeration and its agreement with the built tables.

mod common;

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
};

use common::{MEDIUM, SMALL, solver_env, test_registry};
use mouselab::{
    BeliefState, Error, Solver,
    dictionary::{construct_partial_q_dictionary, construct_pi_dictionary, construct_q_dictionary},
    enumeration::{
        DEFAULT_SENTINEL, all_possible_ground_truths, all_possible_sa_pairs, all_possible_states,
        deduplicate_states, load_ground_truths, num_actions, possible_states_for_ground_truths,
        states_from_ground_truth_file,
    },
};
use tempfile::TempDir;

fn substituted(state: &BeliefState, sentinel: f64) -> Vec<f64> {
    state
        .entries()
        .iter()
        .map(|belief| belief.revealed_value().unwrap_or(sentinel))
        .collect()
}

fn bits(row: &[f64]) -> Vec<u64> {
    row.iter().map(|value| value.to_bits()).collect()
}

fn revealed_bits(state: &BeliefState) -> Vec<Option<u64>> {
    state
        .entries()
        .iter()
        .map(|belief| belief.revealed_value().map(f64::to_bits))
        .collect()
}

#[test]
fn q_dictionary_keys_are_all_state_action_pairs() {
    for name in [SMALL, MEDIUM] {
        let env = solver_env(name);
        let pairs: BTreeSet<(BeliefState, usize)> = all_possible_sa_pairs(&env, DEFAULT_SENTINEL)
            .expect("enumerate pairs")
            .into_iter()
            .collect();

        let mut solver = Solver::new(&env);
        let table = construct_q_dictionary(&mut solver, DEFAULT_SENTINEL).expect("q table");
        let keys: BTreeSet<(BeliefState, usize)> = table
            .iter()
            .map(|(state, action, _)| (state.clone(), action))
            .collect();

        assert_eq!(keys, pairs, "table keys differ from enumerated pairs for {name}");
    }
}

#[test]
fn small_case_counts() {
    let env = solver_env(SMALL);
    assert_eq!(all_possible_ground_truths(&env).total(), 2 * 2);

    let raw = all_possible_states(&env).expect("raw states");
    assert_eq!(raw.len(), 4 * 8);
    let unique = deduplicate_states(raw, DEFAULT_SENTINEL).expect("dedup");
    assert_eq!(unique.len(), 18);

    let pairs = all_possible_sa_pairs(&env, DEFAULT_SENTINEL).expect("pairs");
    assert_eq!(pairs.len(), 39);
}

#[test]
fn policy_table_covers_every_state() {
    let env = solver_env(SMALL);
    let mut solver = Solver::new(&env);
    let table = construct_pi_dictionary(&mut solver, DEFAULT_SENTINEL).expect("policy table");
    assert_eq!(table.len(), 18);

    let record = table.get(env.init()).expect("initial state present");
    assert_eq!(record.max_actions, vec![2, 3]);
}

#[test]
fn sentinel_matching_a_revealed_value_is_rejected() {
    let env = solver_env(SMALL);
    let raw = all_possible_states(&env).expect("raw states");
    let err = deduplicate_states(raw, 60.0).unwrap_err();
    assert!(matches!(err, Error::SentinelCollision { .. }));
}

#[test]
fn action_count_for_standard_tree() {
    assert_eq!(num_actions(&[3, 1, 2]), 13);
    let registry = test_registry();
    let setting = registry.get("high_increasing").expect("preset");
    assert_eq!(num_actions(&setting.branching), 13);
}

#[test]
fn ground_truth_file_ignores_other_fields() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("trials.json");
    fs::write(
        &path,
        r#"[
            {"trial_id": 7, "stateRewards": [0, -500, 60, -60], "stateLabels": []},
            {"stateRewards": [0, -500, -60, -60]}
        ]"#,
    )
    .expect("write trials");

    let ground_truths = load_ground_truths(&path).expect("load trials");
    assert_eq!(
        ground_truths,
        vec![vec![0.0, -500.0, 60.0, -60.0], vec![0.0, -500.0, -60.0, -60.0]]
    );

    let states = states_from_ground_truth_file(&path, SMALL, &test_registry(), DEFAULT_SENTINEL)
        .expect("states from file");
    let once = states_from_ground_truth_file(&path, SMALL, &test_registry(), DEFAULT_SENTINEL)
        .expect("states from file");
    assert_eq!(states, once);
    assert!(states.len() < 16, "trials share their fully hidden states");
    assert!(states.contains(solver_env(SMALL).init()));
}

#[test]
fn partial_table_follows_ground_truths() {
    let env = solver_env(SMALL);
    let mut solver = Solver::new(&env);
    let ground_truths = vec![vec![0.0, -500.0, 60.0, -60.0]];
    let table = construct_partial_q_dictionary(&mut solver, &ground_truths).expect("partial q");
    assert_eq!(table.len(), 20);
    assert_eq!(table.get(env.init(), 1), Some(-472.0));
}

#[test]
fn missing_ground_truth_file_is_an_io_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let err = load_ground_truths(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn dedup_keeps_first_raw_row_of_each_pattern() {
    let env = solver_env(MEDIUM);
    let raw = all_possible_states(&env).expect("raw states");

    let mut first_seen: BTreeMap<Vec<u64>, &BeliefState> = BTreeMap::new();
    for state in &raw {
        first_seen
            .entry(bits(&substituted(state, DEFAULT_SENTINEL)))
            .or_insert(state);
    }

    let unique = deduplicate_states(raw.clone(), DEFAULT_SENTINEL).expect("dedup");
    assert_eq!(unique.len(), first_seen.len());
    for state in &unique {
        let pattern = bits(&substituted(state, DEFAULT_SENTINEL));
        let kept = first_seen[&pattern];
        assert_eq!(state, kept);
        assert_eq!(revealed_bits(state), revealed_bits(kept));
    }

    let rows: Vec<Vec<f64>> = unique
        .iter()
        .map(|state| substituted(state, DEFAULT_SENTINEL))
        .collect();
    assert!(rows.windows(2).all(|pair| pair[0] < pair[1]), "rows ascend");
}

#[test]
fn revealed_sentinel_in_ground_truth_is_rejected() {
    let env = solver_env(SMALL);
    let ground_truths = vec![vec![0.0, -500.0, 0.0, 60.0]];
    let states = possible_states_for_ground_truths(&env, &ground_truths)
        .expect("states for ground truth");
    let err = deduplicate_states(states, DEFAULT_SENTINEL).unwrap_err();
    assert!(matches!(err, Error::SentinelCollision { node: 2, .. }));
}
