//! Enumeration of reachable belief states and state-action pairs.
//!
//! A state reachable from the initial beliefs is fixed by a ground truth (one
//! outcome per node) and the set of nodes still hidden. Enumerating every
//! ground truth against every hidden subset covers the whole state space, with
//! heavy duplication that [`deduplicate_states`] removes.

use std::{collections::BTreeMap, fs, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    distributions::{cmp_values, value_bits},
    mouselab::{Belief, BeliefState, EnvOptions, GroundTruth, MouselabEnv, Registry},
};

/// Default stand-in for hidden entries while deduplicating.
pub const DEFAULT_SENTINEL: f64 = 0.0;

/// A belief state paired with an action valid in it.
pub type StateAction = (BeliefState, usize);

/// States reachable for one ground truth: one per subset of non-root nodes
/// left hidden, taken from `unrevealed`; every other node shows its true
/// value.
pub fn possible_states_for_ground_truth(
    ground_truth: &[f64],
    unrevealed: &BeliefState,
) -> Result<Vec<BeliefState>> {
    let n = unrevealed.len();
    if ground_truth.len() != n {
        return Err(Error::config(format!(
            "ground truth has {} values for a state of {} nodes",
            ground_truth.len(),
            n
        )));
    }
    if n == 0 {
        return Ok(Vec::new());
    }
    if n - 1 >= usize::BITS as usize {
        return Err(Error::config(format!("{n} nodes is too many to enumerate")));
    }

    let subsets = 1usize << (n - 1);
    let mut states = Vec::with_capacity(subsets);
    for subset in 0..subsets {
        let entries = (0..n)
            .map(|node| {
                let hidden = node > 0 && subset & (1 << (node - 1)) != 0;
                if hidden {
                    unrevealed.entries()[node].clone()
                } else {
                    Belief::Revealed(ground_truth[node])
                }
            })
            .collect();
        states.push(BeliefState::new(entries));
    }
    Ok(states)
}

/// Lazy Cartesian product of per-node outcome values, last node varying
/// fastest.
#[derive(Debug, Clone)]
pub struct GroundTruths {
    values: Vec<Vec<f64>>,
    cursor: Option<Vec<usize>>,
}

impl GroundTruths {
    pub fn new(values: Vec<Vec<f64>>) -> Self {
        let cursor = if values.iter().any(Vec::is_empty) {
            None
        } else {
            Some(vec![0; values.len()])
        };
        Self { values, cursor }
    }

    /// Number of ground truths the iterator yields in total.
    pub fn total(&self) -> usize {
        self.values.iter().map(Vec::len).product()
    }
}

impl Iterator for GroundTruths {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        let item = cursor
            .iter()
            .zip(&self.values)
            .map(|(&idx, vals)| vals[idx])
            .collect();

        let mut exhausted = true;
        for position in (0..cursor.len()).rev() {
            cursor[position] += 1;
            if cursor[position] < self.values[position].len() {
                exhausted = false;
                break;
            }
            cursor[position] = 0;
        }
        if exhausted {
            self.cursor = None;
        }
        Some(item)
    }
}

/// Every ground truth consistent with the environment's initial beliefs.
pub fn all_possible_ground_truths(env: &MouselabEnv) -> GroundTruths {
    GroundTruths::new(env.init().entries().iter().map(Belief::outcomes).collect())
}

/// Reachable states for each of the given ground truths, concatenated.
pub fn possible_states_for_ground_truths<I>(
    env: &MouselabEnv,
    ground_truths: I,
) -> Result<Vec<BeliefState>>
where
    I: IntoIterator,
    I::Item: AsRef<[f64]>,
{
    let unrevealed = env.init();
    let mut states = Vec::new();
    for ground_truth in ground_truths {
        states.extend(possible_states_for_ground_truth(ground_truth.as_ref(), unrevealed)?);
    }
    Ok(states)
}

/// Every reachable state, with duplicates.
pub fn all_possible_states(env: &MouselabEnv) -> Result<Vec<BeliefState>> {
    possible_states_for_ground_truths(env, all_possible_ground_truths(env))
}

/// Remove duplicate states.
///
/// Hidden entries are replaced by `sentinel` for comparison; the first state
/// of each distinct substituted row is kept and rows come back in ascending
/// order of their substituted values.
///
/// # Errors
///
/// Returns [`Error::SentinelCollision`] if any hidden distribution can
/// produce `sentinel` or any non-root node already shows it.
pub fn deduplicate_states(states: Vec<BeliefState>, sentinel: f64) -> Result<Vec<BeliefState>> {
    let raw = states.len();
    let mut unique: BTreeMap<SubstitutedRow, BeliefState> = BTreeMap::new();
    for state in states {
        for (node, belief) in state.entries().iter().enumerate().skip(1) {
            let collides = match belief {
                Belief::Hidden(dist) => dist.contains(sentinel),
                Belief::Revealed(value) => value_bits(*value) == value_bits(sentinel),
            };
            if collides {
                return Err(Error::SentinelCollision { sentinel, node });
            }
        }
        let row = SubstitutedRow(
            state
                .entries()
                .iter()
                .map(|belief| belief.revealed_value().unwrap_or(sentinel))
                .collect(),
        );
        unique.entry(row).or_insert(state);
    }

    debug!("{raw} states deduplicated, reduced to {}", unique.len());
    Ok(unique.into_values().collect())
}

/// Row of revealed values with hidden entries substituted, ordered
/// lexicographically.
#[derive(Debug, Clone)]
struct SubstitutedRow(Vec<f64>);

impl PartialEq for SubstitutedRow {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|(a, b)| value_bits(*a) == value_bits(*b))
    }
}

impl Eq for SubstitutedRow {}

impl PartialOrd for SubstitutedRow {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SubstitutedRow {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| cmp_values(*a, *b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| self.0.len().cmp(&other.0.len()))
    }
}

/// Each state paired with its hidden nodes and the terminal action.
pub fn sa_pairs_from_states(states: &[BeliefState]) -> Vec<StateAction> {
    let mut pairs = Vec::new();
    for state in states {
        for action in state.hidden_nodes().chain(std::iter::once(state.len())) {
            pairs.push((state.clone(), action));
        }
    }
    pairs
}

/// Every distinct reachable (state, action) pair.
pub fn all_possible_sa_pairs(env: &MouselabEnv, sentinel: f64) -> Result<Vec<StateAction>> {
    let states = deduplicate_states(all_possible_states(env)?, sentinel)?;
    Ok(sa_pairs_from_states(&states))
}

/// Number of actions in a symmetric environment with `branching`: one per
/// non-root node plus termination.
pub fn num_actions(branching: &[usize]) -> usize {
    let mut total = 0;
    let mut level = 1;
    for &fan_out in branching {
        level *= fan_out;
        total += level;
    }
    total + 1
}

/// Trial record in a ground truth file. Other fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthRecord {
    #[serde(rename = "stateRewards")]
    pub state_rewards: Vec<f64>,
}

/// Read the `stateRewards` of every trial in a JSON ground truth file.
pub fn load_ground_truths(path: impl AsRef<Path>) -> Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::Io {
        operation: format!("read ground truths from {}", path.display()),
        source,
    })?;
    let records: Vec<GroundTruthRecord> = serde_json::from_slice(&bytes)?;
    Ok(records.into_iter().map(|record| record.state_rewards).collect())
}

/// Deduplicated states reachable from the trials in a ground truth file,
/// using the initial beliefs of the registered `setting`.
pub fn states_from_ground_truth_file(
    path: impl AsRef<Path>,
    setting: &str,
    registry: &Registry,
    sentinel: f64,
) -> Result<Vec<BeliefState>> {
    let ground_truths = load_ground_truths(path)?;
    let setting = registry.get(setting)?;
    let env = MouselabEnv::new_symmetric(
        &setting.branching,
        &setting.reward,
        EnvOptions::new().with_ground_truth(GroundTruth::Omitted),
    )?;
    let states = possible_states_for_ground_truths(&env, &ground_truths)?;
    deduplicate_states(states, sentinel)
}
