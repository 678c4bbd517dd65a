use std::{collections::BTreeMap, collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::blinkered::{ActionSubset, Blinkered};
use crate::{
    Error, Result,
    mouselab::{Belief, MouselabEnv, State, hash_tree, sort_tree, terminal_hash},
};

/// Actions whose Q-value is within this distance of the best are optimal.
pub const TIE_TOLERANCE: f64 = 1e-7;

/// Round to 8 decimal places so that equal values compare equal after
/// floating-point accumulation.
pub fn round8(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}

/// How belief states are reduced before memoization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Canonicalization {
    /// Symmetry-invariant digest; permuted sibling subtrees share an entry.
    #[default]
    HashTree,
    /// Sibling subtrees sorted into a canonical tuple.
    SortTree,
    /// The state as is.
    Identity,
}

impl fmt::Display for Canonicalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Canonicalization::HashTree => "hash-tree",
            Canonicalization::SortTree => "sort-tree",
            Canonicalization::Identity => "identity",
        };
        f.write_str(label)
    }
}

impl FromStr for Canonicalization {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" | "hash-tree" | "hash_tree" => Ok(Canonicalization::HashTree),
            "sort" | "sort-tree" | "sort_tree" => Ok(Canonicalization::SortTree),
            "identity" | "none" => Ok(Canonicalization::Identity),
            _ => Err(Error::ParseOption {
                option: "canonicalization".to_string(),
                input: s.to_string(),
                expected: "hash-tree, sort-tree, identity".to_string(),
            }),
        }
    }
}

/// Memoization key: a canonical belief state paired with the per-node
/// action-subset mask.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Digest(u64),
    Entries(Vec<(Belief, bool)>),
}

/// Call counters for one solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    pub q_calls: u64,
    pub v_calls: u64,
    pub cached_values: usize,
}

/// Optimal decision in one state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    /// Every action tied for the best Q-value, ascending.
    pub max_actions: Vec<usize>,
    pub q_values: BTreeMap<usize, f64>,
}

/// Exact solver for one environment.
///
/// Values are computed lazily by backward induction and memoized for the
/// lifetime of the solver.
#[derive(Debug)]
pub struct Solver<'env> {
    env: &'env MouselabEnv,
    canonicalization: Canonicalization,
    blinkered: Blinkered,
    cache: HashMap<CacheKey, f64>,
    stats: SolverStats,
}

impl<'env> Solver<'env> {
    pub fn new(env: &'env MouselabEnv) -> Self {
        Self {
            env,
            canonicalization: Canonicalization::default(),
            blinkered: Blinkered::default(),
            cache: HashMap::new(),
            stats: SolverStats::default(),
        }
    }

    pub fn with_canonicalization(mut self, canonicalization: Canonicalization) -> Self {
        self.canonicalization = canonicalization;
        self
    }

    pub fn with_blinkered(mut self, blinkered: Blinkered) -> Self {
        self.blinkered = blinkered;
        self
    }

    pub fn env(&self) -> &'env MouselabEnv {
        self.env
    }

    pub fn canonicalization(&self) -> Canonicalization {
        self.canonicalization
    }

    pub fn blinkered(&self) -> Blinkered {
        self.blinkered
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// Expected return of taking `action` in `state` and acting optimally
    /// afterwards (within the blinkered subset the action induces).
    pub fn q(&mut self, state: &State, action: usize) -> Result<f64> {
        self.stats.q_calls += 1;
        let outcomes = self.env.results(state, action)?;
        let subset = self.blinkered.subset(self.env.tree(), action);

        let mut total = 0.0;
        for outcome in &outcomes {
            let future = self.v_with_subset(&outcome.next, subset.as_ref())?;
            total += outcome.probability * (outcome.reward * outcome.scale + future);
        }
        Ok(round8(total))
    }

    /// Optimal value of `state`.
    pub fn v(&mut self, state: &State) -> Result<f64> {
        self.v_with_subset(state, None)
    }

    /// Optimal value of `state` when only actions in `subset` may be taken.
    pub fn v_with_subset(&mut self, state: &State, subset: Option<&ActionSubset>) -> Result<f64> {
        let State::Belief(belief) = state else {
            return Ok(0.0);
        };
        self.env.check_belief(belief)?;
        let key = self.cache_key(state, subset);
        if let Some(value) = self.cache.get(&key) {
            return Ok(*value);
        }
        self.stats.v_calls += 1;

        let mut best: Option<f64> = None;
        for action in self.env.actions(state) {
            if subset.is_some_and(|s| !s.allows(action)) {
                continue;
            }
            let q = self.q(state, action)?;
            best = Some(best.map_or(q, |b| b.max(q)));
        }
        let value = best.unwrap_or(0.0);

        self.cache.insert(key, value);
        self.stats.cached_values = self.cache.len();
        Ok(value)
    }

    /// Every optimal action in `state` together with all Q-values.
    pub fn pi(&mut self, state: &State) -> Result<PolicyRecord> {
        if state.is_terminal() {
            return Ok(PolicyRecord::default());
        }

        let mut q_values = BTreeMap::new();
        for action in self.env.actions(state) {
            q_values.insert(action, self.q(state, action)?);
        }
        let best = q_values.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let max_actions = q_values
            .iter()
            .filter(|(_, q)| (best - **q).abs() < TIE_TOLERANCE)
            .map(|(action, _)| *action)
            .collect();

        Ok(PolicyRecord {
            max_actions,
            q_values,
        })
    }

    /// Memoization key of `state` under the active canonicalization.
    ///
    /// The terminal state always maps to the reserved terminal digest.
    pub fn cache_key(&self, state: &State, subset: Option<&ActionSubset>) -> CacheKey {
        let State::Belief(belief) = state else {
            return CacheKey::Digest(terminal_hash());
        };
        let entries: Vec<(Belief, bool)> = belief
            .entries()
            .iter()
            .enumerate()
            .map(|(node, entry)| (entry.clone(), subset.is_none_or(|s| s.allows(node))))
            .collect();
        let tree = self.env.tree();
        match self.canonicalization {
            Canonicalization::HashTree => CacheKey::Digest(hash_tree(tree, &entries)),
            Canonicalization::SortTree => CacheKey::Entries(sort_tree(tree, &entries)),
            Canonicalization::Identity => CacheKey::Entries(entries),
        }
    }

    /// Drop every memoized value and reset the counters.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.stats = SolverStats::default();
    }
}
