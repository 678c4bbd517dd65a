//! Configuration types for solving environments.

use crate::{
    dictionary::TableKind,
    enumeration::DEFAULT_SENTINEL,
    exact::{Blinkered, Canonicalization},
    mouselab::{EnvOptions, GroundTruth, TermReward},
};

/// Configuration for one solve run.
///
/// # Examples
///
/// ```
/// use mouselab::app::SolveConfig;
/// use mouselab::dictionary::TableKind;
/// use mouselab::exact::{Blinkered, Canonicalization};
///
/// let config = SolveConfig::new()
///     .with_canonicalization(Canonicalization::SortTree)
///     .with_blinkered(Blinkered::Branch)
///     .with_table(TableKind::Policy)
///     .with_cost(0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SolveConfig {
    /// State reduction applied before memoization
    pub canonicalization: Canonicalization,
    /// Continuation restriction after each reveal
    pub blinkered: Blinkered,
    /// Table to build after solving, if any
    pub table: Option<TableKind>,
    /// Stand-in for hidden entries while deduplicating states
    pub sentinel: f64,
    /// Flat inspection cost per reveal
    pub cost: f64,
    /// Payout on termination
    pub term_reward: TermReward,
    /// Fraction of trials whose termination payout is rewarded
    pub pct_reward: f64,
    /// Seed for sampling a ground truth; none means no ground truth
    pub ground_truth_seed: Option<u64>,
}

impl SolveConfig {
    /// Defaults: hash-tree canonicalization, no blinkering, no table, sentinel
    /// 0, cost 1, expected termination reward, every trial rewarded, no
    /// ground truth.
    pub fn new() -> Self {
        Self {
            canonicalization: Canonicalization::default(),
            blinkered: Blinkered::default(),
            table: None,
            sentinel: DEFAULT_SENTINEL,
            cost: 1.0,
            term_reward: TermReward::default(),
            pct_reward: 1.0,
            ground_truth_seed: None,
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

    pub fn with_table(mut self, table: TableKind) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_sentinel(mut self, sentinel: f64) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_term_reward(mut self, term_reward: TermReward) -> Self {
        self.term_reward = term_reward;
        self
    }

    pub fn with_pct_reward(mut self, pct_reward: f64) -> Self {
        self.pct_reward = pct_reward;
        self
    }

    pub fn with_ground_truth_seed(mut self, seed: u64) -> Self {
        self.ground_truth_seed = Some(seed);
        self
    }

    /// Environment options implied by this configuration.
    pub fn env_options(&self) -> EnvOptions {
        let ground_truth = match self.ground_truth_seed {
            Some(seed) => GroundTruth::Seeded(seed),
            None => GroundTruth::Omitted,
        };
        EnvOptions::new()
            .with_cost(self.cost)
            .with_term_reward(self.term_reward)
            .with_pct_reward(self.pct_reward)
            .with_ground_truth(ground_truth)
    }
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self::new()
    }
}
