//! The Mouselab decision process.
//!
//! An environment is a reward tree whose nodes start hidden. Revealing a node
//! costs an inspection fee and replaces its distribution with the realized
//! value; terminating pays out the value of the best path under the current
//! beliefs.

use std::{fmt, rc::Rc, str::FromStr};

use rand::{SeedableRng, rngs::StdRng};

use super::{
    belief::{Belief, BeliefState, State},
    cost::{CostFunction, FlatCost},
    graph::{GraphView, MdpGraph, StructureProperties},
    registry::{Registry, RewardSpec},
    tree::Tree,
};
use crate::{Error, Result, distributions::Categorical};

/// Tolerance used to decide which paths tie for best under current beliefs.
const PATH_TIE_TOLERANCE: f64 = 1e-8;

/// What terminating an episode pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TermReward {
    /// Expected value of the best path under current beliefs.
    #[default]
    Expected,
    /// Mean true value of the paths that are best under current beliefs.
    GroundTruth,
    /// Nothing.
    Zero,
}

impl fmt::Display for TermReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TermReward::Expected => "expected",
            TermReward::GroundTruth => "ground-truth",
            TermReward::Zero => "zero",
        };
        f.write_str(label)
    }
}

impl FromStr for TermReward {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expected" => Ok(TermReward::Expected),
            "ground-truth" | "ground_truth" => Ok(TermReward::GroundTruth),
            "zero" => Ok(TermReward::Zero),
            _ => Err(Error::ParseOption {
                option: "term reward".to_string(),
                input: s.to_string(),
                expected: "expected, ground-truth, zero".to_string(),
            }),
        }
    }
}

/// Where the environment's ground truth comes from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GroundTruth {
    /// Sample every hidden node once at construction.
    #[default]
    Sampled,
    /// Sample with a fixed seed.
    Seeded(u64),
    /// Use the given values; the root is forced to 0.
    Given(Vec<f64>),
    /// No ground truth; only belief-level operations are available.
    Omitted,
}

/// Construction options for [`MouselabEnv`].
#[derive(Debug, Clone)]
pub struct EnvOptions {
    pub cost: Rc<dyn CostFunction>,
    pub ground_truth: GroundTruth,
    pub term_reward: TermReward,
    /// Fraction of trials whose payout is rewarded, in `[0, 1]`.
    pub pct_reward: f64,
    pub structure: Option<StructureProperties>,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            cost: Rc::new(FlatCost(0.0)),
            ground_truth: GroundTruth::default(),
            term_reward: TermReward::default(),
            pct_reward: 1.0,
            structure: None,
        }
    }
}

impl EnvOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat inspection cost of `-|cost|` per reveal.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Rc::new(FlatCost(cost));
        self
    }

    pub fn with_cost_function(mut self, cost: impl CostFunction + 'static) -> Self {
        self.cost = Rc::new(cost);
        self
    }

    pub fn with_shared_cost(mut self, cost: Rc<dyn CostFunction>) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_ground_truth(mut self, ground_truth: GroundTruth) -> Self {
        self.ground_truth = ground_truth;
        self
    }

    pub fn with_term_reward(mut self, term_reward: TermReward) -> Self {
        self.term_reward = term_reward;
        self
    }

    /// Scale termination payouts by the fraction of rewarded trials.
    pub fn with_pct_reward(mut self, pct_reward: f64) -> Self {
        self.pct_reward = pct_reward;
        self
    }

    pub fn with_structure(mut self, structure: StructureProperties) -> Self {
        self.structure = Some(structure);
        self
    }
}

/// One possible result of taking an action.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub probability: f64,
    pub next: State,
    pub reward: f64,
    /// Multiplier applied to `reward` when backing up values: the rewarded
    /// fraction for termination, 1 for reveals.
    pub scale: f64,
}

/// Result of [`MouselabEnv::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub state: State,
    pub reward: f64,
    pub done: bool,
}

/// Mouselab environment over a reward tree.
#[derive(Debug, Clone)]
pub struct MouselabEnv {
    tree: Tree,
    init: BeliefState,
    ground_truth: Option<Vec<f64>>,
    cost: Rc<dyn CostFunction>,
    term_reward: TermReward,
    pct_reward: f64,
    graph: MdpGraph,
    state: State,
    last_action: usize,
}

impl MouselabEnv {
    /// Build an environment from adjacency lists and initial beliefs.
    ///
    /// The root's belief is replaced by a revealed 0.
    pub fn new(children: Vec<Vec<usize>>, init: Vec<Belief>, options: EnvOptions) -> Result<Self> {
        Self::from_parts(Tree::new(children)?, init, options)
    }

    /// Symmetric tree with `branching[d]` children per node at depth `d` and
    /// rewards drawn from `reward` by depth.
    pub fn new_symmetric(branching: &[usize], reward: &RewardSpec, options: EnvOptions) -> Result<Self> {
        let tree = Tree::symmetric(branching);
        let init = (0..tree.len())
            .map(|node| reward.for_depth(tree.depth(node)))
            .collect::<Result<Vec<_>>>()?;
        Self::from_parts(tree, init, options)
    }

    /// Symmetric environment for a registered setting.
    pub fn new_symmetric_registered(name: &str, registry: &Registry, options: EnvOptions) -> Result<Self> {
        let setting = registry.get(name)?;
        Self::new_symmetric(&setting.branching, &setting.reward, options)
    }

    fn from_parts(tree: Tree, mut init: Vec<Belief>, options: EnvOptions) -> Result<Self> {
        if !(0.0..=1.0).contains(&options.pct_reward) {
            return Err(Error::config(format!(
                "rewarded fraction {} is outside [0, 1]",
                options.pct_reward
            )));
        }
        if init.len() != tree.len() {
            return Err(Error::config(format!(
                "{} initial beliefs for a tree of {} nodes",
                init.len(),
                tree.len()
            )));
        }
        init[0] = Belief::Revealed(0.0);
        let init = BeliefState::new(init);

        let ground_truth = match options.ground_truth {
            GroundTruth::Sampled => Some(sample_ground_truth(&init, rand::random())),
            GroundTruth::Seeded(seed) => Some(sample_ground_truth(&init, seed)),
            GroundTruth::Given(mut values) => {
                if values.len() != tree.len() {
                    return Err(Error::config(format!(
                        "ground truth has {} values for a tree of {} nodes",
                        values.len(),
                        tree.len()
                    )));
                }
                values[0] = 0.0;
                Some(values)
            }
            GroundTruth::Omitted => None,
        };

        let graph = MdpGraph::from_adjacency(tree.adjacency(), options.structure.as_ref())?;

        Ok(Self {
            state: State::Belief(init.clone()),
            tree,
            init,
            ground_truth,
            cost: options.cost,
            term_reward: options.term_reward,
            pct_reward: options.pct_reward,
            graph,
            last_action: 0,
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn graph(&self) -> &MdpGraph {
        &self.graph
    }

    /// Initial beliefs: root revealed, every other node as configured.
    pub fn init(&self) -> &BeliefState {
        &self.init
    }

    pub fn initial_state(&self) -> State {
        State::Belief(self.init.clone())
    }

    pub fn n_nodes(&self) -> usize {
        self.tree.len()
    }

    /// The terminal action, one past the last node index.
    pub fn term_action(&self) -> usize {
        self.tree.len()
    }

    pub fn ground_truth(&self) -> Option<&[f64]> {
        self.ground_truth.as_deref()
    }

    /// Fraction of trials whose termination payout is rewarded.
    pub fn pct_reward(&self) -> f64 {
        self.pct_reward
    }

    pub fn term_reward_mode(&self) -> TermReward {
        self.term_reward
    }

    /// Current episode state.
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn last_action(&self) -> usize {
        self.last_action
    }

    /// Valid actions: hidden nodes ascending, then the terminal action.
    pub fn actions(&self, state: &State) -> Vec<usize> {
        match state {
            State::Terminal => Vec::new(),
            State::Belief(belief) => belief
                .hidden_nodes()
                .chain(std::iter::once(self.term_action()))
                .collect(),
        }
    }

    pub fn is_valid_action(&self, state: &State, action: usize) -> bool {
        match state {
            State::Terminal => false,
            State::Belief(belief) => action == self.term_action() || belief.is_hidden(action),
        }
    }

    /// Reject beliefs that do not cover every node of the tree.
    pub fn check_belief(&self, belief: &BeliefState) -> Result<()> {
        if belief.len() != self.tree.len() {
            return Err(Error::config(format!(
                "state has {} entries for a tree of {} nodes",
                belief.len(),
                self.tree.len()
            )));
        }
        Ok(())
    }

    /// Every possible result of taking `action` in `state`.
    pub fn results(&self, state: &State, action: usize) -> Result<Vec<Outcome>> {
        if let State::Belief(belief) = state {
            self.check_belief(belief)?;
        }
        let belief = match state {
            State::Belief(belief) if self.is_valid_action(state, action) => belief,
            _ => return Err(self.invalid_action(state, action)),
        };

        if action == self.term_action() {
            return Ok(vec![Outcome {
                probability: 1.0,
                next: State::Terminal,
                reward: self.termination_reward(belief)?,
                scale: self.pct_reward,
            }]);
        }

        let Some(dist) = belief.get(action).and_then(Belief::distribution) else {
            return Err(self.invalid_action(state, action));
        };
        let reward = self.inspection_cost(belief, action)?;
        Ok(dist
            .iter()
            .map(|(value, probability)| Outcome {
                probability,
                next: State::Belief(belief.with_revealed(action, value)),
                reward,
                scale: 1.0,
            })
            .collect())
    }

    /// Cost of revealing `node` given what `belief` has revealed so far.
    pub fn inspection_cost(&self, belief: &BeliefState, node: usize) -> Result<f64> {
        let revealed = belief.revealed_mask();
        let view = GraphView::new(&self.graph, &revealed);
        self.cost.cost(node, Some(self.last_action), &view)
    }

    /// Reward for terminating in `belief` under the configured mode.
    pub fn termination_reward(&self, belief: &BeliefState) -> Result<f64> {
        match self.term_reward {
            TermReward::Expected => Ok(self.expected_term_reward(belief)),
            TermReward::GroundTruth => self.ground_truth_term_reward(belief),
            TermReward::Zero => Ok(0.0),
        }
    }

    /// Distribution over the total reward collected below `node` when
    /// following the best child by expectation at every step.
    pub fn node_value(&self, node: usize, belief: &BeliefState) -> Categorical {
        let options = self.tree.children(node).iter().map(|&child| {
            let below = self.node_value(child, belief);
            &below + &belief.entries()[child].as_distribution()
        });
        Categorical::max_by_expectation(options).unwrap_or_else(|| Categorical::point(0.0))
    }

    /// Distribution over the payout of terminating in `belief`.
    pub fn term_reward(&self, belief: &BeliefState) -> Categorical {
        self.node_value(0, belief)
    }

    /// Expectation of [`Self::term_reward`], computed on expectations alone.
    pub fn expected_term_reward(&self, belief: &BeliefState) -> f64 {
        fn best(tree: &Tree, belief: &BeliefState, node: usize) -> f64 {
            tree.children(node)
                .iter()
                .map(|&child| best(tree, belief, child) + belief.entries()[child].expectation())
                .fold(None, |acc: Option<f64>, value| Some(acc.map_or(value, |a| a.max(value))))
                .unwrap_or(0.0)
        }
        best(&self.tree, belief, 0)
    }

    /// Mean true value of the paths that are optimal under `belief`.
    pub fn ground_truth_term_reward(&self, belief: &BeliefState) -> Result<f64> {
        let truth = self
            .ground_truth
            .as_ref()
            .ok_or_else(|| Error::config("ground-truth term reward needs a ground truth"))?;

        let expected = |path: &[usize]| -> f64 {
            path.iter().map(|&n| belief.entries()[n].expectation()).sum()
        };
        let paths = self.tree.paths();
        if paths.is_empty() {
            return Ok(0.0);
        }
        let best = paths
            .iter()
            .map(|path| expected(path))
            .fold(f64::NEG_INFINITY, f64::max);
        let returns: Vec<f64> = paths
            .iter()
            .filter(|path| (expected(path) - best).abs() <= PATH_TIE_TOLERANCE)
            .map(|path| path.iter().map(|&n| truth[n]).sum())
            .collect();
        Ok(returns.iter().sum::<f64>() / returns.len() as f64)
    }

    /// Restart the episode from the initial beliefs.
    pub fn reset(&mut self) -> &State {
        self.state = self.initial_state();
        self.last_action = 0;
        &self.state
    }

    /// Take `action` against the ground truth.
    ///
    /// # Errors
    ///
    /// [`Error::EpisodeOver`] after termination, [`Error::InvalidAction`] for
    /// revealed nodes or out-of-range actions, and a configuration error when
    /// revealing without a ground truth.
    pub fn step(&mut self, action: usize) -> Result<StepResult> {
        let State::Belief(belief) = &self.state else {
            return Err(Error::EpisodeOver);
        };
        if !self.is_valid_action(&self.state, action) {
            return Err(self.invalid_action(&self.state, action));
        }

        if action == self.term_action() {
            let reward = self.termination_reward(belief)?;
            self.state = State::Terminal;
            self.last_action = action;
            return Ok(StepResult {
                state: State::Terminal,
                reward,
                done: true,
            });
        }

        let truth = self
            .ground_truth
            .as_ref()
            .ok_or_else(|| Error::config("revealing nodes needs a ground truth"))?;
        let reward = self.inspection_cost(belief, action)?;
        let next = State::Belief(belief.with_revealed(action, truth[action]));
        self.state = next.clone();
        self.last_action = action;
        Ok(StepResult {
            state: next,
            reward,
            done: false,
        })
    }

    fn invalid_action(&self, state: &State, action: usize) -> Error {
        Error::InvalidAction {
            action,
            state: state.to_string(),
        }
    }
}

fn sample_ground_truth(init: &BeliefState, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    init.entries()
        .iter()
        .map(|belief| match belief {
            Belief::Revealed(value) => *value,
            Belief::Hidden(dist) => dist.sample(&mut rng),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mouselab::registry::high_increasing_reward;

    fn small_env(options: EnvOptions) -> MouselabEnv {
        let reward = RewardSpec::by_depth([
            (1, Categorical::uniform(vec![-500.0]).unwrap()),
            (2, Categorical::uniform(vec![-60.0, 60.0]).unwrap()),
        ]);
        MouselabEnv::new_symmetric(&[1, 2], &reward, options).unwrap()
    }

    #[test]
    fn actions_list_hidden_nodes_then_terminal() {
        let env = small_env(EnvOptions::new().with_cost(1.0));
        assert_eq!(env.actions(&env.initial_state()), vec![1, 2, 3, 4]);
        assert!(env.actions(&State::Terminal).is_empty());
    }

    #[test]
    fn reveal_results_cover_every_outcome() {
        let env = small_env(EnvOptions::new().with_cost(1.0));
        let outcomes = env.results(&env.initial_state(), 2).unwrap();
        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            assert_eq!(outcome.probability, 0.5);
            assert_eq!(outcome.reward, -1.0);
            let next = outcome.next.belief().unwrap();
            assert!(!next.is_hidden(2));
            assert!(next.is_hidden(3));
        }
    }

    #[test]
    fn terminal_result_pays_expected_best_path() {
        let env = small_env(EnvOptions::new().with_cost(1.0));
        let outcomes = env.results(&env.initial_state(), env.term_action()).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].next, State::Terminal);
        assert_eq!(outcomes[0].reward, -500.0);
    }

    #[test]
    fn terminal_result_is_scaled_by_rewarded_fraction() {
        let env = small_env(EnvOptions::new().with_cost(1.0).with_pct_reward(0.5));
        assert_eq!(env.pct_reward(), 0.5);
        let term = env.results(&env.initial_state(), env.term_action()).unwrap();
        assert_eq!(term[0].reward, -500.0);
        assert_eq!(term[0].scale, 0.5);
        let reveal = env.results(&env.initial_state(), 2).unwrap();
        assert!(reveal.iter().all(|outcome| outcome.scale == 1.0));
    }

    #[test]
    fn rewarded_fraction_outside_unit_interval_is_rejected() {
        let reward = RewardSpec::by_depth([(1, Categorical::point(1.0))]);
        for pct in [-0.1, 1.5, f64::NAN] {
            let options = EnvOptions::new().with_pct_reward(pct);
            assert!(MouselabEnv::new_symmetric(&[2], &reward, options).is_err());
        }
        let options = EnvOptions::new().with_pct_reward(0.0);
        assert!(MouselabEnv::new_symmetric(&[2], &reward, options).is_ok());
    }

    #[test]
    fn short_states_are_rejected() {
        let env = small_env(EnvOptions::new());
        let short = State::Belief(BeliefState::new(vec![Belief::Revealed(0.0)]));
        assert!(matches!(
            env.results(&short, 1),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(env.check_belief(env.init()).is_ok());
    }

    #[test]
    fn invalid_actions_are_errors() {
        let env = small_env(EnvOptions::new());
        let state = env.initial_state();
        assert!(matches!(env.results(&state, 0), Err(Error::InvalidAction { .. })));
        assert!(env.results(&state, 99).is_err());
        assert!(env.results(&State::Terminal, 1).is_err());
    }

    #[test]
    fn node_value_matches_expectation_shortcut() {
        let env = MouselabEnv::new_symmetric(
            &[3, 1, 2],
            &high_increasing_reward().unwrap(),
            EnvOptions::new().with_ground_truth(GroundTruth::Seeded(7)),
        )
        .unwrap();
        let belief = env.init().with_revealed(3, 48.0).with_revealed(6, -8.0);
        let by_distribution = env.term_reward(&belief).expectation();
        assert!((by_distribution - env.expected_term_reward(&belief)).abs() < 1e-9);
        assert_eq!(env.expected_term_reward(&belief), 48.0);
    }

    #[test]
    fn ground_truth_term_reward_uses_true_values() {
        let env = small_env(
            EnvOptions::new()
                .with_ground_truth(GroundTruth::Given(vec![5.0, -500.0, 60.0, -60.0]))
                .with_term_reward(TermReward::GroundTruth),
        );
        let belief = env.init().clone();
        // both paths tie under the prior
        assert_eq!(env.ground_truth_term_reward(&belief).unwrap(), -500.0);
        let informed = belief.with_revealed(2, 60.0);
        assert_eq!(env.ground_truth_term_reward(&informed).unwrap(), -440.0);
        assert_eq!(env.ground_truth().unwrap()[0], 0.0);
    }

    #[test]
    fn step_reveals_ground_truth_and_terminates() {
        let mut env = small_env(
            EnvOptions::new()
                .with_cost(1.0)
                .with_ground_truth(GroundTruth::Given(vec![0.0, -500.0, 60.0, -60.0])),
        );
        let step = env.step(2).unwrap();
        assert_eq!(step.reward, -1.0);
        assert!(!step.done);
        assert_eq!(env.last_action(), 2);
        assert!(matches!(env.step(2), Err(Error::InvalidAction { .. })));

        let done = env.step(env.term_action()).unwrap();
        assert!(done.done);
        assert_eq!(done.reward, -440.0);
        assert!(matches!(env.step(1), Err(Error::EpisodeOver)));

        env.reset();
        assert_eq!(env.state(), &env.initial_state());
    }

    #[test]
    fn ground_truth_length_is_validated() {
        let reward = RewardSpec::Constant(Belief::hidden(Categorical::point(1.0)));
        let result = MouselabEnv::new_symmetric(
            &[2],
            &reward,
            EnvOptions::new().with_ground_truth(GroundTruth::Given(vec![0.0])),
        );
        assert!(result.is_err());
    }

    #[test]
    fn seeded_ground_truth_is_reproducible() {
        let options = || EnvOptions::new().with_ground_truth(GroundTruth::Seeded(11));
        let reward = high_increasing_reward().unwrap();
        let a = MouselabEnv::new_symmetric(&[3, 1, 2], &reward, options()).unwrap();
        let b = MouselabEnv::new_symmetric(&[3, 1, 2], &reward, options()).unwrap();
        assert_eq!(a.ground_truth(), b.ground_truth());
        assert_eq!(a.ground_truth().unwrap()[0], 0.0);
    }

    #[test]
    fn term_reward_parses() {
        assert_eq!("ground_truth".parse::<TermReward>().unwrap(), TermReward::GroundTruth);
        assert!("bogus".parse::<TermReward>().is_err());
    }
}
