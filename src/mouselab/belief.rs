//! Belief states: per-node knowledge of a partially revealed reward tree.

use std::{cmp::Ordering, fmt, hash::Hash, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::distributions::{Categorical, cmp_values, value_bits};

/// Knowledge about a single node.
///
/// Revealed entries order before hidden ones, so sorting sibling subtrees
/// places known values first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Belief {
    /// Observed reward.
    Revealed(f64),
    /// Reward still unknown, distributed as given.
    Hidden(Rc<Categorical>),
}

impl Belief {
    pub fn hidden(dist: Categorical) -> Self {
        Belief::Hidden(Rc::new(dist))
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Belief::Hidden(_))
    }

    pub fn revealed_value(&self) -> Option<f64> {
        match self {
            Belief::Revealed(value) => Some(*value),
            Belief::Hidden(_) => None,
        }
    }

    pub fn distribution(&self) -> Option<&Categorical> {
        match self {
            Belief::Revealed(_) => None,
            Belief::Hidden(dist) => Some(dist),
        }
    }

    /// Expected reward under current knowledge.
    pub fn expectation(&self) -> f64 {
        match self {
            Belief::Revealed(value) => *value,
            Belief::Hidden(dist) => dist.expectation(),
        }
    }

    /// Possible realized values (a singleton once revealed).
    pub fn outcomes(&self) -> Vec<f64> {
        match self {
            Belief::Revealed(value) => vec![*value],
            Belief::Hidden(dist) => dist.vals().to_vec(),
        }
    }

    /// Knowledge as a distribution; revealed values become point masses.
    pub fn as_distribution(&self) -> Categorical {
        match self {
            Belief::Revealed(value) => Categorical::point(*value),
            Belief::Hidden(dist) => (**dist).clone(),
        }
    }
}

impl From<f64> for Belief {
    fn from(value: f64) -> Self {
        Belief::Revealed(value)
    }
}

impl From<Categorical> for Belief {
    fn from(dist: Categorical) -> Self {
        Belief::hidden(dist)
    }
}

impl PartialEq for Belief {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Belief {}

impl Hash for Belief {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Belief::Revealed(value) => {
                0u8.hash(state);
                value_bits(*value).hash(state);
            }
            Belief::Hidden(dist) => {
                1u8.hash(state);
                dist.hash(state);
            }
        }
    }
}

impl PartialOrd for Belief {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Belief {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Belief::Revealed(a), Belief::Revealed(b)) => cmp_values(*a, *b),
            (Belief::Revealed(_), Belief::Hidden(_)) => Ordering::Less,
            (Belief::Hidden(_), Belief::Revealed(_)) => Ordering::Greater,
            (Belief::Hidden(a), Belief::Hidden(b)) => {
                if Rc::ptr_eq(a, b) {
                    Ordering::Equal
                } else {
                    a.cmp(b)
                }
            }
        }
    }
}

impl fmt::Display for Belief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Belief::Revealed(value) => write!(f, "{value}"),
            Belief::Hidden(_) => f.write_str("_"),
        }
    }
}

/// Ordered per-node beliefs for a whole tree. Never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BeliefState(Vec<Belief>);

impl BeliefState {
    pub fn new(entries: Vec<Belief>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[Belief] {
        &self.0
    }

    pub fn get(&self, node: usize) -> Option<&Belief> {
        self.0.get(node)
    }

    pub fn is_hidden(&self, node: usize) -> bool {
        self.0.get(node).is_some_and(Belief::is_hidden)
    }

    /// Indices of nodes whose value is still unknown, ascending.
    pub fn hidden_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, belief)| belief.is_hidden())
            .map(|(idx, _)| idx)
    }

    pub fn revealed_mask(&self) -> Vec<bool> {
        self.0.iter().map(|belief| !belief.is_hidden()).collect()
    }

    /// Copy of this state with `node` revealed as `value`.
    pub fn with_revealed(&self, node: usize, value: f64) -> Self {
        let mut entries = self.0.clone();
        entries[node] = Belief::Revealed(value);
        Self(entries)
    }

    pub fn into_entries(self) -> Vec<Belief> {
        self.0
    }
}

impl From<Vec<Belief>> for BeliefState {
    fn from(entries: Vec<Belief>) -> Self {
        Self(entries)
    }
}

impl fmt::Display for BeliefState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, belief) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{belief}")?;
        }
        Ok(())
    }
}

/// A state of the decision process: a belief tuple or the terminal sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Belief(BeliefState),
    Terminal,
}

impl State {
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Terminal)
    }

    pub fn belief(&self) -> Option<&BeliefState> {
        match self {
            State::Belief(belief) => Some(belief),
            State::Terminal => None,
        }
    }
}

impl From<BeliefState> for State {
    fn from(belief: BeliefState) -> Self {
        State::Belief(belief)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Belief(belief) => write!(f, "{belief}"),
            State::Terminal => f.write_str("<terminal>"),
        }
    }
}
