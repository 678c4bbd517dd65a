//! Discrete reward distributions for tree nodes.
//!
//! A [`Categorical`] is an immutable set of `(value, probability)` outcomes.
//! Equality, hashing and ordering are defined on the exact bit patterns of the
//! outcomes so that two distributions built from the same values collapse to a
//! single key in the solver's memoization tables.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::Add,
};

use rand::{Rng, distr::StandardUniform};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal as NormalDist};

use crate::{Error, Result};

/// Maximum deviation of a probability vector's total from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Bit pattern of a value with `-0.0` folded into `0.0`.
pub(crate) fn value_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Total order over values consistent with [`value_bits`].
pub(crate) fn cmp_values(a: f64, b: f64) -> Ordering {
    let a = if a == 0.0 { 0.0 } else { a };
    let b = if b == 0.0 { 0.0 } else { b };
    a.total_cmp(&b)
}

/// Discrete distribution over node rewards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCategorical")]
pub struct Categorical {
    vals: Vec<f64>,
    probs: Vec<f64>,
}

/// Unvalidated serialized form; loading goes through [`Categorical::new`].
#[derive(Deserialize)]
struct RawCategorical {
    vals: Vec<f64>,
    probs: Vec<f64>,
}

impl TryFrom<RawCategorical> for Categorical {
    type Error = Error;

    fn try_from(raw: RawCategorical) -> Result<Self> {
        Categorical::new(raw.vals, raw.probs)
    }
}

impl Categorical {
    /// Create a distribution from parallel value and probability vectors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if the outcome set is empty, the
    /// vectors differ in length, any entry is not finite, any probability is
    /// negative, or the probabilities do not sum to 1.
    pub fn new(vals: Vec<f64>, probs: Vec<f64>) -> Result<Self> {
        if vals.is_empty() {
            return Err(invalid("outcome set is empty"));
        }
        if vals.len() != probs.len() {
            return Err(invalid(format!(
                "{} values but {} probabilities",
                vals.len(),
                probs.len()
            )));
        }
        if let Some(value) = vals.iter().find(|v| !v.is_finite()) {
            return Err(invalid(format!("value {value} is not finite")));
        }
        if let Some(prob) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(invalid(format!("probability {prob} is not a valid weight")));
        }
        let total: f64 = probs.iter().sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(invalid(format!("probabilities sum to {total}, expected 1")));
        }
        Ok(Self { vals, probs })
    }

    /// Uniform distribution over the given values.
    pub fn uniform(vals: Vec<f64>) -> Result<Self> {
        let n = vals.len();
        let probs = vec![1.0 / n.max(1) as f64; n];
        Self::new(vals, probs)
    }

    /// Degenerate distribution with a single certain outcome.
    pub fn point(value: f64) -> Self {
        Self {
            vals: vec![value],
            probs: vec![1.0],
        }
    }

    pub fn vals(&self) -> &[f64] {
        &self.vals
    }

    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Number of outcomes.
    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    /// Iterate over `(value, probability)` outcomes.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.vals.iter().copied().zip(self.probs.iter().copied())
    }

    /// Whether `value` is one of the outcomes.
    pub fn contains(&self, value: f64) -> bool {
        self.vals.iter().any(|v| value_bits(*v) == value_bits(value))
    }

    pub fn expectation(&self) -> f64 {
        self.iter().map(|(v, p)| v * p).sum()
    }

    /// Map every outcome value through `f`, keeping probabilities.
    pub fn apply(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            vals: self.vals.iter().map(|v| f(*v)).collect(),
            probs: self.probs.clone(),
        }
    }

    /// Distribution of the sum of two independent variables.
    ///
    /// Outcomes with equal values are merged and the result is sorted by value.
    pub fn convolve(&self, other: &Categorical) -> Self {
        let mut outcomes: Vec<(f64, f64)> = Vec::with_capacity(self.len() * other.len());
        for (v1, p1) in self.iter() {
            for (v2, p2) in other.iter() {
                outcomes.push((v1 + v2, p1 * p2));
            }
        }
        Self::merged(outcomes)
    }

    /// Draw one outcome value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let mut threshold = rng.sample::<f64, _>(StandardUniform);
        for (value, prob) in self.iter() {
            if threshold < prob {
                return value;
            }
            threshold -= prob;
        }
        self.vals[self.vals.len() - 1]
    }

    /// The distribution with the highest expectation; ties keep the earliest.
    pub fn max_by_expectation<I>(dists: I) -> Option<Categorical>
    where
        I: IntoIterator<Item = Categorical>,
    {
        let mut best: Option<(f64, Categorical)> = None;
        for dist in dists {
            let value = dist.expectation();
            match &best {
                Some((best_value, _)) if value <= *best_value => {}
                _ => best = Some((value, dist)),
            }
        }
        best.map(|(_, dist)| dist)
    }

    fn merged(mut outcomes: Vec<(f64, f64)>) -> Self {
        outcomes.sort_by(|a, b| cmp_values(a.0, b.0));
        let mut vals: Vec<f64> = Vec::with_capacity(outcomes.len());
        let mut probs: Vec<f64> = Vec::with_capacity(outcomes.len());
        for (value, prob) in outcomes {
            match vals.last() {
                Some(last) if value_bits(*last) == value_bits(value) => {
                    if let Some(total) = probs.last_mut() {
                        *total += prob;
                    }
                }
                _ => {
                    vals.push(value);
                    probs.push(prob);
                }
            }
        }
        Self { vals, probs }
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidDistribution {
        message: message.into(),
    }
}

impl PartialEq for Categorical {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Categorical {}

impl Hash for Categorical {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vals.len().hash(state);
        for (value, prob) in self.iter() {
            value_bits(value).hash(state);
            value_bits(prob).hash(state);
        }
    }
}

impl PartialOrd for Categorical {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Categorical {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_values = self
            .vals
            .iter()
            .zip(&other.vals)
            .map(|(a, b)| cmp_values(*a, *b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| self.vals.len().cmp(&other.vals.len()));
        by_values.then_with(|| {
            self.probs
                .iter()
                .zip(&other.probs)
                .map(|(a, b)| cmp_values(*a, *b))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

impl Add<f64> for &Categorical {
    type Output = Categorical;

    fn add(self, rhs: f64) -> Categorical {
        self.apply(|v| v + rhs)
    }
}

impl Add<&Categorical> for &Categorical {
    type Output = Categorical;

    fn add(self, rhs: &Categorical) -> Categorical {
        self.convolve(rhs)
    }
}

impl fmt::Display for Categorical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cat(")?;
        for (idx, value) in self.vals.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

/// Normal distribution, only used to build categorical reward presets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normal {
    pub mu: f64,
    pub sigma: f64,
}

impl Normal {
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    /// Discretize into `n` evenly spaced outcomes within `max_sigma` standard
    /// deviations of the mean.
    ///
    /// Each outcome receives the probability mass of the bin extending halfway
    /// to its neighbours; the outermost bins are open-ended.
    pub fn to_discrete(&self, n: usize, max_sigma: f64) -> Result<Categorical> {
        if n < 2 {
            return Err(invalid(format!("cannot discretize into {n} bins")));
        }
        let dist = NormalDist::new(self.mu, self.sigma)
            .map_err(|e| invalid(format!("normal({}, {}): {e}", self.mu, self.sigma)))?;

        let low = self.mu - max_sigma * self.sigma;
        let high = self.mu + max_sigma * self.sigma;
        let delta = (high - low) / (n - 1) as f64;
        let vals: Vec<f64> = (0..n).map(|i| low + delta * i as f64).collect();

        let mut edges = Vec::with_capacity(n + 1);
        edges.push(f64::NEG_INFINITY);
        edges.extend(vals[1..].iter().map(|v| v - delta / 2.0));
        edges.push(f64::INFINITY);

        let cdf: Vec<f64> = edges.iter().map(|edge| dist.cdf(*edge)).collect();
        let probs: Vec<f64> = cdf.windows(2).map(|w| w[1] - w[0]).collect();
        Categorical::new(vals, probs)
    }
}
