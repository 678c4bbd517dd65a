//! Named environment settings and reward presets.
//!
//! The registry is an explicit value handed to whoever builds environments;
//! there is no global table. [`Registry::standard`] preloads the settings used
//! in the published experiments.

use std::{collections::BTreeMap, fmt};

use super::belief::Belief;
use crate::{
    Error, Result,
    distributions::{Categorical, Normal},
};

/// How a node's reward distribution is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum RewardSpec {
    /// Same belief for every non-root node.
    Constant(Belief),
    /// Belief keyed by node depth (root is depth 0 and always 0).
    ByDepth(BTreeMap<usize, Belief>),
}

impl RewardSpec {
    pub fn by_depth<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, Categorical)>,
    {
        RewardSpec::ByDepth(
            entries
                .into_iter()
                .map(|(depth, dist)| (depth, Belief::hidden(dist)))
                .collect(),
        )
    }

    /// Initial belief for a node at `depth`.
    pub fn for_depth(&self, depth: usize) -> Result<Belief> {
        if depth == 0 {
            return Ok(Belief::Revealed(0.0));
        }
        match self {
            RewardSpec::Constant(belief) => Ok(belief.clone()),
            RewardSpec::ByDepth(table) => table.get(&depth).cloned().ok_or_else(|| {
                Error::config(format!("reward specification has no entry for depth {depth}"))
            }),
        }
    }
}

/// A registered environment setting.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvSetting {
    pub name: String,
    pub branching: Vec<usize>,
    pub reward: RewardSpec,
}

impl EnvSetting {
    pub fn new(name: impl Into<String>, branching: Vec<usize>, reward: RewardSpec) -> Self {
        Self {
            name: name.into(),
            branching,
            reward,
        }
    }
}

impl fmt::Display for EnvSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let branching: Vec<String> = self.branching.iter().map(|b| b.to_string()).collect();
        writeln!(f, "name: {}", self.name)?;
        writeln!(f, "branching: {}", branching.join("-"))?;
        match &self.reward {
            RewardSpec::Constant(belief) => writeln!(f, "\tall, {}", describe(belief)),
            RewardSpec::ByDepth(table) => {
                for (depth, belief) in table {
                    writeln!(f, "\t{depth}, {}", describe(belief))?;
                }
                Ok(())
            }
        }
    }
}

fn describe(belief: &Belief) -> String {
    match belief {
        Belief::Revealed(value) => value.to_string(),
        Belief::Hidden(dist) => dist.to_string(),
    }
}

/// Table of named environment settings.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    envs: BTreeMap<String, EnvSetting>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard settings.
    pub fn standard() -> Result<Self> {
        let mut registry = Self::new();
        for setting in standard_settings()? {
            registry.register(setting)?;
        }
        Ok(registry)
    }

    /// Add a setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for an empty name and
    /// [`Error::DuplicateEnvironment`] if the name is taken.
    pub fn register(&mut self, setting: EnvSetting) -> Result<()> {
        if setting.name.trim().is_empty() {
            return Err(Error::config("no name provided for environment setting"));
        }
        if self.envs.contains_key(&setting.name) {
            return Err(Error::DuplicateEnvironment { name: setting.name });
        }
        self.envs.insert(setting.name.clone(), setting);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&EnvSetting> {
        self.envs.get(name).ok_or_else(|| Error::UnknownEnvironment {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.envs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.envs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.envs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }
}

fn uniform(vals: &[f64]) -> Result<Categorical> {
    Categorical::uniform(vals.to_vec())
}

pub fn high_increasing_reward() -> Result<RewardSpec> {
    Ok(RewardSpec::by_depth([
        (1, uniform(&[-4.0, -2.0, 2.0, 4.0])?),
        (2, uniform(&[-8.0, -4.0, 4.0, 8.0])?),
        (3, uniform(&[-48.0, -24.0, 24.0, 48.0])?),
    ]))
}

pub fn high_decreasing_reward() -> Result<RewardSpec> {
    Ok(RewardSpec::by_depth([
        (1, uniform(&[-48.0, -24.0, 24.0, 48.0])?),
        (2, uniform(&[-8.0, -4.0, 4.0, 8.0])?),
        (3, uniform(&[-4.0, -2.0, 2.0, 4.0])?),
    ]))
}

pub fn low_constant_reward(depth: usize) -> Result<RewardSpec> {
    let dist = uniform(&[-10.0, -5.0, 5.0, 10.0])?;
    Ok(RewardSpec::by_depth(
        (1..=depth).map(|d| (d, dist.clone())),
    ))
}

/// Discretized normal rewards with per-depth standard deviations.
///
/// `variance_structure` is one of `constant_high`, `increasing`,
/// `decreasing`, `constant_low`.
pub fn normal_reward(variance_structure: &str) -> Result<RewardSpec> {
    let sigmas: [f64; 3] = match variance_structure {
        "constant_high" => [20.0, 20.0, 20.0],
        "increasing" => [2.0, 4.0, 20.0],
        "decreasing" => [20.0, 10.0, 5.0],
        "constant_low" => [1.0, 1.0, 1.0],
        other => {
            return Err(Error::ParseOption {
                option: "variance structure".to_string(),
                input: other.to_string(),
                expected: "constant_high, increasing, decreasing, constant_low".to_string(),
            });
        }
    };
    let mut table = Vec::with_capacity(sigmas.len());
    for (idx, sigma) in sigmas.iter().enumerate() {
        table.push((idx + 1, Normal::new(0.0, *sigma).to_discrete(6, 4.0)?));
    }
    Ok(RewardSpec::by_depth(table))
}

fn standard_settings() -> Result<Vec<EnvSetting>> {
    Ok(vec![
        EnvSetting::new("high_increasing", vec![3, 1, 2], high_increasing_reward()?),
        EnvSetting::new("high_decreasing", vec![3, 1, 2], high_decreasing_reward()?),
        EnvSetting::new("low_constant", vec![3, 1, 2], low_constant_reward(3)?),
        EnvSetting::new("constant_high", vec![4, 1, 2], normal_reward("constant_high")?),
        EnvSetting::new("increasing", vec![4, 1, 2], normal_reward("increasing")?),
        EnvSetting::new("decreasing", vec![4, 1, 2], normal_reward("decreasing")?),
        EnvSetting::new("constant_low", vec![4, 1, 2], normal_reward("constant_low")?),
    ])
}
