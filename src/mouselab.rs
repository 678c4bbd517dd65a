//! Mouselab environments over partially revealed reward trees

pub mod belief;
pub mod cost;
pub mod env;
pub mod graph;
pub mod registry;
pub mod symmetry;
pub mod tree;

pub use belief::{Belief, BeliefState, State};
pub use cost::{
    CostFunction, DistanceCost, FlatCost, LinearDepthCost, SearchCost, SearchDirection, SideCost,
};
pub use env::{EnvOptions, GroundTruth, MouselabEnv, Outcome, StepResult, TermReward};
pub use graph::{GraphView, MdpGraph, NodeAttributes, Structure, StructureProperties};
pub use registry::{
    EnvSetting, Registry, RewardSpec, high_decreasing_reward, high_increasing_reward,
    low_constant_reward, normal_reward,
};
pub use symmetry::{hash_tree, sort_tree, terminal_hash};
pub use tree::Tree;
