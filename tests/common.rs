//! Common test utilities for the mouselab test suite.
//!
//! Small registered settings whose optimal values are easy to check by hand.

#![allow(dead_code)]

use mouselab::{
    Categorical, MouselabEnv, Registry,
    mouselab::{EnvOptions, EnvSetting, GroundTruth, RewardSpec, StructureProperties},
};

/// Branching 1-2: a certain -500 followed by two ±60 leaves.
pub const SMALL: &str = "small_test_case";

/// Branching 1-2-1: adds a ±90 leaf below each ±60 node.
pub const MEDIUM: &str = "medium_test_case";

fn uniform(vals: &[f64]) -> Categorical {
    Categorical::uniform(vals.to_vec()).expect("valid test distribution")
}

pub fn small_reward() -> RewardSpec {
    RewardSpec::by_depth([(1, uniform(&[-500.0])), (2, uniform(&[-60.0, 60.0]))])
}

pub fn medium_reward() -> RewardSpec {
    RewardSpec::by_depth([
        (1, uniform(&[-500.0])),
        (2, uniform(&[-60.0, 60.0])),
        (3, uniform(&[-90.0, 90.0])),
    ])
}

/// Standard registry plus the two small test settings.
pub fn test_registry() -> Registry {
    let mut registry = Registry::standard().expect("standard registry");
    registry
        .register(EnvSetting::new(SMALL, vec![1, 2], small_reward()))
        .expect("register small setting");
    registry
        .register(EnvSetting::new(MEDIUM, vec![1, 2, 1], medium_reward()))
        .expect("register medium setting");
    registry
}

/// Registered environment with flat cost 1 and no ground truth.
pub fn solver_env(name: &str) -> MouselabEnv {
    MouselabEnv::new_symmetric_registered(
        name,
        &test_registry(),
        EnvOptions::new()
            .with_cost(1.0)
            .with_ground_truth(GroundTruth::Omitted),
    )
    .expect("registered test environment")
}

pub const SMALL_STRUCTURE: &str = r#"{
    "layout": {"0": [0, 0], "1": [0, -1], "2": [1, -1], "3": [-1, -1]},
    "initial": "0",
    "graph": {
        "0": {"up": [0, "1"]},
        "1": {"right": [0, "2"], "left": [0, "3"]},
        "2": {},
        "3": {}
    }
}"#;

pub const HIGH_INCREASING_STRUCTURE: &str = r#"{
    "layout": {
        "0": [0, 0], "1": [0, -1], "2": [0, -2], "3": [1, -2], "4": [-1, -2],
        "5": [1, 0], "6": [2, 0], "7": [2, -1], "8": [2, 1],
        "9": [-1, 0], "10": [-2, 0], "11": [-2, -1], "12": [-2, 1]
    },
    "initial": "0",
    "graph": {
        "0": {"up": [0, "1"], "right": [0, "5"], "left": [0, "9"]},
        "1": {"up": [0, "2"]},
        "2": {"right": [0, "3"], "left": [0, "4"]},
        "3": {}, "4": {},
        "5": {"right": [0, "6"]},
        "6": {"up": [0, "7"], "down": [0, "8"]},
        "7": {}, "8": {},
        "9": {"left": [0, "10"]},
        "10": {"up": [0, "11"], "down": [0, "12"]},
        "11": {}, "12": {}
    }
}"#;

pub fn structure(json: &str) -> StructureProperties {
    StructureProperties::from_json(json).expect("valid structure description")
}
