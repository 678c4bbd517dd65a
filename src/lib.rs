//! Exact planning for Mouselab information-gathering tasks
//!
//! This crate provides:
//! - Discrete reward distributions with convolution and expectation-based max
//! - The Mouselab decision process over partially revealed reward trees
//! - An exact memoized Q/V/π solver with symmetry reduction
//! - Enumeration of reachable belief states and state-action pairs
//! - Q and policy table construction with MessagePack persistence

pub mod adapters;
pub mod app;
pub mod cli;
pub mod dictionary;
pub mod distributions;
pub mod enumeration;
pub mod error;
pub mod exact;
pub mod mouselab;
pub mod ports;

pub use distributions::{Categorical, Normal};
pub use error::{Error, Result};
pub use exact::{Blinkered, Canonicalization, PolicyRecord, Solver, SolverStats};
pub use mouselab::{Belief, BeliefState, EnvOptions, MouselabEnv, Registry, State};
