//! Exact Q/V/π computation by memoized backward induction

pub mod blinkered;
pub mod solver;

pub use blinkered::{ActionSubset, Blinkered};
pub use solver::{
    CacheKey, Canonicalization, PolicyRecord, Solver, SolverStats, TIE_TOLERANCE, round8,
};
