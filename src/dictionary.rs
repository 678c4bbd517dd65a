//! Q and policy tables materialized from the exact solver

pub mod builder;
pub mod observers;
pub mod tables;

pub use builder::{
    SolveReport, TableScope, build_table, construct_partial_pi_dictionary,
    construct_partial_q_dictionary, construct_pi_dictionary, construct_q_dictionary, timed_solve,
};
pub use observers::{CountingObserver, ProgressObserver};
pub use tables::{PolicyEntry, PolicyTable, QRecord, QTable, Table, TableKind};
