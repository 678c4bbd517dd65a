//! CLI infrastructure for the Mouselab solver
//!
//! Commands solve registered environments, inspect saved tables, and list
//! the available environment settings.

pub mod commands;
pub mod output;
