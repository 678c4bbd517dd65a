//! Subcommands of the `mouselab` binary

pub mod list_envs;
pub mod solve;
pub mod tables;
