//! Ports (trait boundaries) for external dependencies.
//!
//! The dictionary builder owns these traits; adapters in the infrastructure
//! layer implement them.

pub mod observer;
pub mod repository;

pub use observer::{NoopObserver, TableObserver};
pub use repository::TableRepository;
