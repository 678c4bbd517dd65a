//! Repository port for table persistence.
//!
//! This module defines the trait boundary between the dictionary builder and
//! the storage used for the tables it produces.

use std::path::Path;

use crate::{Result, dictionary::Table};

/// Port for persisting and loading solved Q and policy tables.
///
/// # Examples
///
/// ```no_run
/// use mouselab::dictionary::Table;
/// use mouselab::ports::TableRepository;
/// use std::path::Path;
///
/// fn save_table<R: TableRepository>(repo: &R, table: &Table, path: &Path) -> mouselab::Result<()> {
///     repo.save(table, path)
/// }
/// ```
pub trait TableRepository {
    /// Save a table to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written or serialization
    /// fails.
    fn save(&self, table: &Table, path: &Path) -> Result<()>;

    /// Load the table stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is stored there or the contents do not
    /// decode as a table.
    fn load(&self, path: &Path) -> Result<Table>;
}
