//! Observer port for table construction.
//!
//! Building a full Q or policy table can take minutes on larger trees. The
//! dictionary builder reports its progress through this trait so callers can
//! attach progress bars or counters without the builder knowing about them.

use crate::{Result, dictionary::TableKind};

/// Receives progress events while a table is filled.
///
/// Methods are called in order: `on_table_start` once, `on_entry` after every
/// solved entry, then `on_table_end` once. All methods default to doing
/// nothing.
///
/// # Examples
///
/// ```
/// use mouselab::ports::TableObserver;
///
/// struct Count(usize);
///
/// impl TableObserver for Count {
///     fn on_entry(&mut self, _done: usize) -> mouselab::Result<()> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait TableObserver {
    /// Called before the first entry with the number of entries to solve.
    fn on_table_start(&mut self, _kind: TableKind, _total: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each entry; `done` counts entries solved so far.
    fn on_entry(&mut self, _done: usize) -> Result<()> {
        Ok(())
    }

    /// Called once the table holds `entries` distinct keys.
    fn on_table_end(&mut self, _entries: usize) -> Result<()> {
        Ok(())
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TableObserver for NoopObserver {}
