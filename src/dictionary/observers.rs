//! Table construction observers

use indicatif::{ProgressBar, ProgressStyle};

use super::tables::TableKind;
use crate::{Result, ports::TableObserver};

/// Progress bar over the entries of a table.
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self { progress_bar: None }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TableObserver for ProgressObserver {
    fn on_table_start(&mut self, kind: TableKind, total: usize) -> Result<()> {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        pb.set_message(format!("{kind} entries"));
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_entry(&mut self, done: usize) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(done as u64);
        }
        Ok(())
    }

    fn on_table_end(&mut self, entries: usize) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("{entries} distinct entries"));
        }
        Ok(())
    }
}

/// Counts events; handy for checking what a build reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountingObserver {
    pub expected: usize,
    pub solved: usize,
    pub distinct: usize,
}

impl TableObserver for CountingObserver {
    fn on_table_start(&mut self, _kind: TableKind, total: usize) -> Result<()> {
        self.expected = total;
        Ok(())
    }

    fn on_entry(&mut self, done: usize) -> Result<()> {
        self.solved = done;
        Ok(())
    }

    fn on_table_end(&mut self, entries: usize) -> Result<()> {
        self.distinct = entries;
        Ok(())
    }
}
