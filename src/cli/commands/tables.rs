//! Tables command - Inspect and convert saved Q and policy tables

use std::{fs::File, io::BufWriter, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::MsgPackRepository,
    cli::output::{create_spinner, format_number, print_kv, print_section},
    dictionary::Table,
    ports::TableRepository,
};

#[derive(Parser, Debug)]
#[command(about = "Inspect a saved table")]
pub struct TablesArgs {
    /// MessagePack table written by `solve --output`
    pub path: PathBuf,

    /// Print this many entries
    #[arg(long, short = 'n', default_value_t = 5)]
    pub head: usize,

    /// Convert the table to JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub fn execute(args: TablesArgs) -> Result<()> {
    let spinner = create_spinner(&format!("Loading {}", args.path.display()))?;
    let table = MsgPackRepository::new()
        .load(&args.path)
        .with_context(|| format!("loading table from {}", args.path.display()))?;
    spinner.finish_and_clear();

    print_section(&format!("{} table", table.kind()));
    print_kv("Entries", &format_number(table.len()));

    match &table {
        Table::Q(q) => {
            for (state, action, value) in q.iter().take(args.head) {
                println!("  [{state}] action {action}: {value:.4}");
            }
        }
        Table::Policy(pi) => {
            for (state, record) in pi.iter().take(args.head) {
                println!("  [{state}] optimal {:?}", record.max_actions);
            }
        }
    }

    if let Some(path) = &args.json {
        export_json(&table, path)?;
        println!("\nTable exported to: {}", path.display());
    }

    Ok(())
}

/// Write `table` as pretty-printed JSON.
pub fn export_json(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), table)
        .with_context(|| format!("writing {} table to {}", table.kind(), path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        dictionary::QTable,
        mouselab::{Belief, BeliefState},
    };

    #[test]
    fn json_export_is_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("q.json");
        let mut q = QTable::new();
        q.insert(BeliefState::new(vec![Belief::Revealed(0.0), Belief::Revealed(4.0)]), 2, 4.0);
        let table = Table::Q(q);

        export_json(&table, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: Table = serde_json::from_str(&text).unwrap();
        assert_eq!(back, table);
    }
}
