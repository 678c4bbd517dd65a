//! MessagePack implementation of the table repository.
//!
//! Tables are written with rmp_serde for compact binary files.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{Result, dictionary::Table, error::Error, ports::TableRepository};

/// MessagePack-based table repository.
///
/// # Examples
///
/// ```no_run
/// use mouselab::adapters::MsgPackRepository;
/// use mouselab::dictionary::{QTable, Table};
/// use mouselab::ports::TableRepository;
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// repo.save(&Table::Q(QTable::new()), Path::new("q.msgpack"))?;
/// let loaded = repo.load(Path::new("q.msgpack"))?;
/// # Ok::<(), mouselab::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl TableRepository for MsgPackRepository {
    fn save(&self, table: &Table, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, table).map_err(|e| Error::SerializationContext {
            operation: format!("serialize {} table to MessagePack", table.kind()),
            message: e.to_string(),
        })?;

        writer.flush().map_err(|source| Error::Io {
            operation: format!("write file {path:?}"),
            source,
        })
    }

    fn load(&self, path: &Path) -> Result<Table> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        rmp_serde::decode::from_read(&file).map_err(|e| Error::SerializationContext {
            operation: "deserialize table from MessagePack".to_string(),
            message: e.to_string(),
        })
    }
}
