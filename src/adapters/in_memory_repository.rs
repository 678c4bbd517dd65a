//! In-memory table repository for testing.
//!
//! Tables are encoded exactly as on disk but kept in a shared map, so tests
//! exercise serialization without touching the file system.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{Result, dictionary::Table, error::Error, ports::TableRepository};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use mouselab::adapters::InMemoryRepository;
/// use mouselab::dictionary::{QTable, Table};
/// use mouselab::ports::TableRepository;
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// repo.save(&Table::Q(QTable::new()), Path::new("q"))?;
/// let loaded = repo.load(Path::new("q"))?;
/// assert!(loaded.is_empty());
/// # Ok::<(), mouselab::Error>(())
/// ```
///
/// All clones share the same underlying storage.
#[derive(Clone)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of tables currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Remove every stored table.
    pub fn clear(&self) {
        self.storage().clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&key(path))
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl TableRepository for InMemoryRepository {
    fn save(&self, table: &Table, path: &Path) -> Result<()> {
        let bytes = rmp_serde::to_vec(table).map_err(|e| Error::SerializationContext {
            operation: format!("serialize {} table for in-memory storage", table.kind()),
            message: e.to_string(),
        })?;

        self.storage().insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Table> {
        let storage = self.storage();
        let bytes = storage.get(&key(path)).ok_or_else(|| Error::Io {
            operation: format!("load table from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
            operation: "deserialize table from in-memory storage".to_string(),
            message: e.to_string(),
        })
    }
}
