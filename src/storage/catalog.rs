//! Catalog - maps table ids to their files.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::{Error, Result, TableId};
use crate::storage::DbFile;

/// Registry of every table file the buffer pool can load pages from.
///
/// Lookups take a read lock, so concurrent fetches of different tables
/// never contend here.
#[derive(Default)]
pub struct Catalog {
    files: RwLock<HashMap<TableId, Arc<dyn DbFile>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table file under its own table id, replacing any previous
    /// file with that id.
    pub fn add_table(&self, file: Arc<dyn DbFile>) {
        self.files.write().insert(file.table_id(), file);
    }

    /// # Errors
    /// `Error::TableNotFound` if no file is registered for `table_id`.
    pub fn get_database_file(&self, table_id: TableId) -> Result<Arc<dyn DbFile>> {
        self.files
            .read()
            .get(&table_id)
            .cloned()
            .ok_or(Error::TableNotFound(table_id))
    }

    /// Registered table ids in ascending order.
    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self.files.read().keys().copied().collect();
        ids.sort();
        ids
    }
}
