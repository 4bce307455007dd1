// Column cache store.
// Holds the mirrored column set and tracks when it was populated.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::gradebook::Column;

/// In-memory mirror of the server's columns, keyed by column id.
///
/// Starts unpopulated. Once populated it stays populated and changes only
/// through [`insert`](Self::insert) and [`remove`](Self::remove). Entries are
/// owned by the cache; callers only ever receive clones.
#[derive(Debug, Default)]
pub struct ColumnCache {
    columns: HashMap<u64, Column>,
    populated_at: Option<DateTime<Utc>>,
}

impl ColumnCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cache has been filled from the server.
    pub fn is_populated(&self) -> bool {
        self.populated_at.is_some()
    }

    /// When the cache was filled.
    pub fn populated_at(&self) -> Option<DateTime<Utc>> {
        self.populated_at
    }

    /// Replace the contents with a complete column listing.
    pub fn populate(&mut self, columns: impl IntoIterator<Item = Column>) {
        self.columns = columns.into_iter().map(|c| (c.id(), c)).collect();
        self.populated_at = Some(Utc::now());
    }

    pub fn get(&self, id: u64) -> Option<&Column> {
        self.columns.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.columns.contains_key(&id)
    }

    /// Insert or replace a column.
    pub fn insert(&mut self, column: Column) {
        self.columns.insert(column.id(), column);
    }

    pub fn remove(&mut self, id: u64) -> Option<Column> {
        self.columns.remove(&id)
    }

    /// Copies of all columns, ordered by id.
    pub fn snapshot(&self) -> Vec<Column> {
        let mut columns: Vec<Column> = self.columns.values().cloned().collect();
        columns.sort_by_key(Column::id);
        columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
