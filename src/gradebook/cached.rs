// Caching gradebook decorator.
// Serves columns from an in-memory mirror kept in step with confirmed writes.

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::cache::ColumnCache;
use crate::config::LtiConfig;
use crate::error::{GradebookError, Result};
use crate::lti::{LineItemApi, LineItemResult, LtiClient};

use super::facade::{validate_grade, validate_new_column};
use super::{Column, Grade, Gradebook, LtiGradebook};

/// Gradebook that caches the column list of an [`LtiGradebook`].
///
/// The first operation fills the cache with one listing; afterwards reads are
/// served locally and successful writes are applied to the cache once the
/// server has accepted them. Every operation holds one lock from the cache
/// fill through the cache update, so operations on the same instance are
/// serialized, remote calls included.
///
/// Changes made to the course by other clients are not observed.
pub struct CachedGradebook<A: LineItemApi = LtiClient> {
    inner: LtiGradebook<A>,
    cache: Mutex<ColumnCache>,
}

impl CachedGradebook<LtiClient> {
    /// Create a cached gradebook talking to the Moodle instance described by `config`.
    pub fn from_config(config: &LtiConfig) -> Result<Self> {
        Ok(Self::new(LtiGradebook::from_config(config)?))
    }
}

impl<A: LineItemApi> CachedGradebook<A> {
    pub fn new(inner: LtiGradebook<A>) -> Self {
        Self {
            inner,
            cache: Mutex::new(ColumnCache::new()),
        }
    }

    /// The wrapped, uncached gradebook.
    pub fn inner(&self) -> &LtiGradebook<A> {
        &self.inner
    }

    /// Acquire the cache lock, filling the cache first if needed.
    ///
    /// A failed fill leaves the cache unpopulated; the guard is dropped on
    /// every error path.
    async fn lock_populated(&self) -> Result<MutexGuard<'_, ColumnCache>> {
        let mut cache = self.cache.lock().await;
        if !cache.is_populated() {
            let columns = self.inner.list_columns().await?;
            debug!(count = columns.len(), "populated column cache");
            cache.populate(columns);
        }
        Ok(cache)
    }
}

#[async_trait]
impl<A: LineItemApi> Gradebook for CachedGradebook<A> {
    async fn list_columns(&self) -> Result<Vec<Column>> {
        let cache = self.lock_populated().await?;
        Ok(cache.snapshot())
    }

    async fn get_column(&self, id: u64) -> Result<Column> {
        let cache = self.lock_populated().await?;
        cache
            .get(id)
            .cloned()
            .ok_or(GradebookError::ColumnNotFound(id))
    }

    async fn create_column(
        &self,
        title: Option<&str>,
        maximum_score: f64,
        tag: Option<&str>,
    ) -> Result<Column> {
        validate_new_column(title, maximum_score)?;

        let mut cache = self.lock_populated().await?;
        let column = self.inner.create_column(title, maximum_score, tag).await?;
        cache.insert(column.clone());
        debug!(id = column.id(), "cached created column");
        Ok(column)
    }

    async fn update_column(&self, column: &Column) -> Result<()> {
        let mut cache = self.lock_populated().await?;
        if !cache.contains(column.id()) {
            return Err(GradebookError::ColumnNotFound(column.id()));
        }

        let updated = self.inner.submit_update(column).await?;
        debug!(id = updated.id(), "cached updated column");
        cache.insert(updated);
        Ok(())
    }

    async fn delete_column(&self, id: u64) -> Result<()> {
        let mut cache = self.lock_populated().await?;
        if !cache.contains(id) {
            return Err(GradebookError::ColumnNotFound(id));
        }

        self.inner.delete_column(id).await?;
        cache.remove(id);
        debug!(id, "removed column from cache");
        Ok(())
    }

    async fn set_grade(&self, column_id: u64, user_id: u64, grade: &Grade) -> Result<()> {
        validate_grade(grade)?;
        let column = self.get_column(column_id).await?;
        self.inner.submit_grade(&column, user_id, grade).await
    }

    async fn list_results(&self, column_id: u64) -> Result<Vec<LineItemResult>> {
        let column = self.get_column(column_id).await?;
        self.inner.list_results(column.id()).await
    }
}
