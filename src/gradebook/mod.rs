// Gradebook abstraction over LTI line items.
// Defines the column/grade domain types and the operations shared by all gradebooks.

mod cached;
mod facade;
#[cfg(test)]
mod mock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::lti::{LineItem, LineItemResult};

pub use cached::CachedGradebook;
pub use facade::LtiGradebook;

/// Operations a hosting application may perform on a course gradebook.
#[async_trait]
pub trait Gradebook: Send + Sync {
    /// All columns, in no particular order.
    async fn list_columns(&self) -> Result<Vec<Column>>;

    /// A single column.
    async fn get_column(&self, id: u64) -> Result<Column>;

    /// Create a column owned by the gradebook's resource link.
    ///
    /// `title` must be present (it may be empty) and `maximum_score` must not
    /// be negative.
    async fn create_column(
        &self,
        title: Option<&str>,
        maximum_score: f64,
        tag: Option<&str>,
    ) -> Result<Column>;

    /// Submit local changes made to a column.
    async fn update_column(&self, column: &Column) -> Result<()>;

    /// Delete a column.
    async fn delete_column(&self, id: u64) -> Result<()>;

    /// Record a final grade for `user_id` in a column.
    async fn set_grade(&self, column_id: u64, user_id: u64, grade: &Grade) -> Result<()>;

    /// Results recorded so far for a column.
    async fn list_results(&self, column_id: u64) -> Result<Vec<LineItemResult>>;
}

/// A gradebook column: an editable view of a line item.
///
/// Edits stay local until passed to [`Gradebook::update_column`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    line_item: LineItem,
}

impl Column {
    pub fn id(&self) -> u64 {
        self.line_item.id
    }

    pub fn title(&self) -> &str {
        &self.line_item.label
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.line_item.label = title.into();
    }

    pub fn maximum_score(&self) -> f64 {
        self.line_item.score_maximum
    }

    pub fn set_maximum_score(&mut self, maximum_score: f64) {
        self.line_item.score_maximum = maximum_score;
    }

    pub fn tag(&self) -> Option<&str> {
        self.line_item.tag.as_deref()
    }

    pub fn set_tag(&mut self, tag: Option<String>) {
        self.line_item.tag = tag;
    }

    /// The underlying line item.
    pub fn line_item(&self) -> &LineItem {
        &self.line_item
    }
}

impl From<LineItem> for Column {
    fn from(line_item: LineItem) -> Self {
        Self { line_item }
    }
}

/// A grade to record for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub score: f64,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
}

impl Grade {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            ..Self::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

impl Default for Grade {
    fn default() -> Self {
        Self {
            score: 0.0,
            comment: String::new(),
            timestamp: Utc::now(),
        }
    }
}
