// Uncached gradebook backed directly by the LTI line item API.
// Validates arguments and maps columns and grades onto line items and scores.

use async_trait::async_trait;
use tracing::debug;

use crate::config::LtiConfig;
use crate::error::{GradebookError, Result};
use crate::lti::{
    ActivityProgress, GradingProgress, LineItem, LineItemApi, LineItemResult, LtiClient, Score,
};

use super::{Column, Grade, Gradebook};

/// Gradebook that forwards every operation to the LTI service.
pub struct LtiGradebook<A: LineItemApi = LtiClient> {
    api: A,
    resource_link_id: String,
}

impl LtiGradebook<LtiClient> {
    /// Create a gradebook talking to the Moodle instance described by `config`.
    pub fn from_config(config: &LtiConfig) -> Result<Self> {
        Ok(Self::new(
            LtiClient::new(config)?,
            config.resource_link_id.clone(),
        ))
    }
}

impl<A: LineItemApi> LtiGradebook<A> {
    pub fn new(api: A, resource_link_id: impl Into<String>) -> Self {
        Self {
            api,
            resource_link_id: resource_link_id.into(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn resource_link_id(&self) -> &str {
        &self.resource_link_id
    }

    /// Submit local changes to `column`; returns the column as the server now holds it.
    pub(crate) async fn submit_update(&self, column: &Column) -> Result<Column> {
        let sent = self.api.update_line_item(column.line_item()).await?;
        Ok(Column::from(sent))
    }

    /// Submit `grade` as a completed, fully graded score against `column`.
    pub(crate) async fn submit_grade(
        &self,
        column: &Column,
        user_id: u64,
        grade: &Grade,
    ) -> Result<()> {
        let score = Score {
            user_id: user_id.to_string(),
            score_given: grade.score,
            score_maximum: column.maximum_score(),
            comment: Some(grade.comment.clone()),
            timestamp: grade.timestamp,
            activity_progress: ActivityProgress::Completed,
            grading_progress: GradingProgress::FullyGraded,
        };
        debug!(column = column.id(), user = user_id, "submitting score");
        self.api.submit_score(column.id(), &score).await
    }
}

/// Check `create_column` arguments; returns the title.
pub(crate) fn validate_new_column(title: Option<&str>, maximum_score: f64) -> Result<&str> {
    let title =
        title.ok_or_else(|| GradebookError::invalid_argument("title", "must be present"))?;
    if maximum_score.is_nan() || maximum_score < 0.0 {
        return Err(GradebookError::invalid_argument(
            "maximum_score",
            "must not be negative",
        ));
    }
    Ok(title)
}

pub(crate) fn validate_grade(grade: &Grade) -> Result<()> {
    if grade.score.is_nan() || grade.score < 0.0 {
        return Err(GradebookError::invalid_argument(
            "score",
            "must not be negative",
        ));
    }
    Ok(())
}

#[async_trait]
impl<A: LineItemApi> Gradebook for LtiGradebook<A> {
    async fn list_columns(&self) -> Result<Vec<Column>> {
        let items = self.api.list_line_items().await?;
        Ok(items.into_iter().map(Column::from).collect())
    }

    async fn get_column(&self, id: u64) -> Result<Column> {
        self.api.get_line_item(id).await.map(Column::from)
    }

    async fn create_column(
        &self,
        title: Option<&str>,
        maximum_score: f64,
        tag: Option<&str>,
    ) -> Result<Column> {
        let title = validate_new_column(title, maximum_score)?;

        let line_item = LineItem {
            label: title.to_string(),
            score_maximum: maximum_score,
            tag: tag.map(str::to_string),
            resource_link_id: self.resource_link_id.clone(),
            ..Default::default()
        };
        let id = self.api.create_line_item(&line_item).await?;

        // Only the server's view of the new item is authoritative.
        self.get_column(id).await
    }

    async fn update_column(&self, column: &Column) -> Result<()> {
        self.submit_update(column).await?;
        Ok(())
    }

    async fn delete_column(&self, id: u64) -> Result<()> {
        self.api.delete_line_item(id).await
    }

    async fn set_grade(&self, column_id: u64, user_id: u64, grade: &Grade) -> Result<()> {
        validate_grade(grade)?;
        let column = self.get_column(column_id).await?;
        self.submit_grade(&column, user_id, grade).await
    }

    async fn list_results(&self, column_id: u64) -> Result<Vec<LineItemResult>> {
        self.api.list_results(column_id).await
    }
}
