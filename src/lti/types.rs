// LTI Assignment and Grade Services wire types.
// Defines line items, scores and results as exchanged with the Moodle LTI service.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GradebookError, Result};

/// Media type of a line item list.
pub const LINE_ITEM_CONTAINER_MEDIA_TYPE: &str = "application/vnd.ims.lis.v2.lineitemcontainer+json";
/// Media type of a single line item.
pub const LINE_ITEM_MEDIA_TYPE: &str = "application/vnd.ims.lis.v2.lineitem+json";
/// Media type of a score submission.
pub const SCORE_MEDIA_TYPE: &str = "application/vnd.ims.lis.v1.score+json";
/// Media type of a result list.
pub const RESULT_CONTAINER_MEDIA_TYPE: &str = "application/vnd.ims.lis.v2.resultcontainer+json";

static LINE_ITEM_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"services\.php/[0-9]+/lineitems/([0-9]+)/lineitem").expect("line item id pattern")
});

/// Extract the numeric id embedded in a URL-shaped line item id.
///
/// `https://moodle/mod/lti/services.php/4/lineitems/17/lineitem?type_id=2` yields `17`.
pub fn numeric_line_item_id(opaque_id: &str) -> Result<u64> {
    LINE_ITEM_ID
        .captures(opaque_id)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| GradebookError::UntranslatableId(opaque_id.to_string()))
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

/// A gradebook line item (one column).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Numeric id derived from `resource_url`; never sent over the wire.
    #[serde(skip)]
    pub id: u64,
    /// The server's canonical, URL-shaped identifier.
    #[serde(rename = "id", default, skip_serializing_if = "is_blank")]
    pub resource_url: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub score_maximum: f64,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_link_id: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub lti_link_id: Option<String>,
}

impl LineItem {
    /// Fill in `id` from the opaque identifier the server returned.
    pub fn with_numeric_id(mut self) -> Result<Self> {
        let opaque = self.resource_url.as_deref().unwrap_or_default();
        self.id = numeric_line_item_id(opaque)?;
        Ok(self)
    }
}

/// Learner progress reported with a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityProgress {
    Initialized,
    Started,
    InProgress,
    Submitted,
    Completed,
}

/// Grading progress reported with a score.
///
/// Moodle only records `score_given` when this is `FullyGraded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradingProgress {
    NotReady,
    Failed,
    Pending,
    PendingManual,
    FullyGraded,
}

/// A score submission for one user in one line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub user_id: String,
    pub score_given: f64,
    pub score_maximum: f64,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub comment: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub activity_progress: ActivityProgress,
    pub grading_progress: GradingProgress,
}

/// A recorded result as listed by the results service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub score_of: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub result_score: Option<f64>,
    #[serde(default)]
    pub result_maximum: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
}
