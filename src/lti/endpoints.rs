// LTI line item and score endpoints.
// Provides the typed line item operations on top of the signed HTTP client.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use crate::error::Result;

use super::client::LtiClient;
use super::types::{
    LINE_ITEM_CONTAINER_MEDIA_TYPE, LINE_ITEM_MEDIA_TYPE, LineItem, LineItemResult,
    RESULT_CONTAINER_MEDIA_TYPE, SCORE_MEDIA_TYPE, Score,
};

const LIST_EXPECTED: &[StatusCode] = &[StatusCode::OK];
const GET_EXPECTED: &[StatusCode] = &[StatusCode::OK];
const CREATE_EXPECTED: &[StatusCode] = &[StatusCode::CREATED];
const UPDATE_EXPECTED: &[StatusCode] = &[StatusCode::OK];
const DELETE_EXPECTED: &[StatusCode] = &[StatusCode::NO_CONTENT];
const SCORE_EXPECTED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT];
const RESULTS_EXPECTED: &[StatusCode] = &[StatusCode::OK];

/// Line item operations of the LTI Assignment and Grade Services.
///
/// Every line item returned carries its numeric `id`; an opaque id that does
/// not embed one is reported as `UntranslatableId`.
#[async_trait]
pub trait LineItemApi: Send + Sync {
    /// List all line items of the course.
    async fn list_line_items(&self) -> Result<Vec<LineItem>>;

    /// Get a single line item.
    async fn get_line_item(&self, id: u64) -> Result<LineItem>;

    /// Create a line item and return its numeric id.
    async fn create_line_item(&self, line_item: &LineItem) -> Result<u64>;

    /// Replace the line item identified by `line_item.id`.
    ///
    /// Returns the line item as sent, with its canonical `resource_url`.
    async fn update_line_item(&self, line_item: &LineItem) -> Result<LineItem>;

    /// Delete a line item.
    async fn delete_line_item(&self, id: u64) -> Result<()>;

    /// Submit a score for one user.
    async fn submit_score(&self, line_item_id: u64, score: &Score) -> Result<()>;

    /// List the recorded results of a line item.
    async fn list_results(&self, line_item_id: u64) -> Result<Vec<LineItemResult>>;
}

#[async_trait]
impl LineItemApi for LtiClient {
    async fn list_line_items(&self) -> Result<Vec<LineItem>> {
        // TODO: follow `Link: rel="next"` headers once courses outgrow a single page.
        let body = self
            .send(
                Method::GET,
                &self.line_items_url(),
                LINE_ITEM_CONTAINER_MEDIA_TYPE,
                None,
                LIST_EXPECTED,
            )
            .await?;
        let items: Vec<LineItem> = serde_json::from_str(&body)?;
        items.into_iter().map(LineItem::with_numeric_id).collect()
    }

    async fn get_line_item(&self, id: u64) -> Result<LineItem> {
        let body = self
            .send(
                Method::GET,
                &self.line_item_url(id),
                LINE_ITEM_MEDIA_TYPE,
                None,
                GET_EXPECTED,
            )
            .await?;
        serde_json::from_str::<LineItem>(&body)?.with_numeric_id()
    }

    async fn create_line_item(&self, line_item: &LineItem) -> Result<u64> {
        let payload = serde_json::to_string(line_item)?;
        let body = self
            .send(
                Method::POST,
                &self.line_items_url(),
                LINE_ITEM_MEDIA_TYPE,
                Some(payload),
                CREATE_EXPECTED,
            )
            .await?;
        let created: LineItem = serde_json::from_str(&body)?;
        Ok(created.with_numeric_id()?.id)
    }

    async fn update_line_item(&self, line_item: &LineItem) -> Result<LineItem> {
        let url = self.line_item_url(line_item.id);
        let outgoing = LineItem {
            resource_url: Some(url.clone()),
            ..line_item.clone()
        };
        let payload = serde_json::to_string(&outgoing)?;
        self.send(
            Method::PUT,
            &url,
            LINE_ITEM_MEDIA_TYPE,
            Some(payload),
            UPDATE_EXPECTED,
        )
        .await?;
        Ok(outgoing)
    }

    async fn delete_line_item(&self, id: u64) -> Result<()> {
        self.send(
            Method::DELETE,
            &self.line_item_url(id),
            LINE_ITEM_MEDIA_TYPE,
            None,
            DELETE_EXPECTED,
        )
        .await?;
        Ok(())
    }

    async fn submit_score(&self, line_item_id: u64, score: &Score) -> Result<()> {
        let payload = serde_json::to_string(score)?;
        self.send(
            Method::POST,
            &self.scores_url(line_item_id),
            SCORE_MEDIA_TYPE,
            Some(payload),
            SCORE_EXPECTED,
        )
        .await?;
        Ok(())
    }

    async fn list_results(&self, line_item_id: u64) -> Result<Vec<LineItemResult>> {
        let body = self
            .send(
                Method::GET,
                &self.results_url(line_item_id),
                RESULT_CONTAINER_MEDIA_TYPE,
                None,
                RESULTS_EXPECTED,
            )
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}
