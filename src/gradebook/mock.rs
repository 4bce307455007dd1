// In-memory stand-in for the Moodle line item service.
// Used by gradebook tests to observe remote calls and inject failures.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, header::HeaderMap};

use crate::error::{GradebookError, RemoteApiError, Result};
use crate::lti::{LineItem, LineItemApi, LineItemResult, Score};

use super::Gradebook;

/// Number of remote calls made, per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub score: usize,
    pub results: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list + self.get + self.create + self.update + self.delete + self.score + self.results
    }
}

#[derive(Default)]
struct State {
    next_id: u64,
    items: BTreeMap<u64, LineItem>,
    scores: Vec<(u64, Score)>,
    calls: CallCounts,
    fail_next: bool,
}

/// Simulates the remote server.
#[derive(Default)]
pub struct MockLineItemApi {
    state: Mutex<State>,
}

fn remote_error(method: Method, status: StatusCode) -> GradebookError {
    RemoteApiError {
        method,
        url: "mock://lineitems".to_string(),
        status,
        expected: vec![StatusCode::OK],
        request_headers: HeaderMap::new(),
        request_body: String::new(),
        response_headers: HeaderMap::new(),
        response_body: String::new(),
    }
    .into()
}

fn item_url(id: u64) -> String {
    format!("https://moodle.test/mod/lti/services.php/1/lineitems/{id}/lineitem?type_id=1")
}

impl MockLineItemApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().unwrap().calls
    }

    pub fn scores(&self) -> Vec<(u64, Score)> {
        self.state.lock().unwrap().scores.clone()
    }

    /// Make the next call fail with a server error.
    pub fn fail_next(&self) {
        self.state.lock().unwrap().fail_next = true;
    }

    /// Create a line item as another client of the same course would.
    pub fn insert_remote(&self, label: &str) -> u64 {
        let mut state = self.state.lock().unwrap();
        Self::store(&mut state, LineItem {
            label: label.to_string(),
            ..Default::default()
        })
    }

    fn store(state: &mut State, mut item: LineItem) -> u64 {
        state.next_id += 1;
        let id = state.next_id;
        item.id = id;
        item.resource_url = Some(item_url(id));
        state.items.insert(id, item);
        id
    }

    /// Count the call and apply a pending injected failure.
    fn begin(
        &self,
        method: Method,
        count: impl FnOnce(&mut CallCounts),
    ) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        count(&mut state.calls);
        if std::mem::take(&mut state.fail_next) {
            return Err(remote_error(method, StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(state)
    }
}

#[async_trait]
impl LineItemApi for MockLineItemApi {
    async fn list_line_items(&self) -> Result<Vec<LineItem>> {
        let state = self.begin(Method::GET, |c| c.list += 1)?;
        Ok(state.items.values().cloned().collect())
    }

    async fn get_line_item(&self, id: u64) -> Result<LineItem> {
        let state = self.begin(Method::GET, |c| c.get += 1)?;
        state
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| remote_error(Method::GET, StatusCode::NOT_FOUND))
    }

    async fn create_line_item(&self, line_item: &LineItem) -> Result<u64> {
        let mut state = self.begin(Method::POST, |c| c.create += 1)?;
        Ok(Self::store(&mut state, line_item.clone()))
    }

    async fn update_line_item(&self, line_item: &LineItem) -> Result<LineItem> {
        let mut state = self.begin(Method::PUT, |c| c.update += 1)?;
        let stored = state
            .items
            .get_mut(&line_item.id)
            .ok_or_else(|| remote_error(Method::PUT, StatusCode::NOT_FOUND))?;
        *stored = LineItem {
            resource_url: Some(item_url(line_item.id)),
            ..line_item.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_line_item(&self, id: u64) -> Result<()> {
        let mut state = self.begin(Method::DELETE, |c| c.delete += 1)?;
        state
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| remote_error(Method::DELETE, StatusCode::NOT_FOUND))
    }

    async fn submit_score(&self, line_item_id: u64, score: &Score) -> Result<()> {
        let mut state = self.begin(Method::POST, |c| c.score += 1)?;
        if !state.items.contains_key(&line_item_id) {
            return Err(remote_error(Method::POST, StatusCode::NOT_FOUND));
        }
        state.scores.push((line_item_id, score.clone()));
        Ok(())
    }

    async fn list_results(&self, line_item_id: u64) -> Result<Vec<LineItemResult>> {
        let state = self.begin(Method::GET, |c| c.results += 1)?;
        Ok(state
            .scores
            .iter()
            .filter(|(id, _)| *id == line_item_id)
            .map(|(_, score)| LineItemResult {
                id: None,
                score_of: Some(item_url(line_item_id)),
                user_id: score.user_id.clone(),
                result_score: Some(score.score_given),
                result_maximum: Some(score.score_maximum),
                comment: score.comment.clone(),
            })
            .collect())
    }
}

/// Create, read and delete columns on an empty gradebook.
///
/// Shared by the plain and the cached gradebook tests.
pub async fn column_management(gradebook: &impl Gradebook) {
    assert!(gradebook.list_columns().await.unwrap().is_empty());

    assert!(
        gradebook
            .create_column(None, 1.0, None)
            .await
            .unwrap_err()
            .is_invalid_argument()
    );
    assert!(
        gradebook
            .create_column(Some("col"), -10.0, None)
            .await
            .unwrap_err()
            .is_invalid_argument()
    );

    let col1 = gradebook.create_column(Some("col1"), 100.0, None).await.unwrap();
    assert_eq!(col1.title(), "col1");
    assert_eq!(col1.maximum_score(), 100.0);
    assert_eq!(col1.tag(), None);

    let col1_fetched = gradebook.get_column(col1.id()).await.unwrap();
    assert_eq!(col1_fetched.title(), "col1");
    assert_eq!(col1_fetched.maximum_score(), 100.0);
    assert_eq!(col1_fetched.tag(), None);

    let col2 = gradebook
        .create_column(Some(""), 0.0, Some("tag2"))
        .await
        .unwrap();
    assert_eq!(col2.title(), "");
    assert_eq!(col2.maximum_score(), 0.0);
    assert_eq!(col2.tag(), Some("tag2"));

    let col2_fetched = gradebook.get_column(col2.id()).await.unwrap();
    assert_eq!(col2_fetched, col2);

    assert_eq!(gradebook.list_columns().await.unwrap().len(), 2);

    gradebook.delete_column(col1.id()).await.unwrap();
    assert_eq!(gradebook.list_columns().await.unwrap().len(), 1);

    assert!(gradebook.get_column(col1.id()).await.is_err());
}
