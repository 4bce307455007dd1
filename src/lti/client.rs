// Moodle LTI service HTTP client.
// Handles URL composition, request signing, and response status checking.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{
    Client, Method, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue, USER_AGENT},
};
use tracing::{debug, warn};

use crate::config::LtiConfig;
use crate::error::{GradebookError, RemoteApiError, Result};

use super::signing::{OAuth1Signer, RequestSigner};

const USER_AGENT_VALUE: &str = concat!("lti-gradebook/", env!("CARGO_PKG_VERSION"));

/// Client for the line item and score resources of one Moodle course.
///
/// Holds no per-call state, so a single instance can serve concurrent callers.
#[derive(Clone)]
pub struct LtiClient {
    client: Client,
    service_url: String,
    tool_type_id: u64,
    signer: Arc<dyn RequestSigner>,
}

impl LtiClient {
    /// Create a client that signs with the configured OAuth credentials.
    pub fn new(config: &LtiConfig) -> Result<Self> {
        let signer = OAuth1Signer::new(&config.consumer_key, &config.shared_secret);
        Self::with_signer(config, signer)
    }

    /// Create a client using a custom request signer.
    pub fn with_signer(config: &LtiConfig, signer: impl RequestSigner + 'static) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            service_url: format!(
                "{}/mod/lti/services.php/{}",
                config.base_url.trim_end_matches('/'),
                config.course_id
            ),
            tool_type_id: config.tool_type_id,
            signer: Arc::new(signer),
        })
    }

    /// Base URL of the course's LTI services.
    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// URL of the line item collection.
    pub fn line_items_url(&self) -> String {
        format!("{}/lineitems?type_id={}", self.service_url, self.tool_type_id)
    }

    /// Canonical URL of one line item; also its opaque id on the server.
    pub fn line_item_url(&self, id: u64) -> String {
        format!(
            "{}/lineitems/{}/lineitem?type_id={}",
            self.service_url, id, self.tool_type_id
        )
    }

    pub(crate) fn scores_url(&self, id: u64) -> String {
        format!(
            "{}/lineitems/{}/scores?type_id={}",
            self.service_url, id, self.tool_type_id
        )
    }

    pub(crate) fn results_url(&self, id: u64) -> String {
        format!(
            "{}/lineitems/{}/lineitem/results?type_id={}",
            self.service_url, id, self.tool_type_id
        )
    }

    /// Sign and send a request, returning the response body when the status
    /// is one of `expected`.
    ///
    /// With a body, `media_type` is sent as `Content-Type`; otherwise as `Accept`.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: &str,
        media_type: &'static str,
        body: Option<String>,
        expected: &[StatusCode],
    ) -> Result<String> {
        let url = Url::parse(url)
            .map_err(|e| GradebookError::Config(format!("invalid service URL `{}`: {}", url, e)))?;
        let body = body.unwrap_or_default();

        // The signature covers the exact bytes below; nothing may touch them afterwards.
        let authorization = self.signer.authorization(&method, &url, body.as_bytes())?;
        let authorization = HeaderValue::from_str(&authorization)
            .map_err(|e| GradebookError::Signing(e.to_string()))?;

        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(AUTHORIZATION, authorization);
        builder = if body.is_empty() {
            builder.header(ACCEPT, media_type)
        } else {
            builder
                .header(CONTENT_TYPE, media_type)
                .body(body.clone())
        };
        let request = builder.build()?;
        let request_headers = request.headers().clone();

        debug!(method = %method, url = %url, "sending LTI request");
        let response = self.client.execute(request).await?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let response_body = response.text().await?;

        if expected.contains(&status) {
            return Ok(response_body);
        }

        warn!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            "unexpected LTI response status"
        );
        Err(RemoteApiError {
            method,
            url: url.to_string(),
            status,
            expected: expected.to_vec(),
            request_headers,
            request_body: body,
            response_headers,
            response_body,
        }
        .into())
    }
}
