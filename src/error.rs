// Error types for the gradebook library.
// Covers argument validation, cache lookups, remote API failures, and configuration errors.

use std::fmt;

use reqwest::{Method, StatusCode, header::HeaderMap};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradebookError {
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: &'static str,
    },

    #[error("column {0} does not exist")]
    ColumnNotFound(u64),

    #[error(transparent)]
    RemoteApi(Box<RemoteApiError>),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot derive a numeric id from line item id `{0}`")]
    UntranslatableId(String),

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration file is not valid TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GradebookError {
    pub(crate) fn invalid_argument(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidArgument { field, reason }
    }

    /// True when the referenced column is unknown to the cache.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ColumnNotFound(_))
    }

    /// True when the caller passed a value rejected before any network call.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// The remote failure details, if the server answered with an unexpected status.
    pub fn remote(&self) -> Option<&RemoteApiError> {
        match self {
            Self::RemoteApi(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RemoteApiError> for GradebookError {
    fn from(err: RemoteApiError) -> Self {
        Self::RemoteApi(Box::new(err))
    }
}

/// An unexpected HTTP status from the LTI service, with everything needed to
/// diagnose the exchange offline.
#[derive(Debug, Clone)]
pub struct RemoteApiError {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub expected: Vec<StatusCode>,
    pub request_headers: HeaderMap,
    pub request_body: String,
    pub response_headers: HeaderMap,
    pub response_body: String,
}

impl fmt::Display for RemoteApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = self
            .expected
            .iter()
            .map(|s| s.as_u16().to_string())
            .collect::<Vec<_>>()
            .join("/");
        write!(
            f,
            "LTI API error: {} {} returned {} (expected {})",
            self.method, self.url, self.status, expected
        )?;
        if !self.response_body.is_empty() {
            write!(f, ": {}", self.response_body)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteApiError {}

pub type Result<T> = std::result::Result<T, GradebookError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn remote_error(body: &str) -> RemoteApiError {
        RemoteApiError {
            method: Method::DELETE,
            url: "https://moodle.test/mod/lti/services.php/2/lineitems/5/lineitem?type_id=1"
                .to_string(),
            status: StatusCode::OK,
            expected: vec![StatusCode::NO_CONTENT],
            request_headers: HeaderMap::new(),
            request_body: String::new(),
            response_headers: HeaderMap::new(),
            response_body: body.to_string(),
        }
    }

    #[test]
    fn test_remote_error_display() {
        let err = GradebookError::from(remote_error("gone"));
        let message = err.to_string();
        assert!(message.contains("DELETE"));
        assert!(message.contains("200 OK"));
        assert!(message.contains("expected 204"));
        assert!(message.ends_with(": gone"));
        assert!(err.remote().is_some());
    }

    #[test]
    fn test_remote_error_display_without_body() {
        let message = remote_error("").to_string();
        assert!(message.ends_with("(expected 204)"));
    }

    #[test]
    fn test_kind_helpers() {
        assert!(GradebookError::ColumnNotFound(3).is_not_found());
        assert!(GradebookError::invalid_argument("title", "must be present").is_invalid_argument());
        assert!(!GradebookError::Config("x".into()).is_not_found());
        assert!(GradebookError::Config("x".into()).remote().is_none());
    }
}
