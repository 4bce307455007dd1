// Connection settings for the Moodle LTI services.
// Loaded from a TOML file and overridden by LTI_* environment variables.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use reqwest::Url;
use serde::Deserialize;

use crate::error::{GradebookError, Result};

/// Default request timeout: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings needed to reach one course's gradebook through one tool placement.
#[derive(Clone, PartialEq, Eq)]
pub struct LtiConfig {
    /// URL of the Moodle instance.
    pub base_url: String,
    /// Moodle course the line items belong to.
    pub course_id: u64,
    /// External tool definition id (`type_id` query parameter).
    pub tool_type_id: u64,
    /// Tool placement that owns created line items.
    pub resource_link_id: String,
    /// OAuth consumer key.
    pub consumer_key: String,
    /// OAuth shared secret.
    pub shared_secret: String,
    /// Transport timeout per request.
    pub timeout_secs: u64,
}

impl fmt::Debug for LtiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LtiConfig")
            .field("base_url", &self.base_url)
            .field("course_id", &self.course_id)
            .field("tool_type_id", &self.tool_type_id)
            .field("resource_link_id", &self.resource_link_id)
            .field("consumer_key", &self.consumer_key)
            .field("shared_secret", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LtiConfig {
    pub fn new(
        base_url: impl Into<String>,
        course_id: u64,
        tool_type_id: u64,
        resource_link_id: impl Into<String>,
        consumer_key: impl Into<String>,
        shared_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            course_id,
            tool_type_id,
            resource_link_id: resource_link_id.into(),
            consumer_key: consumer_key.into(),
            shared_secret: shared_secret.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Load settings from `path` (or the default config file, if present),
    /// then apply `LTI_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let raw = match path {
            Some(path) => RawConfig::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => RawConfig::from_file(&path)?,
                _ => RawConfig::default(),
            },
        };
        raw.overlay(|key| std::env::var(key).ok())?.build()
    }
}

/// Path of the default config file (e.g. ~/.config/lti-gradebook/config.toml).
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "lti-gradebook").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Partially specified settings, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    base_url: Option<String>,
    course_id: Option<u64>,
    tool_type_id: Option<u64>,
    resource_link_id: Option<String>,
    consumer_key: Option<String>,
    shared_secret: Option<String>,
    timeout_secs: Option<u64>,
}

impl RawConfig {
    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply overrides from an environment-style lookup.
    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let number = |key: &str| -> Result<Option<u64>> {
            lookup(key)
                .map(|value| {
                    value.trim().parse().map_err(|_| {
                        GradebookError::Config(format!(
                            "{} must be a non-negative integer, got `{}`",
                            key, value
                        ))
                    })
                })
                .transpose()
        };

        if let Some(v) = lookup("LTI_BASE_URL") {
            self.base_url = Some(v);
        }
        if let Some(v) = number("LTI_COURSE_ID")? {
            self.course_id = Some(v);
        }
        if let Some(v) = number("LTI_TOOL_TYPE_ID")? {
            self.tool_type_id = Some(v);
        }
        if let Some(v) = lookup("LTI_RESOURCE_LINK_ID") {
            self.resource_link_id = Some(v);
        }
        if let Some(v) = lookup("LTI_CONSUMER_KEY") {
            self.consumer_key = Some(v);
        }
        if let Some(v) = lookup("LTI_SHARED_SECRET") {
            self.shared_secret = Some(v);
        }
        if let Some(v) = number("LTI_TIMEOUT_SECS")? {
            self.timeout_secs = Some(v);
        }
        Ok(self)
    }

    fn build(self) -> Result<LtiConfig> {
        let base_url = required(self.base_url, "base_url", "LTI_BASE_URL")?;
        Url::parse(&base_url).map_err(|e| {
            GradebookError::Config(format!("base_url `{}` is not a valid URL: {}", base_url, e))
        })?;
        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(GradebookError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(LtiConfig {
            base_url,
            course_id: required(self.course_id, "course_id", "LTI_COURSE_ID")?,
            tool_type_id: required(self.tool_type_id, "tool_type_id", "LTI_TOOL_TYPE_ID")?,
            resource_link_id: required(
                self.resource_link_id,
                "resource_link_id",
                "LTI_RESOURCE_LINK_ID",
            )?,
            consumer_key: required(self.consumer_key, "consumer_key", "LTI_CONSUMER_KEY")?,
            shared_secret: required(self.shared_secret, "shared_secret", "LTI_SHARED_SECRET")?,
            timeout_secs,
        })
    }
}

fn required<T>(value: Option<T>, field: &str, env: &str) -> Result<T> {
    value.ok_or_else(|| {
        GradebookError::Config(format!(
            "missing `{}` (set it in the config file or via {})",
            field, env
        ))
    })
}
