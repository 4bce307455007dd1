// Moodle LTI gradebook client.
// Exposes plain and cached gradebooks over OAuth-signed line item services.

pub mod cache;
pub mod config;
pub mod error;
pub mod gradebook;
pub mod lti;

pub use config::LtiConfig;
pub use error::{GradebookError, RemoteApiError, Result};
pub use gradebook::{CachedGradebook, Column, Grade, Gradebook, LtiGradebook};
pub use lti::{LineItem, LineItemApi, LineItemResult, LtiClient, OAuth1Signer, RequestSigner};
