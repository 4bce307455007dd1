// Moodle LTI services module.
// Provides the signed client, line item endpoints and wire types.

pub mod client;
pub mod endpoints;
pub mod signing;
pub mod types;

pub use client::LtiClient;
pub use endpoints::LineItemApi;
pub use signing::{OAuth1Signer, RequestSigner};
pub use types::*;
