//! Outbound side: the identity endpoint and the core API.

pub mod oauth2;
pub mod upstream;

pub use oauth2::TokenManager;
pub use upstream::{Page, UpstreamClient};
