//! The session client: HTTP access to the backend with transparent recovery
//! from expired credentials.

pub mod cookies;
pub mod endpoints;
pub mod error;
pub mod navigator;
pub mod refresh;
pub mod request;
pub mod session_client;

// Re-export the primary client items so callers can do
// "use crate::client::{SessionClient, ApiError};"
pub use cookies::SessionCookies;
pub use error::{ApiError, Conflict, ErrorBody, RefreshFailure};
pub use navigator::{Navigator, RecordingNavigator, SessionListener, TracingNavigator};
pub use request::{ApiRequest, Attempt};
pub use session_client::{SessionClient, SessionClientBuilder};
