// This module re-exports important pieces for convenience,
// so we can "use crate::config::*" easily.
pub mod api;
#[allow(clippy::module_inception)]
pub mod config;
pub mod logging;

pub use api::*;
pub use config::*;
pub use logging::*;
