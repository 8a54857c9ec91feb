use std::sync::Mutex;

use tracing::warn;

/// Moves the application to another entry point. Called when the session is
/// lost for good and the user has to sign in again.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Told when the client gives up on the current session.
pub trait SessionListener: Send + Sync {
    fn session_lost(&self);
}

/// Navigator for headless front ends: records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn redirect(&self, path: &str) {
        warn!(
            event_name = "session.redirect",
            event_domain = "session",
            target = path,
            "session lost, redirecting"
        );
    }
}

/// Keeps every redirect it is asked to perform.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(path.to_string());
        }
    }
}
