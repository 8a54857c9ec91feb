//! The client's credential cookies.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use reqwest::Url;

/// A cookie jar that can be emptied once the session is lost, so dead
/// credentials are not offered to the backend again.
#[derive(Debug, Default)]
pub struct SessionCookies {
    jar: RwLock<Arc<Jar>>,
}

impl SessionCookies {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Arc<Jar> {
        self.jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stores a cookie as if `url` had set it, e.g. one restored from a previous run.
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) {
        self.current().add_cookie_str(cookie, url);
    }

    /// Drops every stored cookie.
    pub fn clear(&self) {
        *self.jar.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(Jar::default());
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.current().set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.current().cookies(url)
    }
}
