//! The single source of truth for who is signed in.
//!
//! A `SessionStore` is created once at startup and handed to every consumer
//! (usually as `Arc<SessionStore>`). It starts in a loading phase, resolves
//! the current identity exactly once, and from then on only changes through
//! its own operations or when the client reports the session as lost.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{watch, OnceCell};
use tracing::{debug, info, warn};

use crate::client::{ApiError, SessionClient, SessionListener};
use crate::models::{AuthResponse, GoogleSignUpCompleteData, SignInData, SignUpData, User};

/// What consumers observe: a complete identity or none, plus whether the
/// startup resolution is still pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            user: None,
            loading: true,
        }
    }
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Owns the write side of the session channel.
struct SessionState {
    tx: watch::Sender<Session>,
}

impl SessionState {
    fn set_user(&self, user: Option<User>) {
        self.tx.send_modify(|session| session.user = user);
    }

    fn resolve(&self, user: Option<User>) {
        self.tx.send_modify(|session| {
            session.user = user;
            session.loading = false;
        });
    }
}

impl SessionListener for SessionState {
    fn session_lost(&self) {
        if self.tx.borrow().user.is_some() {
            info!(
                event_name = "session.lost",
                event_domain = "session",
                "clearing current user after failed refresh"
            );
        }
        self.set_user(None);
    }
}

pub struct SessionStore {
    client: Arc<SessionClient>,
    state: Arc<SessionState>,
    resolved: OnceCell<()>,
}

impl SessionStore {
    pub fn new(client: Arc<SessionClient>) -> Self {
        let (tx, _) = watch::channel(Session::default());
        let state = Arc::new(SessionState { tx });
        client.add_listener(&state);

        SessionStore {
            client,
            state,
            resolved: OnceCell::new(),
        }
    }

    pub fn client(&self) -> &Arc<SessionClient> {
        &self.client
    }

    pub fn session(&self) -> Session {
        self.state.tx.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.tx.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.tx.borrow().loading
    }

    /// A receiver that is marked changed on every session update.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.tx.subscribe()
    }

    /// Resolves the current session. Only the first call talks to the
    /// backend; concurrent and later callers wait for and share its result.
    /// A missing or invalid session is not an error, just an anonymous user.
    pub async fn initialize(&self) -> Session {
        self.resolved
            .get_or_init(|| async {
                match self.client.me().await {
                    Ok(user) => {
                        info!("Resolved existing session for '{}'", user.username);
                        self.state.resolve(Some(user));
                    }
                    Err(err) => {
                        debug!("No existing session: {}", err);
                        self.state.resolve(None);
                    }
                }
            })
            .await;
        self.session()
    }

    /// Runs an identity-changing call; adopts the returned user only on success.
    async fn adopt<F>(&self, call: F) -> Result<User, ApiError>
    where
        F: Future<Output = Result<AuthResponse, ApiError>>,
    {
        let response = call.await?;
        self.state.set_user(Some(response.user.clone()));
        Ok(response.user)
    }

    pub async fn sign_in(&self, data: &SignInData) -> Result<User, ApiError> {
        self.adopt(self.client.sign_in(data)).await
    }

    pub async fn sign_up(&self, data: &SignUpData) -> Result<User, ApiError> {
        self.adopt(self.client.sign_up(data)).await
    }

    pub async fn google_sign_up_complete(
        &self,
        data: &GoogleSignUpCompleteData,
    ) -> Result<User, ApiError> {
        self.adopt(self.client.google_sign_up_complete(data)).await
    }

    pub async fn google_link_account(&self) -> Result<User, ApiError> {
        self.adopt(self.client.google_link_account()).await
    }

    /// Signs out locally no matter what the backend says.
    pub async fn sign_out(&self) {
        if let Err(err) = self.client.sign_out().await {
            warn!("Sign-out request failed, clearing session anyway: {}", err);
        }
        self.state.set_user(None);
    }

    /// Re-reads the identity after a change made elsewhere, such as a
    /// completed email verification. Any failure leaves the user signed out.
    pub async fn refresh_user(&self) -> Option<User> {
        let user = self.client.me().await.ok();
        self.state.set_user(user.clone());
        user
    }
}
