//! Authenticated calls against the artefolio backend.
//!
//! Credentials are httponly cookies kept in the client's cookie jar, so
//! callers never handle them. When an access cookie expires the backend
//! answers 401; the client then refreshes once (see [`RefreshCoordinator`])
//! and replays every request that was rejected meanwhile.

use std::sync::{Arc, Mutex, Weak};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::cookies::SessionCookies;
use super::endpoints;
use super::error::{ApiError, ErrorBody, RefreshFailure};
use super::navigator::{Navigator, SessionListener, TracingNavigator};
use super::refresh::{RefreshCoordinator, Ticket};
use super::request::ApiRequest;
use crate::config::ApiConfig;
use crate::models::{
    AuthResponse, CooldownHint, EmailData, GoogleProfile, GoogleSignUpCompleteData,
    PasswordResetCodeData, PasswordResetData, SignInData, SignUpData, User, VerificationCodeData,
};

pub struct SessionClientBuilder {
    config: ApiConfig,
    cookies: Option<Arc<SessionCookies>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl SessionClientBuilder {
    /// Share an existing cookie store, e.g. one restored from a previous run.
    pub fn cookies(mut self, cookies: Arc<SessionCookies>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn build(self) -> Result<SessionClient, ApiError> {
        let cookies = self.cookies.unwrap_or_default();
        let http = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            .timeout(self.config.timeout())
            .build()?;

        info!(
            "Creating SessionClient for '{}', sign-in entry point '{}'",
            self.config.base_url, self.config.sign_in_path
        );

        Ok(SessionClient {
            http,
            base_url: self.config.base_url.trim_end_matches('/').to_string(),
            sign_in_path: self.config.sign_in_path,
            cookies,
            refresh: RefreshCoordinator::new(),
            navigator: self
                .navigator
                .unwrap_or_else(|| Arc::new(TracingNavigator)),
            listeners: Mutex::new(Vec::new()),
        })
    }
}

pub struct SessionClient {
    http: reqwest::Client,
    base_url: String,
    sign_in_path: String,
    cookies: Arc<SessionCookies>,
    refresh: RefreshCoordinator,
    navigator: Arc<dyn Navigator>,
    listeners: Mutex<Vec<Weak<dyn SessionListener>>>,
}

/// Empty 2xx bodies decode like a JSON `null`.
fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, ApiError> {
    let raw = if raw.trim().is_empty() { "null" } else { raw };
    Ok(serde_json::from_str(raw)?)
}

impl SessionClient {
    pub fn builder(config: ApiConfig) -> SessionClientBuilder {
        SessionClientBuilder {
            config,
            cookies: None,
            navigator: None,
        }
    }

    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        Self::builder(config).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registers a listener told when the session is lost. Held weakly, so a
    /// dropped listener is simply skipped.
    pub fn add_listener<L: SessionListener + 'static>(&self, listener: &Arc<L>) {
        let weak: Weak<dyn SessionListener> = Arc::downgrade(listener) as Weak<dyn SessionListener>;
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(weak);
        }
    }

    /// Sends `request` and decodes the 2xx body into `T`, recovering once from
    /// an expired access credential.
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let raw = self.execute(request).await?;
        decode(&raw)
    }

    /// Like [`request`](Self::request) for calls whose success body carries
    /// nothing the caller needs; it is not decoded at all.
    pub async fn call(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await.map(drop)
    }

    async fn execute(&self, request: ApiRequest) -> Result<String, ApiError> {
        let sent_generation = self.refresh.generation();
        match self.send(&request).await {
            Err(err) if err.is_unauthorized() && request.recovers_from_unauthorized() => {
                self.recover(request, sent_generation).await
            }
            other => other,
        }
    }

    async fn send(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(
            request_id = %request.id,
            attempt = ?request.attempt,
            "{} {}",
            request.method,
            url
        );

        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let raw = response.text().await?;
        if status.is_success() {
            Ok(raw)
        } else {
            debug!(request_id = %request.id, status = status.as_u16(), "request rejected");
            Err(ApiError::Http {
                method: request.method.clone(),
                status,
                body: ErrorBody::from_response(status, &raw),
            })
        }
    }

    async fn recover(&self, request: ApiRequest, sent_generation: u64) -> Result<String, ApiError> {
        let retry = request.retry();
        match self.refresh.join(sent_generation) {
            Ticket::Renewed => {
                debug!(request_id = %request.id, "credentials already renewed, retrying");
                self.send(&retry).await
            }
            Ticket::Expired(failure) => {
                debug!(request_id = %request.id, "session already expired");
                Err(ApiError::SessionExpired(failure))
            }
            Ticket::Wait(outcome) => match outcome.await {
                Ok(Ok(())) => self.send(&retry).await,
                Ok(Err(failure)) => Err(ApiError::SessionExpired(failure)),
                Err(_) => Err(ApiError::RefreshAbandoned),
            },
            Ticket::Lead(lease) => match self.send(&ApiRequest::post(endpoints::REFRESH)).await {
                Ok(_) => {
                    let released = lease.settle(Ok(()));
                    info!(
                        event_name = "session.refresh.succeeded",
                        event_domain = "session",
                        request_id = %request.id,
                        released,
                        "credentials refreshed"
                    );
                    self.send(&retry).await
                }
                Err(err) => {
                    let failure = RefreshFailure::from(&err);
                    let released = lease.settle(Err(failure.clone()));
                    warn!(
                        event_name = "session.refresh.failed",
                        event_domain = "session",
                        request_id = %request.id,
                        released,
                        error = %err,
                        "credential refresh failed"
                    );
                    self.end_session();
                    Err(ApiError::SessionExpired(failure))
                }
            },
        }
    }

    /// The session is gone for good: forget its cookies, send the app to
    /// sign-in and tell listeners.
    fn end_session(&self) {
        self.cookies.clear();
        self.navigator.redirect(&self.sign_in_path);

        let listeners: Vec<Arc<dyn SessionListener>> = match self.listeners.lock() {
            Ok(mut listeners) => {
                listeners.retain(|l| l.strong_count() > 0);
                listeners.iter().filter_map(Weak::upgrade).collect()
            }
            Err(_) => Vec::new(),
        };
        for listener in listeners {
            listener.session_lost();
        }
    }

    // -- Credential endpoints

    pub async fn sign_in(&self, data: &SignInData) -> Result<AuthResponse, ApiError> {
        self.request(ApiRequest::post(endpoints::SIGN_IN).json(data)?)
            .await
    }

    pub async fn sign_up(&self, data: &SignUpData) -> Result<AuthResponse, ApiError> {
        self.request(ApiRequest::post(endpoints::SIGN_UP).json(data)?)
            .await
    }

    pub async fn sign_out(&self) -> Result<(), ApiError> {
        self.call(ApiRequest::post(endpoints::SIGN_OUT)).await
    }

    /// Asks the backend to rotate the session cookies.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.call(ApiRequest::post(endpoints::REFRESH)).await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let response: AuthResponse = self.request(ApiRequest::get(endpoints::ME)).await?;
        Ok(response.user)
    }

    // -- Google

    /// Where the browser goes to start a Google sign-in or sign-up.
    pub fn google_auth_url(&self) -> String {
        format!("{}{}", self.base_url, endpoints::GOOGLE)
    }

    pub async fn google_pending_sign_up(&self) -> Result<Option<GoogleProfile>, ApiError> {
        self.request(ApiRequest::get(endpoints::GOOGLE_PENDING_SIGN_UP))
            .await
    }

    pub async fn clear_google_pending_sign_up(&self) -> Result<(), ApiError> {
        self.call(ApiRequest::delete(endpoints::GOOGLE_PENDING_SIGN_UP))
            .await
    }

    pub async fn google_sign_up_complete(
        &self,
        data: &GoogleSignUpCompleteData,
    ) -> Result<AuthResponse, ApiError> {
        self.request(ApiRequest::post(endpoints::GOOGLE_SIGN_UP_COMPLETE).json(data)?)
            .await
    }

    pub async fn google_pending_link(&self) -> Result<Option<GoogleProfile>, ApiError> {
        self.request(ApiRequest::get(endpoints::GOOGLE_PENDING_LINK))
            .await
    }

    pub async fn clear_google_pending_link(&self) -> Result<(), ApiError> {
        self.call(ApiRequest::delete(endpoints::GOOGLE_PENDING_LINK))
            .await
    }

    pub async fn google_link_account(&self) -> Result<AuthResponse, ApiError> {
        self.request(ApiRequest::post(endpoints::GOOGLE_LINK_ACCOUNT))
            .await
    }

    // -- Email verification

    pub async fn verify_email_code(&self, code: &str) -> Result<(), ApiError> {
        let data = VerificationCodeData {
            code: code.to_string(),
        };
        self.call(ApiRequest::post(endpoints::VERIFY_EMAIL_CODE).json(&data)?)
            .await
    }

    pub async fn resend_verification_email(&self, email: &str) -> Result<(), ApiError> {
        let data = EmailData {
            email: email.to_string(),
        };
        self.call(ApiRequest::post(endpoints::RESEND_VERIFICATION_EMAIL).json(&data)?)
            .await
    }

    pub async fn verification_email_cooldown(&self) -> Result<CooldownHint, ApiError> {
        self.request(ApiRequest::get(endpoints::VERIFICATION_EMAIL_COOLDOWN))
            .await
    }

    // -- Password reset

    pub async fn send_password_reset_email(&self, email: &str) -> Result<(), ApiError> {
        let data = EmailData {
            email: email.to_string(),
        };
        self.call(ApiRequest::post(endpoints::SEND_PASSWORD_RESET_EMAIL).json(&data)?)
            .await
    }

    pub async fn verify_password_reset_code(&self, email: &str, code: &str) -> Result<(), ApiError> {
        let data = PasswordResetCodeData {
            email: email.to_string(),
            code: code.to_string(),
        };
        self.call(ApiRequest::post(endpoints::VERIFY_PASSWORD_RESET_CODE).json(&data)?)
            .await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let data = PasswordResetData {
            email: email.to_string(),
            code: code.to_string(),
            new_password: new_password.to_string(),
        };
        self.call(ApiRequest::post(endpoints::RESET_PASSWORD).json(&data)?)
            .await
    }

    pub async fn password_reset_cooldown(&self, email: &str) -> Result<CooldownHint, ApiError> {
        self.request(ApiRequest::get(endpoints::PASSWORD_RESET_COOLDOWN).query("email", email))
            .await
    }
}
