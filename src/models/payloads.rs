//! Request and response bodies exchanged with the `/auth` endpoints.

use serde::{Deserialize, Serialize};

use super::user::User;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignInData {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignUpData {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Second step of a Google sign-up; the backend already holds the pending
/// Google profile, so only the chosen display name and username are sent.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GoogleSignUpCompleteData {
    pub name: String,
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VerificationCodeData {
    pub code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EmailData {
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PasswordResetCodeData {
    pub email: String,
    pub code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetData {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Body of every endpoint that establishes or changes the session identity.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub user: User,
}

/// Seconds left before a throttled email may be sent again.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CooldownHint {
    #[serde(default)]
    pub retry_after_seconds: u64,
}

/// Profile captured from Google and parked server-side until the user
/// completes sign-up or confirms a link.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub google_id: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
