use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Messages the backend uses when a parked Google sign-up no longer exists.
const PENDING_SIGN_UP_GONE: [&str; 2] = [
    "No pending signup found",
    "Invalid or expired pending signup",
];

/// Structured error body returned by the backend on any non-2xx reply.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
    /// Machine-readable error kind, e.g. "Conflict" or "Too Many Requests".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

impl ErrorBody {
    /// Parses a raw response body, falling back to the status reason when the
    /// backend (or a proxy in front of it) did not answer with JSON.
    pub fn from_response(status: StatusCode, raw: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(raw) {
            Ok(body) if !body.message.is_empty() => body,
            Ok(body) => ErrorBody {
                message: fallback_message(status),
                ..body
            },
            Err(_) => ErrorBody {
                message: fallback_message(status),
                ..Default::default()
            },
        }
    }
}

fn fallback_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Why a credential refresh failed. Cloned to every request queued behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    pub status: Option<StatusCode>,
    pub message: String,
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status.as_u16()),
            None => f.write_str(&self.message),
        }
    }
}

impl From<&ApiError> for RefreshFailure {
    fn from(err: &ApiError) -> Self {
        RefreshFailure {
            status: err.status(),
            message: err.message(),
        }
    }
}

/// Which uniqueness constraint a 409 reply refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    Email,
    Username,
    Other(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed before a response was received: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{method} {status}: {}", .body.message)]
    Http {
        method: reqwest::Method,
        status: StatusCode,
        body: ErrorBody,
    },

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session expired: {0}")]
    SessionExpired(RefreshFailure),

    #[error("credential refresh was abandoned before it settled")]
    RefreshAbandoned,
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            ApiError::SessionExpired(failure) => failure.status,
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Http { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Human-readable message, preferring the one sent by the backend.
    pub fn message(&self) -> String {
        match self {
            ApiError::Http { body, .. } => body.message.clone(),
            ApiError::SessionExpired(failure) => failure.message.clone(),
            other => other.to_string(),
        }
    }

    /// Throttling hint attached to rate-limited replies.
    pub fn retry_after(&self) -> Option<Duration> {
        self.body()
            .and_then(|b| b.retry_after_seconds)
            .map(Duration::from_secs)
    }

    /// Classifies a 409 by what the message mentions. Email wins when both do.
    pub fn conflict(&self) -> Option<Conflict> {
        match self {
            ApiError::Http { status, body, .. } if *status == StatusCode::CONFLICT => {
                let message = body.message.to_lowercase();
                if message.contains("email") {
                    Some(Conflict::Email)
                } else if message.contains("username") {
                    Some(Conflict::Username)
                } else {
                    Some(Conflict::Other(body.message.clone()))
                }
            }
            _ => None,
        }
    }

    /// True when a Google sign-up completion failed because the parked
    /// profile expired, meaning the flow must restart from sign-up.
    pub fn is_pending_sign_up_gone(&self) -> bool {
        match self {
            ApiError::Http { status, body, .. } if *status == StatusCode::BAD_REQUEST => {
                PENDING_SIGN_UP_GONE.contains(&body.message.as_str())
            }
            _ => false,
        }
    }
}
