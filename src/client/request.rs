use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::endpoints::is_credential_endpoint;
use super::error::ApiError;

/// Whether a request is going out for the first time or being replayed after
/// a credential refresh. Replays never trigger another refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Original,
    Retry,
}

/// A backend call described as data, so it can be replayed after a refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Shared by the original and its retry so both show up under one id in logs.
    pub id: Uuid,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub attempt: Attempt,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            attempt: Attempt::Original,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// The replay of this request, sent once credentials were renewed.
    pub fn retry(&self) -> Self {
        ApiRequest {
            attempt: Attempt::Retry,
            ..self.clone()
        }
    }

    /// Only first attempts against non-credential endpoints may recover from a 401.
    pub fn recovers_from_unauthorized(&self) -> bool {
        self.attempt == Attempt::Original && !is_credential_endpoint(&self.path)
    }
}
