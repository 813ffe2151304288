//! Shared plumbing for the Twilio REST clients.

use crate::config::TwilioConfig;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} sent {code}: {message} (HTTP {status})")]
    Status {
        operation: &'static str,
        status: u16,
        code: String,
        message: String,
    },
    #[error("failed to parse {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Decode { .. } => None,
        }
    }

    /// The resource does not exist yet. Intelligence answers 404 for a
    /// transcript that was announced but has not propagated.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Account SID / auth token pair used for HTTP basic auth.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account_sid: String,
    pub auth_token: String,
}

impl Credentials {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
        }
    }

    pub fn from_config(config: &TwilioConfig) -> Self {
        Self::new(&config.account_sid, &config.auth_token)
    }

    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(&self.account_sid, Some(&self.auth_token))
    }
}

/// Body Twilio returns alongside a non-success status.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<serde_json::Value>,
    message: Option<String>,
}

pub(crate) fn http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.max(1)))
        .build()
        .context("Failed to build HTTP client")
}

/// Sends the request and decodes the body when the status is one of
/// `accepted`; anything else becomes [`RemoteError::Status`].
pub(crate) async fn send_json<T: DeserializeOwned>(
    operation: &'static str,
    request: reqwest::RequestBuilder,
    accepted: fn(u16) -> bool,
) -> Result<T, RemoteError> {
    let response = request
        .send()
        .await
        .map_err(|source| RemoteError::Transport { operation, source })?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|source| RemoteError::Transport { operation, source })?;

    if !accepted(status) {
        let error: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        return Err(RemoteError::Status {
            operation,
            status,
            code: error
                .code
                .map(|c| match c {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .unwrap_or_else(|| status.to_string()),
            message: error.message.unwrap_or(body),
        });
    }

    serde_json::from_str(&body).map_err(|source| RemoteError::Decode { operation, source })
}
