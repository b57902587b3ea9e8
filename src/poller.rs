use std::time::Duration;

use crate::credentials::read_access_token;
use crate::models::{UsageData, UsageResponse};

pub const API_URL: &str = "https://api.anthropic.com/api/oauth/usage";
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

const ANTHROPIC_BETA: &str = "oauth-2025-04-20";

#[derive(Debug)]
pub enum PollError {
    NoCredentials,
    Http(String),
    Timeout,
    Network(String),
    Parse(String),
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::NoCredentials => write!(f, "No Claude credentials found"),
            PollError::Http(msg) => write!(f, "{msg}"),
            PollError::Timeout => write!(f, "Timed out waiting for usage endpoint"),
            PollError::Network(msg) => write!(f, "Network error: {msg}"),
            PollError::Parse(msg) => write!(f, "Malformed usage response: {msg}"),
        }
    }
}

/// One-shot client for the OAuth usage endpoint.
pub struct UsageClient {
    url: String,
    timeout: Duration,
}

impl UsageClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    /// Read the stored token and fetch usage with it.
    pub fn poll(&self) -> Result<UsageData, PollError> {
        let token = read_access_token().ok_or(PollError::NoCredentials)?;
        self.fetch_usage(&token)
    }

    pub fn fetch_usage(&self, token: &str) -> Result<UsageData, PollError> {
        let tls = std::sync::Arc::new(
            native_tls::TlsConnector::new().map_err(|e| PollError::Network(e.to_string()))?,
        );
        let agent = ureq::AgentBuilder::new()
            .timeout(self.timeout)
            .tls_connector(tls)
            .build();

        let response = match agent
            .get(&self.url)
            .set("Authorization", &format!("Bearer {token}"))
            .set("anthropic-beta", ANTHROPIC_BETA)
            .set("Content-Type", "application/json")
            .call()
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                return Err(PollError::Http(extract_error_message(&body, code)));
            }
            Err(ureq::Error::Transport(t)) => return Err(transport_error(&t)),
        };

        let status = response.status();
        let body = response.into_string().map_err(|e| io_error(&e))?;
        if status != 200 {
            return Err(PollError::Http(extract_error_message(&body, status)));
        }

        let parsed: UsageResponse =
            serde_json::from_str(&body).map_err(|e| PollError::Parse(e.to_string()))?;
        tracing::debug!(status, "fetched usage");
        Ok(parsed.into())
    }
}

fn transport_error(transport: &ureq::Transport) -> PollError {
    let timed_out = std::error::Error::source(transport)
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .is_some_and(is_timeout);
    if timed_out {
        PollError::Timeout
    } else {
        PollError::Network(transport.to_string())
    }
}

fn io_error(e: &std::io::Error) -> PollError {
    if is_timeout(e) {
        PollError::Timeout
    } else {
        PollError::Network(e.to_string())
    }
}

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    )
}

fn extract_error_message(body: &str, status: u16) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json.get("error").and_then(|e| e.get("message")).and_then(|m| m.as_str())
        {
            return format!("HTTP {status}: {msg}");
        }
    }
    let truncated = match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    };
    format!("HTTP {status}: {truncated}")
}
