use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UsageSection {
    pub utilization: Option<f64>,
    pub resets_at: Option<DateTime<Utc>>,
}

/// Usage for both rate-limit windows. A window the endpoint omitted is `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UsageData {
    pub session: Option<UsageSection>,
    pub weekly: Option<UsageSection>,
}

/// Body of `GET /api/oauth/usage`.
#[derive(Debug, Deserialize)]
pub struct UsageResponse {
    pub five_hour: Option<WindowResponse>,
    pub seven_day: Option<WindowResponse>,
}

#[derive(Debug, Deserialize)]
pub struct WindowResponse {
    pub utilization: Option<f64>,
    pub resets_at: Option<String>,
}

impl From<WindowResponse> for UsageSection {
    fn from(window: WindowResponse) -> Self {
        Self {
            utilization: window.utilization,
            resets_at: window.resets_at.as_deref().and_then(parse_reset),
        }
    }
}

impl From<UsageResponse> for UsageData {
    fn from(response: UsageResponse) -> Self {
        Self {
            session: response.five_hour.map(UsageSection::from),
            weekly: response.seven_day.map(UsageSection::from),
        }
    }
}

fn parse_reset(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!(resets_at = raw, error = %e, "ignoring unparseable reset time");
            None
        }
    }
}
