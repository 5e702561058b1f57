use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    NotFound,
    BadRequest,
    RateLimited,
    Server,
    Network,
    Decode,
}

impl FailureCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => FailureCode::NotFound,
            429 => FailureCode::RateLimited,
            400..=499 => FailureCode::BadRequest,
            _ => FailureCode::Server,
        }
    }
}

/// Transport-level failure carried inside a response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}", self.display_message())]
pub struct FetchFailure {
    pub code: FailureCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl FetchFailure {
    pub fn new(code: FailureCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: None,
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            code: FailureCode::from_status(status),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Text shown to the user for this failure.
    pub fn display_message(&self) -> String {
        let message = self.message.trim();
        match (self.status, message.is_empty()) {
            (Some(status), true) => format!("HTTP {status}"),
            (Some(status), false) => format!("HTTP {status}: {message}"),
            (None, true) => format!("{:?}", self.code),
            (None, false) => message.to_string(),
        }
    }
}
