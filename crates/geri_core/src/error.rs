use serde::{Deserialize, Serialize};
use std::fmt;

/// Code prefix shared by every failure that originates at the data-source boundary.
pub const TRANSPORT_CODE_PREFIX: &str = "SOURCE_";

/// Single structured error shape used by the core and the HTTP source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    /// Non-success status reported by the data source.
    pub fn http_status(status: u16, status_text: &str) -> Self {
        Self::new("SOURCE_HTTP_STATUS", format!("API {status}: {status_text}"))
            .with_details(format!("status={status}"))
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// True for failures of the external data source (unreachable, bad status, undecodable body).
    pub fn is_transport(&self) -> bool {
        self.code.starts_with(TRANSPORT_CODE_PREFIX)
    }

    /// One-line notice shown to the analyst when a view falls back to empty data.
    pub fn banner_message(&self, api_base_url: &str) -> String {
        if self.is_transport() {
            format!("{} — Is the API running at {api_base_url}?", self.message)
        } else {
            self.message.clone()
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
