use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::EventSource;
use crate::error::AppError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "API_URL";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_spikes_limit() -> u32 {
    200
}

fn default_combined_events_limit() -> u32 {
    500
}

fn default_evidence_limit() -> u32 {
    100
}

fn default_combined_sources() -> Vec<EventSource> {
    EventSource::ALL.to_vec()
}

/// Dashboard settings. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_spikes_limit")]
    pub spikes_limit: u32,
    #[serde(default = "default_combined_events_limit")]
    pub combined_events_limit: u32,
    #[serde(default = "default_evidence_limit")]
    pub evidence_limit: u32,
    #[serde(default = "default_combined_sources")]
    pub combined_sources: Vec<EventSource>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            spikes_limit: default_spikes_limit(),
            combined_events_limit: default_combined_events_limit(),
            evidence_limit: default_evidence_limit(),
            combined_sources: default_combined_sources(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(text: &str) -> Result<Self, AppError> {
        serde_json::from_str(text).map_err(|e| {
            AppError::new("CONFIG_PARSE_FAILED", "Failed to parse dashboard config")
                .with_details(e.to_string())
        })
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.is_file() {
            return Err(
                AppError::new("CONFIG_NOT_FOUND", "Dashboard config file not found")
                    .with_details(path.display().to_string()),
            );
        }
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::new("CONFIG_READ_FAILED", "Failed to read dashboard config")
                .with_details(format!("path={}; err={e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Apply `API_URL` from the process environment when it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        let value = std::env::var(API_URL_ENV).ok();
        self.with_api_url_override(value.as_deref())
    }

    pub fn with_api_url_override(mut self, api_url: Option<&str>) -> Self {
        if let Some(url) = api_url.map(str::trim).filter(|u| !u.is_empty()) {
            log::debug!("api base url overridden: {url}");
            self.api_base_url = url.to_string();
        }
        self
    }
}
