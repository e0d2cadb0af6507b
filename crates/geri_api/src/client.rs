use std::time::Duration;

use geri_core::config::DashboardConfig;
use geri_core::error::AppError;
use geri_core::source::QueryParams;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

/// Blocking client for the dashboard REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
}

fn invalid(base_url: &str, reason: &str) -> AppError {
    AppError::new("SOURCE_INVALID_BASE_URL", "API base URL must be http(s)://host[:port]")
        .with_details(format!("base_url={base_url}; reason={reason}"))
}

fn validate_authority(base_url: &str, authority: &str) -> Result<(), AppError> {
    if authority.is_empty() {
        return Err(invalid(base_url, "missing host"));
    }
    if authority.contains(|c: char| matches!(c, '/' | '?' | '#')) {
        return Err(invalid(base_url, "path, query, or fragment not allowed"));
    }
    if authority.contains('@') {
        return Err(invalid(base_url, "userinfo not allowed"));
    }

    let (host, port) = if let Some(rest) = authority.strip_prefix('[') {
        let Some((host, after)) = rest.split_once(']') else {
            return Err(invalid(base_url, "unterminated IPv6 host"));
        };
        match after {
            "" => (host, None),
            _ => match after.strip_prefix(':') {
                Some(p) => (host, Some(p)),
                None => return Err(invalid(base_url, "unexpected text after IPv6 host")),
            },
        }
    } else {
        match authority.rsplit_once(':') {
            Some((h, p)) => (h, Some(p)),
            None => (authority, None),
        }
    };

    if host.is_empty() {
        return Err(invalid(base_url, "missing host"));
    }
    if let Some(port) = port {
        match port.parse::<u16>() {
            Ok(p) if p != 0 => {}
            _ => return Err(invalid(base_url, "invalid port")),
        }
    }
    Ok(())
}

impl ApiClient {
    /// Create a client for `http(s)://host[:port]`. A trailing slash is trimmed; any path is
    /// rejected so endpoint paths cannot be redirected.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        let authority = base_url
            .strip_prefix("http://")
            .or_else(|| base_url.strip_prefix("https://"))
            .ok_or_else(|| invalid(&base_url, "scheme must be http or https"))?;
        validate_authority(&base_url, authority)?;

        Ok(Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, AppError> {
        Ok(Self::new(&config.api_base_url)?
            .with_timeout(Duration::from_millis(config.request_timeout_ms)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let health: HealthResponse = self.get_json("/health", &Vec::new())?;
        if health.status == "ok" {
            Ok(())
        } else {
            Err(
                AppError::new("SOURCE_UNHEALTHY", "API health check failed")
                    .with_details(format!("status={}", health.status)),
            )
        }
    }

    /// GET `path` with `params` and decode a JSON body. No retries.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<T, AppError> {
        let url = self.url(path);
        let mut req = ureq::get(&url).timeout(self.timeout);
        for (name, value) in params {
            req = req.query(name, value);
        }

        log::debug!("GET {url} ({} params)", params.len());

        match req.call() {
            Ok(resp) => resp.into_json::<T>().map_err(|e| {
                AppError::new("SOURCE_DECODE_FAILED", "Failed to decode API response")
                    .with_details(format!("path={path}; err={e}"))
            }),
            Err(ureq::Error::Status(status, resp)) => {
                log::warn!("GET {url} returned {status}");
                Err(AppError::http_status(status, resp.status_text()))
            }
            Err(ureq::Error::Transport(t)) => Err(AppError::new(
                "SOURCE_UNREACHABLE",
                format!("Failed to reach API at {}", self.base_url),
            )
            .with_details(t.to_string())
            .with_retryable(true)),
        }
    }
}
