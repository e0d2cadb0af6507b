pub mod config;
pub mod demo;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod ranking;
pub mod series;
pub mod session;
pub mod source;
pub mod store;
pub mod validate;

#[cfg(test)]
mod tests {
    use super::error::AppError;

    #[test]
    fn app_error_is_structured() {
        let err = AppError::new("SOURCE_UNREACHABLE", "Failed to fetch").with_retryable(true);
        assert_eq!(err.code, "SOURCE_UNREACHABLE");
        assert_eq!(err.message, "Failed to fetch");
        assert!(err.retryable);
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "[SOURCE_UNREACHABLE] Failed to fetch");
    }

    #[test]
    fn banner_names_the_api_for_transport_failures() {
        let err = AppError::http_status(503, "Service Unavailable");
        assert_eq!(
            err.banner_message("http://localhost:8000"),
            "API 503: Service Unavailable — Is the API running at http://localhost:8000?"
        );

        let cfg = AppError::new("CONFIG_PARSE_FAILED", "Failed to parse dashboard config");
        assert!(!cfg.is_transport());
        assert_eq!(
            cfg.banner_message("http://localhost:8000"),
            "Failed to parse dashboard config"
        );
    }
}
