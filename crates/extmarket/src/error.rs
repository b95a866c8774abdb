//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use extmarket_config::ConfigError;
use extmarket_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the catalog at {url}")]
    #[diagnostic(
        code(extmarket::connection_failed),
        help(
            "Check your network connection and the endpoint URL.\n\
             URL: {url}\n\
             To work offline, pass --fixture <catalog.json>."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No catalog endpoint configured")]
    #[diagnostic(
        code(extmarket::no_endpoint),
        help(
            "Set endpoint.url in {path}, pass --endpoint <URL>,\n\
             or browse a local catalog with --fixture <catalog.json>."
        )
    )]
    NoEndpoint { path: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(extmarket::auth_failed),
        help("Verify the catalog API key (--api-key, EXTMARKET_API_KEY, or endpoint.api_key_env).")
    )]
    AuthFailed { message: String },

    #[error("No API key configured for the catalog endpoint")]
    #[diagnostic(
        code(extmarket::no_credentials),
        help(
            "Pass --api-key, set EXTMARKET_API_KEY, name a variable in endpoint.api_key_env,\n\
             or store the key in the system keyring under service \"extmarket\"."
        )
    )]
    NoCredentials,

    // ── Catalog ──────────────────────────────────────────────────────
    #[error("Extension '{identifier}' not found")]
    #[diagnostic(
        code(extmarket::not_found),
        help("Run: extmarket browse --search <text> to find extension ids")
    )]
    NotFound { identifier: String },

    #[error("{message}")]
    #[diagnostic(code(extmarket::feed_failed))]
    FeedFailed { message: String },

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(extmarket::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(extmarket::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(extmarket::config),
        help("Check the config file (extmarket config path) and EXTMARKET_* variables.")
    )]
    Config(ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(extmarket::timeout),
        help("Increase timeout with --timeout or check catalog responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Serialization ────────────────────────────────────────────────
    #[error("Failed to render JSON output: {0}")]
    #[diagnostic(code(extmarket::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML output: {0}")]
    #[diagnostic(code(extmarket::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoEndpoint { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoEndpoint => CliError::NoEndpoint {
                path: extmarket_config::config_path().display().to_string(),
            },
            ConfigError::NoCredentials => CliError::NoCredentials,
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::ExtensionNotFound { identifier } => CliError::NotFound { identifier },

            CoreError::MalformedData { message } => CliError::ApiError {
                code: "malformed_data".into(),
                message,
            },

            CoreError::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                code: code
                    .or_else(|| status.map(|s| s.to_string()))
                    .unwrap_or_default(),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Shutdown => CliError::ApiError {
                code: "shutdown".into(),
                message: "feed stopped before the catalog answered".into(),
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let err = CliError::from(CoreError::ExtensionNotFound {
            identifier: "42".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);

        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "Invalid API key".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);

        let err = CliError::from(CoreError::Timeout { timeout_secs: 5 });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn api_error_falls_back_to_status_code() {
        let err = CliError::from(CoreError::Api {
            message: "boom".into(),
            code: None,
            status: Some(503),
        });
        assert_eq!(err.to_string(), "API error (503): boom");
    }

    #[test]
    fn missing_endpoint_is_a_usage_error() {
        let err = CliError::from(ConfigError::NoEndpoint);
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
