// ── Core error types ──
//
// User-facing errors from extmarket-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<extmarket_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the catalog at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Catalog request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Extension not found: {identifier}")]
    ExtensionNotFound { identifier: String },

    #[error("Malformed catalog data: {message}")]
    MalformedData { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Endpoint-specific error code (e.g. `PGRST100`).
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Feed controller has shut down")]
    Shutdown,

    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<extmarket_api::Error> for CoreError {
    fn from(err: extmarket_api::Error) -> Self {
        match err {
            extmarket_api::Error::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            extmarket_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            extmarket_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            extmarket_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            extmarket_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            extmarket_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            extmarket_api::Error::Rest {
                message,
                code,
                status,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            extmarket_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedData { message }
            }
            extmarket_api::Error::ContentRange { raw } => CoreError::MalformedData {
                message: format!("missing result count (Content-Range: {raw:?})"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_errors_keep_status_and_code() {
        let err = CoreError::from(extmarket_api::Error::Rest {
            message: "bad order".into(),
            code: Some("PGRST100".into()),
            status: 400,
        });
        assert!(matches!(
            err,
            CoreError::Api {
                status: Some(400),
                code: Some(ref c),
                ..
            } if c == "PGRST100"
        ));
    }

    #[test]
    fn invalid_key_is_an_auth_failure() {
        let err = CoreError::from(extmarket_api::Error::InvalidApiKey);
        assert_eq!(err.to_string(), "Authentication failed: Invalid API key");
    }
}
