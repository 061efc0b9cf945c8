//! API error types for the API-Basketball client.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Request quota exceeded: {used}/{limit} requests used")]
    QuotaExceeded { used: u32, limit: u32 },

    #[error("HTTP error: {status_code} - {message}")]
    Http { status_code: u16, message: String },

    /// HTTP 429 without a body-level error.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The response body carried a non-empty `errors` object.
    #[error("API reported errors: {0}")]
    Api(String),

    #[error("Request failed after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl ApiError {
    /// Classify a non-empty `errors` field from the response envelope.
    ///
    /// API-Sports keys its errors by topic: `token` for credential
    /// problems and `requests` once the daily plan limit is hit. Every
    /// other key, the per-minute `rateLimit` included, is an application
    /// error. None of them is worth retrying against the daily quota.
    pub fn from_body_errors(errors: &serde_json::Value, used: u32, limit: u32) -> Self {
        let message = errors.to_string();
        let has_key = |key: &str| errors.get(key).is_some();

        if has_key("token") {
            Self::Authentication(message)
        } else if has_key("requests") {
            Self::QuotaExceeded { used, limit }
        } else {
            Self::Api(message)
        }
    }
}
