//! Error types for the Epic and Discord HTTP collaborators
//!
//! Rate limits and server errors are retryable for both APIs. Any Epic
//! network failure is retried since its calls are reads or token grants. A
//! Discord post is only retried when the connection was never made, because
//! a timed out post may already have been delivered.

use serde::Deserialize;
use thiserror::Error;

/// Errors from the Epic account and game services
#[derive(Debug, Error)]
pub enum EpicError {
    #[error("Epic authentication failed ({status}): {message}")]
    AuthenticationFailed { status: u16, message: String },

    #[error("Epic rate limited the request")]
    RateLimited,

    #[error("Epic token response had no {0}")]
    MissingToken(&'static str),

    #[error("Epic network error: {0}")]
    Network(String),

    #[error("Epic returned an unreadable body: {0}")]
    Decode(String),

    #[error("Epic API error {status}: {message}")]
    Unknown { status: u16, message: String },
}

/// Epic error body, e.g. `{"errorCode": "...", "errorMessage": "..."}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpicErrorResponse {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

impl EpicError {
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<EpicErrorResponse>(body) {
            Ok(parsed) => parsed
                .error_message
                .or(parsed.error_code)
                .unwrap_or_else(|| body.to_string()),
            Err(_) => body.to_string(),
        };

        match status {
            429 => EpicError::RateLimited,
            400 | 401 | 403 => EpicError::AuthenticationFailed { status, message },
            _ => EpicError::Unknown { status, message },
        }
    }

    pub fn from_network_error(err: &reqwest::Error) -> Self {
        EpicError::Network(describe_network_error(err))
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            EpicError::RateLimited | EpicError::Network(_) => true,
            EpicError::Unknown { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Errors from the Discord REST API
#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("Discord rejected the bot token")]
    Unauthorized,

    #[error("Discord channel {0} not found or not visible to the bot")]
    ChannelUnavailable(u64),

    #[error("Discord rate limited the request (retry after {retry_after_ms}ms)")]
    RateLimited { retry_after_ms: u64 },

    #[error("Could not reach Discord: {0}")]
    ConnectFailed(String),

    #[error("Discord network error: {0}")]
    Network(String),

    #[error("Discord returned an unreadable body: {0}")]
    Decode(String),

    #[error("Discord API error {status}: {body}")]
    Unknown { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct DiscordRateLimit {
    #[serde(default)]
    retry_after: f64,
}

impl DiscordError {
    pub fn from_response(status: u16, body: &str, channel_id: u64) -> Self {
        match status {
            401 => DiscordError::Unauthorized,
            403 | 404 => DiscordError::ChannelUnavailable(channel_id),
            429 => {
                let retry_after = serde_json::from_str::<DiscordRateLimit>(body)
                    .map(|r| r.retry_after)
                    .unwrap_or_default();
                DiscordError::RateLimited {
                    retry_after_ms: (retry_after.max(0.0) * 1000.0) as u64,
                }
            }
            _ => DiscordError::Unknown {
                status,
                body: body.to_string(),
            },
        }
    }

    pub fn from_network_error(err: &reqwest::Error) -> Self {
        if err.is_connect() {
            DiscordError::ConnectFailed(describe_network_error(err))
        } else {
            DiscordError::Network(describe_network_error(err))
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            DiscordError::RateLimited { .. } | DiscordError::ConnectFailed(_) => true,
            DiscordError::Unknown { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Server-requested wait before the next attempt, if any
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            DiscordError::RateLimited { retry_after_ms } if *retry_after_ms > 0 => Some(*retry_after_ms),
            _ => None,
        }
    }
}

fn describe_network_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epic_auth_error_reads_message() {
        let err = EpicError::from_response(
            400,
            r#"{"errorCode":"errors.com.epicgames.account.invalid_account_credentials","errorMessage":"Sorry the account credentials you are using are invalid"}"#,
        );
        assert!(!err.is_retryable());
        match err {
            EpicError::AuthenticationFailed { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("invalid"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_epic_server_errors_are_retryable() {
        assert!(EpicError::from_response(503, "upstream down").is_retryable());
        assert!(EpicError::from_response(429, "").is_retryable());
        assert!(!EpicError::from_response(404, "").is_retryable());
    }

    #[test]
    fn test_discord_rate_limit_parses_retry_after() {
        let err = DiscordError::from_response(429, r#"{"message":"You are being rate limited.","retry_after":1.5,"global":false}"#, 1);
        assert!(err.is_retryable());
        assert_eq!(err.retry_after_ms(), Some(1500));
    }

    #[test]
    fn test_discord_missing_channel() {
        let err = DiscordError::from_response(404, r#"{"message":"Unknown Channel","code":10003}"#, 42);
        assert!(!err.is_retryable());
        assert!(matches!(err, DiscordError::ChannelUnavailable(42)));
    }

    #[test]
    fn test_discord_only_retries_unsent_requests() {
        assert!(DiscordError::ConnectFailed("connection failed".into()).is_retryable());
        assert!(!DiscordError::Network("request timed out".into()).is_retryable());
        assert!(DiscordError::from_response(502, "", 1).is_retryable());
        assert!(EpicError::Network("request timed out".into()).is_retryable());
    }
}
