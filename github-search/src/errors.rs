//! Crate-wide error hierarchy for github-search.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type GitHubSearchResult<T> = Result<T, GitHubSearchError>;

/// Root error type for the github-search crate.
#[derive(Debug, Error)]
pub enum GitHubSearchError {
    /// Search or content API failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Blob payload could not be turned into text.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Configuration problems (missing token, bad base URL).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input validation errors (bad repository id, empty expression).
    #[error("validation error: {0}")]
    Validation(String),
}

impl GitHubSearchError {
    /// True when the failure means the credential was missing or rejected.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            GitHubSearchError::Provider(ProviderError::Unauthorized | ProviderError::Forbidden)
                | GitHubSearchError::Config(ConfigError::MissingToken | ConfigError::MissingVar(_))
        )
    }

    /// True when the failure happened while decoding content.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            GitHubSearchError::Decode(_)
                | GitHubSearchError::Provider(ProviderError::InvalidResponse(_))
        )
    }
}

/// Failures talking to the GitHub REST API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Unauthorized (HTTP 401): bad or expired token.
    #[error("unauthorized: check the GitHub token")]
    Unauthorized,

    /// Forbidden (HTTP 403) without rate-limit headers: token lacks access.
    #[error("forbidden: the token cannot access this repository")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// The search expression was rejected (HTTP 422).
    #[error("search query rejected by GitHub")]
    InvalidQuery,

    /// Rate limited (HTTP 429, or 403 with an exhausted quota).
    #[error("rate limited")]
    RateLimited {
        /// `Retry-After` hint in seconds when available.
        retry_after_secs: Option<u64>,
    },

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other non-2xx status.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of the API response.
    #[error("invalid GitHub response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Maps a non-success HTTP status into a provider error.
    pub fn from_status(status: StatusCode, retry_after_secs: Option<u64>) -> Self {
        Self::from_response_parts(status, retry_after_secs, None)
    }

    /// Like [`Self::from_status`], but a 403 carrying an exhausted
    /// `x-ratelimit-remaining` or a `retry-after` hint is a rate limit.
    pub fn from_response_parts(
        status: StatusCode,
        retry_after_secs: Option<u64>,
        ratelimit_remaining: Option<u64>,
    ) -> Self {
        let code = status.as_u16();
        match code {
            403 if ratelimit_remaining == Some(0) || retry_after_secs.is_some() => {
                ProviderError::RateLimited { retry_after_secs }
            }
            401 => ProviderError::Unauthorized,
            403 => ProviderError::Forbidden,
            404 => ProviderError::NotFound,
            422 => ProviderError::InvalidQuery,
            429 => ProviderError::RateLimited { retry_after_secs },
            500..=599 => ProviderError::Server(code),
            _ => ProviderError::HttpStatus(code),
        }
    }
}

/// Blob content decoding failures.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The API reported an encoding other than base64 / utf-8.
    #[error("unsupported content encoding: {0}")]
    UnsupportedEncoding(String),

    /// The base64 text was malformed.
    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not UTF-8 text.
    #[error("content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required GitHub access token.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// Token present but empty after trimming.
    #[error("missing GitHub token")]
    MissingToken,

    /// Invalid base API URL.
    #[error("invalid base api url: {0}")]
    InvalidBaseUrl(String),
}

// ===== Conversions for `?` ergonomics at the crate root =====

impl From<reqwest::Error> for GitHubSearchError {
    fn from(e: reqwest::Error) -> Self {
        GitHubSearchError::Provider(ProviderError::from(e))
    }
}

impl From<base64::DecodeError> for GitHubSearchError {
    fn from(e: base64::DecodeError) -> Self {
        GitHubSearchError::Decode(DecodeError::Base64(e))
    }
}

impl From<std::string::FromUtf8Error> for GitHubSearchError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        GitHubSearchError::Decode(DecodeError::Utf8(e))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProviderError::Timeout;
        }

        if let Some(status) = e.status() {
            return ProviderError::from_status(status, None);
        }

        if e.is_decode() {
            return ProviderError::InvalidResponse(e.to_string());
        }

        ProviderError::Network(e.to_string())
    }
}
