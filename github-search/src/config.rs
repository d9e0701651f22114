//! Runtime configuration for the search client.
//!
//! Only the access token comes from the environment (`GITHUB_TOKEN`). The
//! repository scope, language filter and API base are fixed defaults that
//! library callers may override with the `with_*` methods.

use crate::errors::{ConfigError, GitHubSearchResult};

/// Environment variable holding the GitHub access token.
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Public GitHub REST v3 endpoint.
pub const DEFAULT_BASE_API: &str = "https://api.github.com";

/// Repository whose Markdown files are searched.
pub const DEFAULT_REPOSITORY: &str = "wantedly/dev";

/// Language qualifier appended to every search expression.
pub const DEFAULT_LANGUAGE: &str = "Markdown";

/// Explicit configuration passed to [`crate::GitHubSearchClient`].
#[derive(Clone)]
pub struct SearchConfig {
    /// API base, e.g. "https://api.github.com".
    pub base_api: String,
    /// Access token (PAT or app token), sent as a bearer token.
    pub token: String,
    /// "owner/repo" scope for `repo:` qualifier.
    pub repository: String,
    /// Value of the `language:` qualifier.
    pub language: String,
    /// Page size requested from the search endpoint (max 100).
    pub per_page: u8,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

// Keep the token out of logs.
impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("base_api", &self.base_api)
            .field("token", &"<redacted>")
            .field("repository", &self.repository)
            .field("language", &self.language)
            .field("per_page", &self.per_page)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SearchConfig {
    /// Builds a config with the default scope around the given token.
    ///
    /// # Errors
    /// [`ConfigError::MissingToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> GitHubSearchResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::MissingToken.into());
        }

        Ok(Self {
            base_api: DEFAULT_BASE_API.to_string(),
            token: token.trim().to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            per_page: 30,
            timeout_secs: 30,
        })
    }

    /// Reads the token from `GITHUB_TOKEN`.
    ///
    /// # Errors
    /// [`ConfigError::MissingVar`] if the variable is absent or empty.
    pub fn from_env() -> GitHubSearchResult<Self> {
        let token = must_env(TOKEN_VAR)?;
        Self::new(token)
    }

    /// Overrides the API base (GitHub Enterprise, test servers).
    ///
    /// # Errors
    /// [`ConfigError::InvalidBaseUrl`] unless it starts with http(s)://.
    pub fn with_base_api(mut self, base_api: impl Into<String>) -> GitHubSearchResult<Self> {
        let base_api = base_api.into();
        validate_http_endpoint(&base_api)?;
        self.base_api = base_api.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = repository.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Clamped to GitHub's 1..=100 page size.
    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page.clamp(1, 100);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Fetches a required, non-empty environment variable.
fn must_env(name: &'static str) -> GitHubSearchResult<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
fn validate_http_endpoint(value: &str) -> GitHubSearchResult<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidBaseUrl(value.to_string()).into())
    }
}
