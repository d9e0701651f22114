//! Scoped GitHub code search and blob preview.
//!
//! [`GitHubSearchClient::search_code`] runs `repo:… language:… {terms}`
//! against the code-search endpoint; [`GitHubSearchClient::fetch_content`]
//! pulls a match's blob and decodes it to text.

mod client;
mod config;
mod decode;
mod errors;
mod types;

pub use client::{GitHubSearchClient, build_search_expression};
pub use config::{
    DEFAULT_BASE_API, DEFAULT_LANGUAGE, DEFAULT_REPOSITORY, SearchConfig, TOKEN_VAR,
};
pub use decode::decode_blob;
pub use errors::{ConfigError, DecodeError, GitHubSearchError, GitHubSearchResult, ProviderError};
pub use types::{BlobPayload, FileDescriptor, SearchPage};
