//! Data model for code-search results and blob payloads.

use serde::{Deserialize, Serialize};

/// One matched file returned by the code-search endpoint.
///
/// * `url`      – contents API URL
/// * `git_url`  – blob API URL; content is fetched from here
/// * `html_url` – human-facing browser URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub url: String,
    pub git_url: String,
    pub html_url: String,
}

/// One page of search results as reported by GitHub.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Total matches GitHub reports for the expression (may exceed `items`).
    pub total_count: u64,
    /// True if GitHub timed out before scanning the whole index.
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<FileDescriptor>,
}

impl From<Vec<FileDescriptor>> for SearchPage {
    fn from(items: Vec<FileDescriptor>) -> Self {
        Self {
            total_count: items.len() as u64,
            incomplete_results: false,
            items,
        }
    }
}

/// Blob API response (subset).
#[derive(Debug, Clone, Deserialize)]
pub struct BlobPayload {
    pub content: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    "base64".to_string()
}
