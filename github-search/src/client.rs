//! GitHub REST v3 client for scoped code search and blob content.
//!
//! Endpoints used:
//!   * GET /search/code?q={expression}&per_page={n}
//!   * GET {git_url}   (blob API URL taken from a search result)

use std::time::Duration;

use reqwest::{Client, Response, header};
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::decode::decode_blob;
use crate::errors::{GitHubSearchError, GitHubSearchResult, ProviderError};
use crate::types::{BlobPayload, FileDescriptor, SearchPage};

const ACCEPT_JSON: &str = "application/vnd.github+json";
const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Builds `repo:{repository} language:{language} {terms}`.
///
/// Terms are trimmed; when they are empty the expression ends after the
/// language qualifier.
pub fn build_search_expression(repository: &str, language: &str, terms: &str) -> String {
    let terms = terms.trim();
    if terms.is_empty() {
        format!("repo:{repository} language:{language}")
    } else {
        format!("repo:{repository} language:{language} {terms}")
    }
}

/// GitHub HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitHubSearchClient {
    http: Client,
    config: SearchConfig,
    auth_header: String,
}

impl GitHubSearchClient {
    /// Constructs a client with a stable user agent and the configured timeout.
    pub fn new(config: SearchConfig) -> GitHubSearchResult<Self> {
        validate_repository(&config.repository)?;
        debug!(
            base_api = %config.base_api,
            repository = %config.repository,
            language = %config.language,
            "creating GitHubSearchClient"
        );

        let http = Client::builder()
            .user_agent(concat!("md-search/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let auth_header = format!("Bearer {}", config.token);

        Ok(Self {
            http,
            config,
            auth_header,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search expression this client would send for the given terms.
    pub fn expression_for(&self, terms: &str) -> String {
        build_search_expression(&self.config.repository, &self.config.language, terms)
    }

    /// Searches the scoped repository and returns matches in API order.
    pub async fn search_code(&self, terms: &str) -> GitHubSearchResult<Vec<FileDescriptor>> {
        Ok(self.search_page(terms).await?.items)
    }

    /// Like [`Self::search_code`] but keeps GitHub's counters.
    pub async fn search_page(&self, terms: &str) -> GitHubSearchResult<SearchPage> {
        let expression = self.expression_for(terms);
        let url = format!("{}/search/code", self.config.base_api);
        let per_page = self.config.per_page.to_string();
        debug!(%url, %expression, "GitHub search_code");

        let resp = self
            .http
            .get(url)
            .query(&[("q", expression.as_str()), ("per_page", per_page.as_str())])
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::ACCEPT, ACCEPT_JSON)
            .send()
            .await?;

        let page: SearchPage = check_status(resp).await?.json().await?;

        if page.incomplete_results {
            warn!(%expression, "GitHub reported incomplete search results");
        }
        info!(
            %expression,
            total = page.total_count,
            returned = page.items.len(),
            "search completed"
        );
        Ok(page)
    }

    /// Fetches and decodes the content of one matched file.
    pub async fn fetch_content(&self, file: &FileDescriptor) -> GitHubSearchResult<String> {
        debug!(path = %file.path, url = %file.git_url, "GitHub fetch_content");

        let resp = self
            .http
            .get(&file.git_url)
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::ACCEPT, ACCEPT_JSON)
            .send()
            .await?;

        let blob: BlobPayload = check_status(resp).await?.json().await?;
        let text = decode_blob(&blob)?;
        debug!(path = %file.path, bytes = text.len(), "content decoded");
        Ok(text)
    }
}

/// Turns a non-success response into a [`ProviderError`].
async fn check_status(resp: Response) -> GitHubSearchResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let retry_after_secs = header_u64(&resp, header::RETRY_AFTER.as_str());
    let ratelimit_remaining = header_u64(&resp, RATELIMIT_REMAINING);
    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    warn!(%status, %url, ?ratelimit_remaining, %snippet, "GitHub request failed");

    Err(ProviderError::from_response_parts(status, retry_after_secs, ratelimit_remaining).into())
}

fn header_u64(resp: &Response, name: &str) -> Option<u64> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Checks that the repository scope is "owner/repo".
fn validate_repository(repository: &str) -> GitHubSearchResult<()> {
    let mut parts = repository.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let repo = parts.next().unwrap_or("").trim();

    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return Err(GitHubSearchError::Validation(format!(
            "invalid GitHub repository '{}', expected 'owner/repo'",
            repository
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_includes_scope_and_terms() {
        assert_eq!(
            build_search_expression("wantedly/dev", "Markdown", "  deploy guide "),
            "repo:wantedly/dev language:Markdown deploy guide"
        );
    }

    #[test]
    fn expression_without_terms() {
        assert_eq!(
            build_search_expression("wantedly/dev", "Markdown", "   "),
            "repo:wantedly/dev language:Markdown"
        );
    }

    #[test]
    fn client_rejects_bad_repository() {
        let cfg = SearchConfig::new("t").unwrap().with_repository("just-a-name");
        let err = GitHubSearchClient::new(cfg).unwrap_err();
        assert!(matches!(err, GitHubSearchError::Validation(_)));

        let cfg = SearchConfig::new("t").unwrap().with_repository("a/b/c");
        assert!(GitHubSearchClient::new(cfg).is_err());
    }

    #[test]
    fn client_uses_configured_scope() {
        let cfg = SearchConfig::new("t")
            .unwrap()
            .with_repository("octo/docs")
            .with_language("Text");
        let client = GitHubSearchClient::new(cfg).unwrap();
        assert_eq!(client.expression_for("x"), "repo:octo/docs language:Text x");
    }

    #[test]
    fn search_page_parses_github_shape() {
        let body = r#"{
            "total_count": 2,
            "incomplete_results": false,
            "items": [
                {
                    "name": "README.md",
                    "path": "docs/README.md",
                    "sha": "abc123",
                    "url": "https://api.github.com/repos/wantedly/dev/contents/docs/README.md?ref=1",
                    "git_url": "https://api.github.com/repos/wantedly/dev/git/blobs/abc123",
                    "html_url": "https://github.com/wantedly/dev/blob/1/docs/README.md",
                    "score": 1.0,
                    "repository": { "id": 1 }
                },
                {
                    "name": "setup.md",
                    "path": "setup.md",
                    "sha": "def456",
                    "url": "u",
                    "git_url": "g",
                    "html_url": "h"
                }
            ]
        }"#;
        let page: SearchPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].path, "docs/README.md");
        assert_eq!(
            page.items[0].git_url,
            "https://api.github.com/repos/wantedly/dev/git/blobs/abc123"
        );
        assert_eq!(page.items[1].name, "setup.md");
    }

    #[test]
    fn blob_payload_parses_and_decodes() {
        let body = r#"{ "sha": "abc", "size": 7, "content": "IyBIZWxs\nbw==\n", "encoding": "base64" }"#;
        let blob: BlobPayload = serde_json::from_str(body).unwrap();
        assert_eq!(decode_blob(&blob).unwrap(), "# Hello");
    }

    // ----- local HTTP server -----

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one canned response and returns the base URL.
    async fn serve_once(status_line: &str, headers: &[(&str, &str)], body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut response = format!("HTTP/1.1 {status_line}\r\n");
        for (name, value) in headers {
            response.push_str(&format!("{name}: {value}\r\n"));
        }
        response.push_str(&format!(
            "content-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        ));

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}")
    }

    fn client_for(base: &str) -> GitHubSearchClient {
        let cfg = SearchConfig::new("ghp_test")
            .unwrap()
            .with_base_api(base)
            .unwrap()
            .with_timeout_secs(5);
        GitHubSearchClient::new(cfg).unwrap()
    }

    fn descriptor(git_url: String) -> FileDescriptor {
        FileDescriptor {
            name: "hello.md".into(),
            path: "docs/hello.md".into(),
            sha: "abc".into(),
            url: "u".into(),
            git_url,
            html_url: "https://github.com/wantedly/dev/blob/main/docs/hello.md".into(),
        }
    }

    #[tokio::test]
    async fn search_over_http_returns_items_and_counters() {
        let body = r#"{"total_count":112,"incomplete_results":true,"items":[
            {"name":"a.md","path":"a.md","sha":"1","url":"u","git_url":"g","html_url":"h"}]}"#;
        let base = serve_once("200 OK", &[], body).await;

        let page = client_for(&base).search_page("deploy").await.unwrap();
        assert_eq!(page.total_count, 112);
        assert!(page.incomplete_results);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].path, "a.md");
    }

    #[tokio::test]
    async fn unauthorized_search_is_an_auth_failure() {
        let base = serve_once("401 Unauthorized", &[], r#"{"message":"Bad credentials"}"#).await;

        let err = client_for(&base).search_code("deploy").await.unwrap_err();
        assert!(matches!(
            err,
            GitHubSearchError::Provider(ProviderError::Unauthorized)
        ));
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn exhausted_quota_403_is_rate_limited() {
        let base = serve_once(
            "403 Forbidden",
            &[("x-ratelimit-remaining", "0"), ("x-ratelimit-limit", "10")],
            r#"{"message":"API rate limit exceeded"}"#,
        )
        .await;

        let err = client_for(&base).search_code("deploy").await.unwrap_err();
        assert!(matches!(
            err,
            GitHubSearchError::Provider(ProviderError::RateLimited { .. })
        ));
        assert!(!err.is_auth_failure());
    }

    #[tokio::test]
    async fn plain_403_is_still_forbidden() {
        let base = serve_once(
            "403 Forbidden",
            &[("x-ratelimit-remaining", "9")],
            r#"{"message":"Resource not accessible"}"#,
        )
        .await;

        let err = client_for(&base).search_code("deploy").await.unwrap_err();
        assert!(matches!(
            err,
            GitHubSearchError::Provider(ProviderError::Forbidden)
        ));
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn blob_fetch_decodes_to_exact_text() {
        let body = r#"{"sha":"abc","size":7,"content":"IyBIZWxs\nbw==\n","encoding":"base64"}"#;
        let base = serve_once("200 OK", &[], body).await;

        let file = descriptor(format!("{base}/repos/wantedly/dev/git/blobs/abc"));
        let text = client_for(&base).fetch_content(&file).await.unwrap();
        assert_eq!(text, "# Hello");
    }

    #[tokio::test]
    async fn malformed_blob_is_a_decode_failure() {
        let body = r#"{"content":"@@@","encoding":"base64"}"#;
        let base = serve_once("200 OK", &[], body).await;

        let file = descriptor(format!("{base}/blob"));
        let err = client_for(&base).fetch_content(&file).await.unwrap_err();
        assert!(err.is_decode_failure());
    }
}
