//! GitHub REST API client.
//!
//! Covers the three collaborator concerns the diagram pipeline needs:
//! OAuth authorization-code exchange, recursive repository file listing,
//! and per-file content retrieval (GitHub serves content base64-encoded
//! with embedded newlines). Also hosts the code-file filter that keeps
//! repository noise (lockfiles, assets, vendored directories) out of the
//! analysis set.

use std::future::Future;
use std::pin::Pin;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::uml::SourceFile;

const API_BASE: &str = "https://api.github.com";
const OAUTH_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// File extensions considered source code for diagram purposes.
const CODE_EXTENSIONS: &[&str] = &[
    ".java", ".js", ".jsx", ".ts", ".tsx", ".py", ".cs", ".php", ".rb", ".go", ".swift", ".kt",
    ".cpp", ".c", ".h",
];

static EXCLUDE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"node_modules",
        r"\.git",
        r"\.vscode",
        r"\.idea",
        r"dist/",
        r"build/",
        r"\.env",
        r"package-lock\.json",
        r"yarn\.lock",
        r"test",
        r"\.md$",
        r"\.json$",
        r"\.css$",
        r"\.scss$",
        r"\.html$",
        r"\.svg$",
        r"\.png$",
        r"\.jpg$",
        r"\.jpeg$",
        r"\.gif$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("exclude pattern must compile"))
    .collect()
});

/// A file entry from the repository contents listing (no content yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoFile {
    pub name: String,
    pub path: String,
    pub size: u64,
}

#[derive(Deserialize)]
struct ContentsEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    size: u64,
}

#[derive(Deserialize)]
struct FilePayload {
    content: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Client for the GitHub REST and OAuth APIs.
pub struct GitHubClient {
    client: Client,
    client_id: String,
    client_secret: String,
}

impl GitHubClient {
    /// Create a client with the OAuth application credentials.
    pub fn new(client_id: &str, client_secret: &str) -> Result<Self> {
        let client = Client::builder()
            // GitHub rejects requests without a User-Agent.
            .user_agent(concat!("umlforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    /// Exchange an OAuth authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let request = TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            code,
        };

        let response = self
            .client
            .post(OAUTH_TOKEN_URL)
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .context("GitHub OAuth request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("GitHub OAuth error: {} - {}", status, body);
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse GitHub OAuth response")?;

        if let Some(error) = token.error {
            let detail = token.error_description.unwrap_or(error);
            bail!("GitHub rejected the authorization code: {}", detail);
        }

        token
            .access_token
            .context("GitHub OAuth response contained no access token")
    }

    /// List every file in a repository by walking the contents API
    /// depth-first from the root.
    pub async fn list_repository_files(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
    ) -> Result<Vec<RepoFile>> {
        self.list_directory(owner, repo, token, String::new()).await
    }

    // Async recursion needs an explicitly boxed future.
    fn list_directory<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        token: &'a str,
        dir: String,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RepoFile>>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{API_BASE}/repos/{owner}/{repo}/contents/{dir}");
            let entries: Vec<ContentsEntry> = self.get_json(&url, token).await?;

            let mut files = Vec::new();
            for entry in entries {
                match entry.entry_type.as_str() {
                    "file" => files.push(RepoFile {
                        name: entry.name,
                        path: entry.path,
                        size: entry.size,
                    }),
                    "dir" => {
                        let nested = self.list_directory(owner, repo, token, entry.path).await?;
                        files.extend(nested);
                    }
                    // Submodules and symlinks are not diagram material.
                    _ => {}
                }
            }
            Ok(files)
        })
    }

    /// Fetch and decode the content of up to `max_files` files, skipping
    /// files larger than `max_file_size` bytes. A failed fetch for one file
    /// is logged and does not abort the rest.
    pub async fn fetch_contents(
        &self,
        owner: &str,
        repo: &str,
        token: &str,
        files: &[RepoFile],
        max_files: usize,
        max_file_size: u64,
    ) -> Vec<SourceFile> {
        let mut sources = Vec::new();

        for file in files.iter().take(max_files) {
            if file.size > max_file_size {
                tracing::info!("Skipping large file {} ({} bytes)", file.path, file.size);
                continue;
            }

            match self.fetch_file(owner, repo, token, &file.path).await {
                Ok(content) => sources.push(SourceFile {
                    name: file.name.clone(),
                    path: file.path.clone(),
                    content,
                    size: file.size,
                }),
                Err(e) => {
                    tracing::warn!("Error getting content for {}: {:#}", file.path, e);
                }
            }
        }

        sources
    }

    async fn fetch_file(&self, owner: &str, repo: &str, token: &str, path: &str) -> Result<String> {
        let url = format!("{API_BASE}/repos/{owner}/{repo}/contents/{path}");
        let payload: FilePayload = self.get_json(&url, token).await?;

        // GitHub wraps the base64 payload in newlines.
        let cleaned: String = payload
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(cleaned)
            .with_context(|| format!("Invalid base64 content for {path}"))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("token {token}"))
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .with_context(|| format!("GitHub API request failed: {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("GitHub API error: {} - {}", status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse GitHub API response: {url}"))
    }
}

/// Keep only plausible source files: code extension required, repository
/// noise (vendored dirs, lockfiles, docs, assets, tests) excluded by path.
pub fn filter_code_files(files: &[RepoFile]) -> Vec<RepoFile> {
    files
        .iter()
        .filter(|file| {
            let name = file.name.to_lowercase();
            let has_code_extension = CODE_EXTENSIONS.iter().any(|ext| name.ends_with(ext));
            let excluded = EXCLUDE_PATTERNS
                .iter()
                .any(|pattern| pattern.is_match(&file.path));
            has_code_extension && !excluded
        })
        .cloned()
        .collect()
}
