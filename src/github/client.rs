//! Async client for the handful of GitHub REST endpoints the report reads.
//!
//! The base URL is injectable so integration tests can point the client at
//! a mock server.

use std::fmt;

use log::{debug, warn};
use serde::de::DeserializeOwned;

use super::types::{
    CountedItem, PageViews, PopularPath, PopularReferrer, RepoClones, RepoInfo, SearchCount,
    Stargazer,
};

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const STARGAZER_PAGE_SIZE: u32 = 100; // API maximum

/// Errors from talking to the GitHub API.
#[derive(Debug)]
pub enum GithubError {
    /// Network-level failure (DNS, timeout, connection refused).
    Network(String),
    /// The API answered with a non-success status.
    Api { status: u16, message: String },
    /// The response body did not match the expected shape.
    Parse(String),
}

impl fmt::Display for GithubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GithubError::Network(msg) => {
                write!(f, "network error: {msg}. Check internet connection.")
            }
            GithubError::Api { status: 401, .. } => {
                write!(f, "unauthorized access, check the supplied token")
            }
            GithubError::Api { status: 404, .. } => {
                write!(f, "user and/or repo not found")
            }
            GithubError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            GithubError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for GithubError {}

/// GitHub REST client carrying the auth token.
#[derive(Clone)]
pub struct GithubClient {
    token: String,
    base_url: String,
    client: reqwest::Client,
}

impl GithubClient {
    /// Creates a client. `base_url` defaults to the public GitHub API.
    pub fn new(token: String, base_url: Option<String>) -> GithubClient {
        GithubClient {
            token,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GithubError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", "gh-traffic")
            .send()
            .await
            .map_err(|e| GithubError::Network(e.to_string()))?;

        let status = response.status();
        debug!("{url} -> {status}");

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("GitHub API error: {} - {}", status.as_u16(), message);
            return Err(GithubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GithubError::Parse(e.to_string()))
    }

    /// Headline repository counters.
    pub async fn repo(&self, user: &str, repo: &str) -> Result<RepoInfo, GithubError> {
        self.get_json(&format!("/repos/{user}/{repo}")).await
    }

    /// Number of open pull requests, via the issue search endpoint.
    pub async fn open_pr_count(&self, user: &str, repo: &str) -> Result<u64, GithubError> {
        let count: SearchCount = self
            .get_json(&format!(
                "/search/issues?q=repo:{user}/{repo}%20is:pr%20is:open&per_page=1"
            ))
            .await?;
        Ok(count.total_count)
    }

    /// Daily page views for the last 14 days.
    pub async fn page_views(&self, user: &str, repo: &str) -> Result<Vec<CountedItem>, GithubError> {
        let views: PageViews = self
            .get_json(&format!("/repos/{user}/{repo}/traffic/views"))
            .await?;
        Ok(views.views)
    }

    /// Daily clones for the last 14 days.
    pub async fn clones(&self, user: &str, repo: &str) -> Result<Vec<CountedItem>, GithubError> {
        let clones: RepoClones = self
            .get_json(&format!("/repos/{user}/{repo}/traffic/clones"))
            .await?;
        Ok(clones.clones)
    }

    /// Most-viewed content paths over the last 14 days.
    pub async fn popular_paths(
        &self,
        user: &str,
        repo: &str,
    ) -> Result<Vec<PopularPath>, GithubError> {
        self.get_json(&format!("/repos/{user}/{repo}/traffic/popular/paths"))
            .await
    }

    /// Top referring sites over the last 14 days.
    pub async fn popular_referrers(
        &self,
        user: &str,
        repo: &str,
    ) -> Result<Vec<PopularReferrer>, GithubError> {
        self.get_json(&format!("/repos/{user}/{repo}/traffic/popular/referrers"))
            .await
    }

    /// Every stargazer login, in starring order, fetched page by page.
    pub async fn stargazers(&self, user: &str, repo: &str) -> Result<Vec<String>, GithubError> {
        let mut gazers: Vec<String> = Vec::new();
        let mut page = 0u32;
        loop {
            page += 1;
            let batch: Vec<Stargazer> = self
                .get_json(&format!(
                    "/repos/{user}/{repo}/stargazers?per_page={STARGAZER_PAGE_SIZE}&page={page}"
                ))
                .await?;
            if batch.is_empty() {
                break;
            }
            gazers.extend(batch.into_iter().map(|s| s.login));
        }
        Ok(gazers)
    }
}
