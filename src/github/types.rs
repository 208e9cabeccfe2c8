//! Response payloads for the GitHub REST endpoints this tool reads.
//!
//! Only the fields the report consumes are declared; serde skips the rest.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `/repos/{user}/{repo}` — headline repository counters.
#[derive(Deserialize, Debug, Clone)]
pub struct RepoInfo {
    pub stargazers_count: u64,
    pub subscribers_count: u64,
    pub forks_count: u64,
    /// Open issues *including* open pull requests; the report subtracts
    /// the PR count fetched separately.
    pub open_issues: u64,
}

/// `/search/issues` — only the match count is needed.
#[derive(Deserialize, Debug)]
pub struct SearchCount {
    pub total_count: u64,
}

/// One day of views or clones: total hits and unique visitors.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CountedItem {
    pub timestamp: DateTime<Utc>,
    pub count: u64,
    pub uniques: u64,
}

/// `/repos/{user}/{repo}/traffic/views`
#[derive(Deserialize, Debug)]
pub struct PageViews {
    pub views: Vec<CountedItem>,
}

/// `/repos/{user}/{repo}/traffic/clones`
#[derive(Deserialize, Debug)]
pub struct RepoClones {
    pub clones: Vec<CountedItem>,
}

/// `/repos/{user}/{repo}/traffic/popular/paths` entry.
#[derive(Deserialize, Debug, Clone)]
pub struct PopularPath {
    pub path: String,
    pub count: u64,
    pub uniques: u64,
}

/// `/repos/{user}/{repo}/traffic/popular/referrers` entry.
#[derive(Deserialize, Debug, Clone)]
pub struct PopularReferrer {
    pub referrer: String,
    pub count: u64,
    pub uniques: u64,
}

/// `/repos/{user}/{repo}/stargazers` entry.
#[derive(Deserialize, Debug)]
pub struct Stargazer {
    pub login: String,
}
