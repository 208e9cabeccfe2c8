//! # Traffic report
//!
//! Fetches repository statistics from the GitHub API and assembles the
//! terminal report: a summary line, daily views/clones charts, popular
//! paths and referrers, and the stargazer diff against the previous run.
//! Chart blocks are arranged with [`crate::tile`] and printed as one
//! rendered string.

pub mod charts;

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::time::Duration;

use chrono::{Local, Utc};
use log::info;

use crate::ansi::{DKGREY, GREEN, RED, RESET, YELLOW};
use crate::github::{GithubClient, GithubError, RepoInfo};
use crate::history::HistoryStore;
use crate::progress::Progress;
use crate::tile::{InvalidLayoutOperation, Layout, Margin, Tile};
use charts::LabeledCount;

/// Anything that can stop a report run.
#[derive(Debug)]
pub enum ReportError {
    Github(GithubError),
    History(io::Error),
    Layout(InvalidLayoutOperation),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Github(e) => write!(f, "{e}"),
            ReportError::History(e) => write!(f, "history error: {e}"),
            ReportError::Layout(e) => write!(f, "report layout error: {e}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<GithubError> for ReportError {
    fn from(e: GithubError) -> ReportError {
        ReportError::Github(e)
    }
}

impl From<io::Error> for ReportError {
    fn from(e: io::Error) -> ReportError {
        ReportError::History(e)
    }
}

impl From<InvalidLayoutOperation> for ReportError {
    fn from(e: InvalidLayoutOperation) -> ReportError {
        ReportError::Layout(e)
    }
}

/// One report run for a single repository.
pub struct TrafficReport {
    client: GithubClient,
    user: String,
    repo: String,
    days: u32,
    store: HistoryStore,
}

impl TrafficReport {
    pub fn new(
        client: GithubClient,
        user: String,
        repo: String,
        days: u32,
        store: HistoryStore,
    ) -> TrafficReport {
        TrafficReport {
            client,
            user,
            repo,
            days,
            store,
        }
    }

    /// Fetches everything and prints the report to stdout.
    pub async fn run(&self) -> Result<(), ReportError> {
        info!("reporting on {}/{} over {} days", self.user, self.repo, self.days);

        println!();
        println!("{}", self.header());
        println!();
        println!("{}", self.stats_line().await?);
        println!();
        println!("{}-day summary{DKGREY} (UTC time){RESET}", self.days);
        println!();
        println!("{}", self.build_charts().await?);
        println!("{}", self.stargazer_diff().await?);
        Ok(())
    }

    fn header(&self) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        format!(
            "Repo: {}/{YELLOW}{}  {DKGREY}{timestamp}{RESET}",
            self.user, self.repo
        )
    }

    /// The one-line summary: stars (with the delta against the last
    /// recorded count), watchers, forks, open PRs, open issues.
    async fn stats_line(&self) -> Result<String, ReportError> {
        let prev_stars = self.store.last_star_count()?;
        let repo_info = self.client.repo(&self.user, &self.repo).await?;
        let open_prs = self.client.open_pr_count(&self.user, &self.repo).await?;
        self.store
            .record_star_count(Utc::now(), repo_info.stargazers_count)?;
        Ok(summary_line(&repo_info, open_prs, prev_stars))
    }

    /// The chart block: views and clones side by side, and for a full
    /// 14-day window a second row of popular paths and referring sites
    /// (that data always covers 14 days).
    async fn build_charts(&self) -> Result<String, ReportError> {
        let views = self.client.page_views(&self.user, &self.repo).await?;
        let clones = self.client.clones(&self.user, &self.repo).await?;
        let today = Utc::now().date_naive();

        let mut root = Tile::container(Layout::Column, Margin::EMPTY);
        let mut top = Tile::container(Layout::Row, Margin::EMPTY);
        top.append_with_margin(
            &charts::counts_chart("Views", &views, self.days, today, charts::views_per_user),
            Margin::new(0, 0, 0, 4),
        )?;
        top.append(charts::counts_chart(
            "Clones",
            &clones,
            self.days,
            today,
            |_, _| String::new(),
        ))?;
        root.append(top)?;

        if self.days >= 14 {
            let paths: Vec<LabeledCount> = self
                .client
                .popular_paths(&self.user, &self.repo)
                .await?
                .into_iter()
                .map(|p| LabeledCount {
                    label: remove_repo_path(&p.path, &self.user, &self.repo),
                    count: p.count,
                    uniques: p.uniques,
                })
                .collect();
            let referrers: Vec<LabeledCount> = self
                .client
                .popular_referrers(&self.user, &self.repo)
                .await?
                .into_iter()
                .map(|r| LabeledCount {
                    label: r.referrer,
                    count: r.count,
                    uniques: r.uniques,
                })
                .collect();

            let mut bottom = Tile::container(Layout::Row, Margin::new(1, 0, 1, 0));
            bottom.append_with_margin(
                &charts::paths_chart("Top views", charts::MAX_URL, &paths),
                Margin::new(0, 0, 0, 4),
            )?;
            bottom.append(charts::paths_chart(
                "Referring sites",
                charts::MAX_REFERRER_URL,
                &referrers,
            ))?;
            root.append(bottom)?;
        }

        Ok(root.render())
    }

    /// Fetches the current stargazers (with a busy indicator; the list is
    /// paginated and can take a while), diffs against the stored snapshot,
    /// and saves the new snapshot. First run produces no diff.
    async fn stargazer_diff(&self) -> Result<String, ReportError> {
        let now_gazers = self.fetch_stargazers().await?;

        let mut result = String::new();
        if let Some(prev) = self.store.load_stargazers()? {
            let (gained, lost) = diff_stargazers(&prev, &now_gazers);
            let mut parent = Tile::container(Layout::Row, Margin::EMPTY);
            if !gained.is_empty() {
                parent.append(Tile::new(
                    &gazers_list(&gained, "New stars", "+", GREEN),
                    Layout::Manual,
                    Margin::new(0, 0, 0, 2),
                ))?;
            }
            if !lost.is_empty() {
                parent.append(gazers_list(&lost, "Lost stars", "-", RED))?;
            }
            result = parent.render();
        }
        self.store.save_stargazers(&now_gazers)?;
        Ok(result)
    }

    /// Runs the paginated fetch on a background task and bumps the busy
    /// indicator every 250 ms until it finishes.
    async fn fetch_stargazers(&self) -> Result<Vec<String>, GithubError> {
        let mut progress = Progress::start("Fetching stargazers...");
        let client = self.client.clone();
        let (user, repo) = (self.user.clone(), self.repo.clone());
        let mut task = tokio::spawn(async move { client.stargazers(&user, &repo).await });

        let joined = loop {
            tokio::select! {
                joined = &mut task => break joined,
                _ = tokio::time::sleep(Duration::from_millis(250)) => progress.bump(),
            }
        };
        progress.clear();

        joined.map_err(|e| GithubError::Network(format!("stargazer fetch aborted: {e}")))?
    }
}

/// Builds the summary stats line. The stars delta is only shown when a
/// previous count exists and differs.
fn summary_line(repo_info: &RepoInfo, open_prs: u64, prev_stars: Option<u64>) -> String {
    let stars = repo_info.stargazers_count;
    let mut line = format!("{YELLOW}{stars}{RESET}");
    if let Some(prev) = prev_stars {
        let diff = stars as i64 - prev as i64;
        if diff != 0 {
            let sign = if diff > 0 {
                format!("{GREEN}+")
            } else {
                RED.to_string()
            };
            line.push_str(&format!("{DKGREY}({sign}{diff}{DKGREY})"));
        }
        line.push_str(&format!("{DKGREY} stars"));
    }
    let separator = format!(" {DKGREY}|{RESET} ");
    line.push_str(&separator);
    line.push_str(&count_label(repo_info.subscribers_count, "watcher"));
    line.push_str(&separator);
    line.push_str(&count_label(repo_info.forks_count, "fork"));
    line.push_str(&separator);
    line.push_str(&count_label(open_prs, "pull request"));
    line.push_str(&separator);
    line.push_str(&count_label(
        repo_info.open_issues.saturating_sub(open_prs),
        "issue",
    ));
    line
}

fn count_label(count: u64, label: &str) -> String {
    let plural = if count != 1 { "s" } else { "" };
    format!("{count} {DKGREY}{label}{plural}{RESET}")
}

/// Splits the previous and current stargazer lists into gains and losses.
/// Lost entries are annotated with their original list position.
fn diff_stargazers(prev: &[String], now: &[String]) -> (Vec<String>, Vec<String>) {
    let now_set: HashSet<&str> = now.iter().map(String::as_str).collect();
    let prev_set: HashSet<&str> = prev.iter().map(String::as_str).collect();
    let lost = prev
        .iter()
        .enumerate()
        .filter(|(_, gazer)| !now_set.contains(gazer.as_str()))
        .map(|(i, gazer)| format!("#{} {gazer}", i + 1))
        .collect();
    let gained = now
        .iter()
        .filter(|gazer| !prev_set.contains(gazer.as_str()))
        .cloned()
        .collect();
    (gained, lost)
}

/// A bulleted list of the first ten logins, with a `...and N more` tail.
fn gazers_list(gazers: &[String], title: &str, bullet: &str, color: &str) -> String {
    if gazers.is_empty() {
        return String::new();
    }
    let mut list = format!("{title}\n");
    for gazer in gazers.iter().take(10) {
        list.push_str(&format!("{color}{bullet} {gazer}\n{RESET}"));
    }
    if gazers.len() > 10 {
        list.push_str(&format!("{bullet} ...and {} more\n", gazers.len() - 10));
    }
    list
}

/// Drops the `/<user>/<repo>/` prefix from a popular-path entry, unless
/// the match is at the very start of the string.
fn remove_repo_path(url: &str, user: &str, repo: &str) -> String {
    let repo_path = format!("/{user}/{repo}/");
    match url.find(&repo_path) {
        Some(i) if i > 0 => url[i + repo_path.len()..].to_string(),
        _ => url.to_string(),
    }
}
