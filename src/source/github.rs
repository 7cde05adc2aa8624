//! GitHub REST access: release branches and compare data.

use std::fmt::Write;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::info;

use crate::config::Settings;
use crate::error::{DashboardError, Result};

const SERVICE: &str = "GitHub";
const USER_AGENT: &str = concat!("risk_dashboard/", env!("CARGO_PKG_VERSION"));
pub const UNKNOWN_VERSION: &str = "Unknown";

static RELEASE_BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^release/(\d+)\.(\d+)\.(\d+)").unwrap());
static COMPARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com/([^/]+)/([^/]+)/compare/(.+)\.\.\.(.+)$").unwrap());
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+)").unwrap());
static URL_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:release/|v)(\d+\.\d+\.\d+)$").unwrap());

// ── Release branches ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranch {
    pub name: String,
    pub version: (u64, u64, u64),
}

impl ReleaseBranch {
    /// `release/X.Y.Z...`; anything else is not a release branch.
    pub fn parse(name: &str) -> Option<Self> {
        let caps = RELEASE_BRANCH_RE.captures(name)?;
        let part = |i: usize| caps[i].parse::<u64>().ok();
        Some(ReleaseBranch {
            name: name.to_string(),
            version: (part(1)?, part(2)?, part(3)?),
        })
    }

    pub fn version_string(&self) -> String {
        let (major, minor, patch) = self.version;
        format!("{major}.{minor}.{patch}")
    }
}

/// The two newest release branches as `(previous, current)`.
pub fn latest_pair<I, S>(names: I) -> Result<(ReleaseBranch, ReleaseBranch)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut releases: Vec<ReleaseBranch> = names
        .into_iter()
        .filter_map(|n| ReleaseBranch::parse(n.as_ref()))
        .collect();
    releases.sort_by(|a, b| b.version.cmp(&a.version));

    let mut newest = releases.into_iter();
    match (newest.next(), newest.next()) {
        (Some(current), Some(previous)) => Ok((previous, current)),
        (current, _) => Err(DashboardError::NotEnoughReleases(usize::from(current.is_some()))),
    }
}

pub fn compare_url(repo: &str, previous: &ReleaseBranch, current: &ReleaseBranch) -> String {
    format!(
        "https://github.com/{repo}/compare/{}...{}",
        previous.name, current.name
    )
}

/// Version at the end of a compare URL (`release/X.Y.Z` or `vX.Y.Z`).
pub fn version_from_compare_url(url: &str) -> Option<String> {
    URL_VERSION_RE.captures(url).map(|c| c[1].to_string())
}

// ── Compare ──

/// Owner, repository and refs taken from a GitHub compare URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareTarget {
    pub owner: String,
    pub repo: String,
    pub base: String,
    pub head: String,
}

impl CompareTarget {
    pub fn parse(url: &str) -> Result<Self> {
        let caps = COMPARE_URL_RE
            .captures(url)
            .ok_or_else(|| DashboardError::InvalidCompareUrl(url.to_string()))?;
        Ok(CompareTarget {
            owner: caps[1].to_string(),
            repo: caps[2].to_string(),
            base: caps[3].to_string(),
            head: caps[4].to_string(),
        })
    }

    /// First `X.Y.Z` in the head ref, or "Unknown".
    pub fn version(&self) -> String {
        VERSION_RE
            .captures(&self.head)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareData {
    #[serde(default)]
    pub total_commits: u64,
    #[serde(default)]
    pub commits: Vec<CommitEntry>,
    #[serde(default)]
    pub files: Vec<FileChange>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitEntry {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileChange {
    pub filename: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changes: u64,
}

/// Plain-text changelog embedded in the prompt. Lists at most `file_limit` files.
pub fn format_changelog(target: &CompareTarget, data: &CompareData, file_limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Repository: {}/{}", target.owner, target.repo);
    let _ = writeln!(out, "Comparing: {} → {}", target.base, target.head);
    let _ = writeln!(out, "Total commits: {}", data.total_commits);
    let _ = writeln!(out, "Files changed: {}\n", data.files.len());

    out.push_str("=== COMMITS ===\n\n");
    for entry in &data.commits {
        let sha = entry.sha.get(..7).unwrap_or(&entry.sha);
        let _ = writeln!(out, "Commit: {sha}");
        let _ = writeln!(out, "Author: {}", entry.commit.author.name);
        let _ = writeln!(out, "Date: {}", entry.commit.author.date);
        let _ = writeln!(out, "Message: {}", entry.commit.message);
        let _ = writeln!(out, "{}\n", "-".repeat(50));
    }

    out.push_str("\n=== FILES CHANGED ===\n\n");
    for file in data.files.iter().take(file_limit) {
        let _ = writeln!(out, "{}", file.filename);
        let _ = writeln!(
            out,
            "  +{} -{} (total: {} changes)",
            file.additions, file.deletions, file.changes
        );
    }
    if data.files.len() > file_limit {
        let _ = writeln!(out, "\n... and {} more files", data.files.len() - file_limit);
    }
    out
}

// ── Client ──

#[derive(Debug, Deserialize)]
struct Branch {
    name: String,
}

pub struct GithubClient {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(settings: &Settings, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DashboardError::upstream(SERVICE, e))?;
        Ok(GithubClient {
            client,
            api_url: settings.github_api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let req = self
            .client
            .get(format!("{}{path}", self.api_url))
            .header("Accept", "application/vnd.github.v3+json");
        match &self.token {
            Some(token) => req.header("Authorization", format!("token {token}")),
            None => req,
        }
    }

    /// Branch names of `repo` (`owner/name`), first page of 100.
    pub async fn branch_names(&self, repo: &str) -> Result<Vec<String>> {
        info!(repo, "fetching release branches");
        let branches: Vec<Branch> = fetch_json(self.get(&format!("/repos/{repo}/branches?per_page=100"))).await?;
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    pub async fn compare(&self, target: &CompareTarget) -> Result<CompareData> {
        info!(base = %target.base, head = %target.head, "fetching changelog");
        let path = format!(
            "/repos/{}/{}/compare/{}...{}",
            target.owner, target.repo, target.base, target.head
        );
        let data: CompareData = fetch_json(self.get(&path)).await?;
        info!(
            commits = data.total_commits,
            files = data.files.len(),
            "fetched changelog"
        );
        Ok(data)
    }
}

async fn fetch_json<T: serde::de::DeserializeOwned>(req: RequestBuilder) -> Result<T> {
    let response = req
        .send()
        .await
        .map_err(|e| DashboardError::upstream(SERVICE, e))?;
    let status = response.status();
    if !status.is_success() {
        let url = response.url().to_string();
        return Err(DashboardError::upstream(SERVICE, format!("{url}: HTTP {status}")));
    }
    response
        .json()
        .await
        .map_err(|e| DashboardError::upstream(SERVICE, e))
}

// ── Tests ──
