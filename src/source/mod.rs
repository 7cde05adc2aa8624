//! Where the raw report text comes from.
//!
//! Every source ends in the same place: report text plus the release version
//! it describes. The network-backed sources ask the report service to write
//! the text; [`SavedReport`] replays one that was archived earlier.

pub mod claude;
pub mod github;
pub mod prompt;

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::info;

use crate::error::{DashboardError, Result};
use claude::ClaudeClient;
use github::{CompareTarget, GithubClient};

/// Report text and the version it was written for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedReport {
    pub text: String,
    pub version: String,
}

pub trait ReportSource {
    /// One line for the progress output.
    fn describe(&self) -> String;

    async fn produce(&self) -> Result<SourcedReport>;
}

/// Compares the two newest `release/X.Y.Z` branches and lets the service
/// read the compare page.
pub struct BranchCompare {
    pub github: GithubClient,
    pub claude: ClaudeClient,
    pub repo: String,
}

impl ReportSource for BranchCompare {
    fn describe(&self) -> String {
        format!("latest release branches of {}", self.repo)
    }

    async fn produce(&self) -> Result<SourcedReport> {
        let names = self.github.branch_names(&self.repo).await?;
        let (previous, current) = github::latest_pair(names)?;
        let url = github::compare_url(&self.repo, &previous, &current);
        info!(previous = %previous.name, current = %current.name, "comparing releases");

        let text = self.claude.complete(&prompt::for_compare_url(&url), false).await?;
        Ok(SourcedReport {
            text,
            version: current.version_string(),
        })
    }
}

/// A compare URL given by hand. The service browses it with web search.
pub struct ManualUrl {
    pub claude: ClaudeClient,
    pub compare_url: String,
    pub version: Option<String>,
}

impl ReportSource for ManualUrl {
    fn describe(&self) -> String {
        format!("compare URL {}", self.compare_url)
    }

    async fn produce(&self) -> Result<SourcedReport> {
        let version = resolve_version(self.version.as_deref(), &self.compare_url);
        let text = self
            .claude
            .complete(&prompt::for_compare_url(&self.compare_url), true)
            .await?;
        Ok(SourcedReport { text, version })
    }
}

/// Fetches the changelog from GitHub and embeds it in the prompt, for
/// repositories the service cannot read.
pub struct FetchedChangelog {
    pub github: GithubClient,
    pub claude: ClaudeClient,
    pub compare_url: String,
    pub file_limit: usize,
}

impl ReportSource for FetchedChangelog {
    fn describe(&self) -> String {
        format!("changelog of {}", self.compare_url)
    }

    async fn produce(&self) -> Result<SourcedReport> {
        let target = CompareTarget::parse(&self.compare_url)?;
        let version = target.version();
        info!(owner = %target.owner, repo = %target.repo, %version, "resolved compare URL");

        let data = self.github.compare(&target).await?;
        let changelog = github::format_changelog(&target, &data, self.file_limit);
        let text = self.claude.complete(&prompt::for_changelog(&changelog), false).await?;
        Ok(SourcedReport { text, version })
    }
}

/// Report text saved by an earlier run or written by hand.
pub struct SavedReport {
    pub path: PathBuf,
    pub version: String,
}

impl ReportSource for SavedReport {
    fn describe(&self) -> String {
        format!("saved report {}", self.path.display())
    }

    async fn produce(&self) -> Result<SourcedReport> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => DashboardError::MissingResource {
                    path: self.path.clone(),
                },
                _ => DashboardError::io(&self.path, e),
            })?;
        Ok(SourcedReport {
            text,
            version: self.version.clone(),
        })
    }
}

/// Explicit version, else the one at the end of the URL, else "Unknown".
fn resolve_version(explicit: Option<&str>, compare_url: &str) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| github::version_from_compare_url(compare_url))
        .unwrap_or_else(|| github::UNKNOWN_VERSION.to_string())
}
