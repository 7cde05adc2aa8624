//! Commit and push the run's artifacts.

use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::error::{DashboardError, Result};

pub fn commit_message(week_of: &str, release_label: &str, version: &str) -> String {
    format!("Weekly update: {week_of} - {release_label} {version}")
}

/// `git add` the given paths, commit, push. Any failing step aborts.
pub fn publish(repo: &Path, paths: &[&Path], message: &str) -> Result<()> {
    let mut add = vec!["add".to_string()];
    add.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
    git(repo, &add)?;
    git(repo, &["commit".to_string(), "-m".to_string(), message.to_string()])?;
    git(repo, &["push".to_string()])?;
    info!("pushed weekly update");
    Ok(())
}

/// Commands printed instead of publishing, so the changes can be reviewed.
pub fn review_hints(paths: &[&Path], message: &str) -> Vec<String> {
    let mut hints = Vec::new();
    for (i, path) in paths.iter().enumerate() {
        // the dashboard is edited in place, the rest are new
        if i == 0 {
            hints.push(format!("git diff {}", path.display()));
        } else {
            hints.push(format!("cat {}", path.display()));
        }
    }
    let files: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    hints.push(format!("git add {}", files.join(" ")));
    hints.push(format!("git commit -m '{message}'"));
    hints.push("git push".to_string());
    hints
}

fn git(repo: &Path, args: &[String]) -> Result<()> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .map_err(|e| DashboardError::upstream("git", e))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DashboardError::upstream(
            "git",
            format!("`git {}`: {}", args[0], stderr.trim()),
        ));
    }
    Ok(())
}
