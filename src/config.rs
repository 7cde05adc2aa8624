//! Runtime settings.
//!
//! Built-in defaults, overridden by `risk_dashboard.toml` (or the file passed
//! with `--config`), overridden by `RISK_*` environment variables. List values
//! in the environment are comma separated.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::patch::DocumentLabels;

const CONFIG_FILE: &str = "risk_dashboard.toml";
const ENV_PREFIX: &str = "RISK";
const LIST_KEYS: &[&str] = &[
    "template_dates",
    "other_changes_headers",
    "secondary_counter_labels",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dashboard_path: PathBuf,
    pub report_template_path: PathBuf,
    pub reports_dir: PathBuf,
    pub archive_dir: PathBuf,

    pub release_label: String,
    pub template_version: String,
    pub template_dates: Vec<String>,
    pub timezone_label: String,
    pub other_changes_headers: Vec<String>,
    pub secondary_counter_labels: Vec<String>,

    pub model: String,
    pub max_tokens: u32,
    pub anthropic_api_url: String,
    pub github_api_url: String,
    pub changelog_file_limit: usize,

    /// Printed after a successful run when non-empty.
    pub dashboard_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            dashboard_path: PathBuf::from("index.html"),
            report_template_path: PathBuf::from("report-template.html"),
            reports_dir: PathBuf::from("reports"),
            archive_dir: PathBuf::from("claude_reports"),
            release_label: "Android RC".into(),
            template_version: "4.33.0".into(),
            template_dates: vec!["Jan 27, 2026".into(), "January 27, 2026".into()],
            timezone_label: "PST".into(),
            other_changes_headers: vec!["Other Notable Changes".into()],
            secondary_counter_labels: vec!["Red Flags".into(), "Medium Risk".into()],
            model: "claude-sonnet-4-20250514".into(),
            max_tokens: 4000,
            anthropic_api_url: "https://api.anthropic.com/v1/messages".into(),
            github_api_url: "https://api.github.com".into(),
            changelog_file_limit: 50,
            dashboard_url: String::new(),
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(CONFIG_FILE).required(false),
        };

        let env = LIST_KEYS.iter().fold(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(","),
            |env, key| env.with_list_parse_key(key),
        );

        let settings = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn labels(&self) -> DocumentLabels {
        DocumentLabels {
            release_label: self.release_label.clone(),
            template_version: self.template_version.clone(),
            template_dates: self.template_dates.clone(),
            timezone_label: self.timezone_label.clone(),
            secondary_counter_labels: self.secondary_counter_labels.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_existing_documents() {
        let s = Settings::default();
        assert_eq!(s.dashboard_path, PathBuf::from("index.html"));
        assert_eq!(s.release_label, "Android RC");
        assert_eq!(s.other_changes_headers, vec!["Other Notable Changes"]);
        assert_eq!(s.max_tokens, 4000);
    }

    #[test]
    fn file_overrides_some_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "release_label = \"iOS RC\"\nother_changes_headers = [\"Other Notable Changes\", \"Red Flags\"]\n",
        )
        .unwrap();

        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.release_label, "iOS RC");
        assert_eq!(s.other_changes_headers.len(), 2);
        assert_eq!(s.reports_dir, PathBuf::from("reports"));
        assert_eq!(s.labels().release_label, "iOS RC");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("does/not/exist.toml"))).is_err());
    }
}
