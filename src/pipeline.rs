//! One weekly run: parse the report text, patch both documents, persist.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{DashboardError, Result};
use crate::metadata::RunMetadata;
use crate::patch::{self, dashboard, report_page, DocumentLabels};
use crate::report::ReportParser;

/// Where the documents and artifacts of a run live.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub dashboard: PathBuf,
    pub report_template: PathBuf,
    pub reports_dir: PathBuf,
    pub archive_dir: PathBuf,
}

impl Workspace {
    pub fn from_settings(settings: &Settings) -> Self {
        Workspace {
            dashboard: settings.dashboard_path.clone(),
            report_template: settings.report_template_path.clone(),
            reports_dir: settings.reports_dir.clone(),
            archive_dir: settings.archive_dir.clone(),
        }
    }

    pub fn report_path(&self, report_date: &str) -> PathBuf {
        self.reports_dir.join(format!("{report_date}.html"))
    }

    pub fn archive_path(&self, report_date: &str) -> PathBuf {
        self.archive_dir.join(format!("report_{report_date}.md"))
    }
}

pub struct Pipeline {
    parser: ReportParser,
    labels: DocumentLabels,
    workspace: Workspace,
}

impl Pipeline {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Pipeline {
            parser: ReportParser::new(&settings.other_changes_headers)?,
            labels: settings.labels(),
            workspace: Workspace::from_settings(settings),
        })
    }

    /// Run the whole update for `raw` report text. Fails before writing
    /// anything if either document is missing.
    pub fn run(&self, raw: &str, meta: &RunMetadata) -> Result<RunSummary> {
        let ws = &self.workspace;
        let dashboard_doc = read_required(&ws.dashboard)?;
        let template = read_required(&ws.report_template)?;

        if !meta.has_numeric_version() {
            warn!(
                version = %meta.version,
                "version is not numeric, the next run will not find the release line or report ID"
            );
        }

        let report = self.parser.parse(raw);
        info!(
            risk = %report.risk_level,
            p0 = report.p0_items.len(),
            other = report.other_changes.len(),
            summary = report.summary_bullets.len(),
            "parsed report"
        );

        let dashboard_ops = dashboard::ops(&report, meta, &self.labels)?;
        let page_ops = report_page::ops(&report, meta, &self.labels)?;
        let patched_dashboard = patch::patch(&dashboard_doc, &dashboard_ops);
        let patched_page = patch::patch(&template, &page_ops);

        let archive = ws.archive_path(&meta.report_date);
        let archive_written = archive_once(&archive, raw)?;
        if report.p0_items.is_empty() {
            warn!(archive = %archive.display(), "no P0 items parsed, check the archived report text");
        }

        let report_page = ws.report_path(&meta.report_date);
        write_atomic(&report_page, &patched_page.document)?;
        info!(path = %report_page.display(), "report page written");
        write_atomic(&ws.dashboard, &patched_dashboard.document)?;
        info!(path = %ws.dashboard.display(), "dashboard updated");

        Ok(RunSummary {
            version: meta.version.clone(),
            risk_level: report.risk_level,
            p0_items: report.p0_items.len(),
            other_changes: report.other_changes.len(),
            summary_bullets: report.summary_bullets.len(),
            dashboard: ws.dashboard.clone(),
            report_page,
            archive,
            archive_written,
            dashboard_missing: patched_dashboard.missing,
            report_page_missing: patched_page.missing,
        })
    }
}

/// What a run did, for the CLI to print and publish.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub version: String,
    pub risk_level: String,
    pub p0_items: usize,
    pub other_changes: usize,
    pub summary_bullets: usize,
    pub dashboard: PathBuf,
    pub report_page: PathBuf,
    pub archive: PathBuf,
    /// False when an archive for this date already existed.
    pub archive_written: bool,
    pub dashboard_missing: Vec<&'static str>,
    pub report_page_missing: Vec<&'static str>,
}

impl RunSummary {
    pub fn print(&self) {
        println!("Version:      {}", self.version);
        println!("Risk level:   {}", self.risk_level);
        println!(
            "Parsed {} P0 items, {} other changes, {} summary bullets.",
            self.p0_items, self.other_changes, self.summary_bullets
        );
        println!("Dashboard:    {}", self.dashboard.display());
        println!("Report page:  {}", self.report_page.display());
        if self.archive_written {
            println!("Archive:      {}", self.archive.display());
        } else {
            println!("Archive:      {} (kept existing)", self.archive.display());
        }
        if !self.dashboard_missing.is_empty() {
            println!("Dashboard anchors not found: {}", self.dashboard_missing.join(", "));
        }
        if !self.report_page_missing.is_empty() {
            println!("Report page anchors not found: {}", self.report_page_missing.join(", "));
        }
    }

    pub fn written_paths(&self) -> Vec<&Path> {
        vec![
            self.dashboard.as_path(),
            self.report_page.as_path(),
            self.archive.as_path(),
        ]
    }
}

fn read_required(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(DashboardError::MissingResource {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(DashboardError::io(path, e)),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|e| DashboardError::io(dir, e))
        }
        _ => Ok(()),
    }
}

/// Write the raw text unless an archive for this date exists. Returns whether
/// it was written. The archive only appears once its full text is on disk.
fn archive_once(path: &Path, raw: &str) -> Result<bool> {
    if path.exists() {
        warn!(path = %path.display(), "archive already exists, leaving it untouched");
        return Ok(false);
    }
    ensure_parent(path)?;
    let tmp = tmp_sibling(path);
    fs::write(&tmp, raw).map_err(|e| DashboardError::io(&tmp, e))?;

    let linked = fs::hard_link(&tmp, path);
    let _ = fs::remove_file(&tmp);
    match linked {
        Ok(()) => {
            info!(path = %path.display(), "archived report text");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            warn!(path = %path.display(), "archive already exists, leaving it untouched");
            Ok(false)
        }
        Err(e) => Err(DashboardError::io(path, e)),
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    ensure_parent(path)?;
    let tmp = tmp_sibling(path);
    fs::write(&tmp, contents).map_err(|e| DashboardError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| DashboardError::io(path, e))
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn meta() -> RunMetadata {
        let now = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        RunMetadata::at("4.34.0", None, now)
    }

    fn setup() -> (TempDir, Settings) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::copy("tests/fixtures/dashboard.html", root.join("index.html")).unwrap();
        fs::copy(
            "tests/fixtures/report-template.html",
            root.join("report-template.html"),
        )
        .unwrap();
        let settings = Settings {
            dashboard_path: root.join("index.html"),
            report_template_path: root.join("report-template.html"),
            reports_dir: root.join("reports"),
            archive_dir: root.join("claude_reports"),
            ..Settings::default()
        };
        (dir, settings)
    }

    fn report_text() -> String {
        fs::read_to_string("tests/fixtures/report.txt").unwrap()
    }

    #[test]
    fn run_writes_all_artifacts() {
        let (dir, settings) = setup();
        let raw = report_text();
        let summary = Pipeline::new(&settings).unwrap().run(&raw, &meta()).unwrap();

        assert_eq!(summary.risk_level, "HIGH-RISK");
        assert_eq!(summary.p0_items, 3);
        assert!(summary.archive_written);
        assert!(summary.dashboard_missing.is_empty());
        assert!(summary.report_page_missing.is_empty());

        let page = fs::read_to_string(dir.path().join("reports/2026-10-19.html")).unwrap();
        assert!(page.contains("Report ID: Android RC 4.34.0</div>"));
        let dash = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(dash.contains(r#"<a href="reports/2026-10-19.html" class="view-full-report">"#));
        let archived = fs::read_to_string(dir.path().join("claude_reports/report_2026-10-19.md")).unwrap();
        assert_eq!(archived, raw);
        assert!(!dir.path().join("index.html.tmp").exists());
        assert_eq!(summary.written_paths().len(), 3);
    }

    #[test]
    fn missing_dashboard_writes_nothing() {
        let (dir, settings) = setup();
        fs::remove_file(dir.path().join("index.html")).unwrap();
        let err = Pipeline::new(&settings).unwrap().run(&report_text(), &meta()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingResource { .. }));
        assert!(!dir.path().join("reports").exists());
        assert!(!dir.path().join("claude_reports").exists());
    }

    #[test]
    fn missing_template_leaves_dashboard_alone() {
        let (dir, settings) = setup();
        fs::remove_file(dir.path().join("report-template.html")).unwrap();
        let before = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(Pipeline::new(&settings).unwrap().run(&report_text(), &meta()).is_err());
        assert_eq!(fs::read_to_string(dir.path().join("index.html")).unwrap(), before);
    }

    #[test]
    fn existing_archive_is_kept() {
        let (dir, settings) = setup();
        let archive = dir.path().join("claude_reports/report_2026-10-19.md");
        fs::create_dir_all(archive.parent().unwrap()).unwrap();
        fs::write(&archive, "first run").unwrap();

        let summary = Pipeline::new(&settings).unwrap().run(&report_text(), &meta()).unwrap();
        assert!(!summary.archive_written);
        assert_eq!(fs::read_to_string(&archive).unwrap(), "first run");
    }

    #[test]
    fn unstructured_text_still_completes() {
        let (dir, settings) = setup();
        let summary = Pipeline::new(&settings)
            .unwrap()
            .run("The service returned prose only.", &meta())
            .unwrap();
        assert_eq!(summary.p0_items, 0);
        assert_eq!(summary.risk_level, "MEDIUM");
        let dash = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(dash.contains("OLD-1 — Old concern"));
        assert!(dash.contains(r#"<span class="risk-level risk-medium">MEDIUM</span>"#));
    }

    #[test]
    fn workspace_paths_keyed_by_date() {
        let ws = Workspace::from_settings(&Settings::default());
        assert_eq!(ws.report_path("2026-10-19"), PathBuf::from("reports/2026-10-19.html"));
        assert_eq!(
            ws.archive_path("2026-10-19"),
            PathBuf::from("claude_reports/report_2026-10-19.md")
        );
    }

    #[test]
    fn stale_tmp_does_not_block_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("claude_reports/report_2026-10-19.md");
        fs::create_dir_all(archive.parent().unwrap()).unwrap();
        fs::write(tmp_sibling(&archive), "half a rep").unwrap();

        assert!(archive_once(&archive, "full report text").unwrap());
        assert_eq!(fs::read_to_string(&archive).unwrap(), "full report text");
        assert!(!tmp_sibling(&archive).exists());

        assert!(!archive_once(&archive, "second run").unwrap());
        assert_eq!(fs::read_to_string(&archive).unwrap(), "full report text");
        assert!(!tmp_sibling(&archive).exists());
    }

    #[test]
    fn non_numeric_version_still_runs() {
        let (dir, settings) = setup();
        let meta = RunMetadata {
            version: "Unknown".into(),
            ..meta()
        };
        let summary = Pipeline::new(&settings).unwrap().run(&report_text(), &meta).unwrap();
        assert!(summary.dashboard_missing.is_empty());
        let page = fs::read_to_string(dir.path().join("reports/2026-10-19.html")).unwrap();
        assert!(page.contains("Report ID: Android RC Unknown</div>"));
    }

    #[test]
    fn other_header_aliases_reach_the_parser() {
        let (_dir, mut settings) = setup();
        settings.other_changes_headers = vec!["Other Notable Changes".into(), "Red Flags".into()];
        assert!(Pipeline::new(&settings).is_ok());
    }
}
