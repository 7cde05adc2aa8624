//! Edits to the weekly dashboard's "Weekly RC Release Risk" card.

use tracing::debug;

use super::anchor::Anchor;
use super::{DocumentLabels, PatchOp};
use crate::error::Result;
use crate::metadata::RunMetadata;
use crate::render;
use crate::report::Report;

const RISK_BADGE: &str = r#"<span class="risk-level (?P<class>risk-\w+)">(?P<label>[^<]+)</span>"#;
const P0_COUNTER: &str = r#"<div class="stat-mini-value" style="color: #d44c47;">(?P<count>\d+)</div>\s*<div class="stat-mini-label">P0 Items"#;
const TOP_CONCERNS: &str = r#"(?s)<div style="margin-bottom: 8px;">.*?Top Concerns:</div>\s*</div>(?P<concerns>\s*.*?)\s*<!-- UPDATE: Warning message -->"#;
const REPORT_LINK: &str = r#"<a href="reports/(?P<date>[\d-]+)\.html" class="view-full-report">"#;
const FOOTER_UPDATED: &str = r#"<span class="last-updated">Last Updated:</span> (?P<timestamp>[^•]+)"#;
const RC_UPDATED: &str = r#"<div style="font-size: 10px; color: #9b9a97; margin-bottom: 8px;">(?P<line>\s*Last updated: [^<]+)"#;

/// Dashboard edits, in application order.
pub fn ops(report: &Report, meta: &RunMetadata, labels: &DocumentLabels) -> Result<Vec<PatchOp>> {
    let release_line = format!(
        r"<strong>{} (?P<version>[\d.]+)</strong> • Week of (?P<week>[^<]+)",
        regex::escape(&labels.release_label)
    );
    let secondary_counter = format!(
        r#"<div class="stat-mini-value" style="color: #cb912f;">(?P<count>\d+)</div>\s*<div class="stat-mini-label">(?:{})"#,
        alternation(&labels.secondary_counter_labels)
    );

    let mut ops = vec![
        PatchOp::new(Anchor::new("risk_badge", RISK_BADGE)?)
            .fill("class", render::risk_class(&report.risk_level))
            .fill("label", &report.risk_level),
        PatchOp::new(Anchor::new("release_line", &release_line)?)
            .fill("version", &meta.version)
            .fill("week", &meta.week_of),
        PatchOp::new(Anchor::new("p0_counter", P0_COUNTER)?)
            .fill("count", report.p0_items.len().to_string()),
        PatchOp::new(Anchor::new("secondary_counter", &secondary_counter)?)
            .fill("count", report.other_changes.len().to_string()),
    ];

    match render::top_concerns(&report.p0_items) {
        Some(html) => ops.push(PatchOp::new(Anchor::new("top_concerns", TOP_CONCERNS)?).fill("concerns", html)),
        None => debug!("no P0 items, top concerns left as is"),
    }

    ops.push(PatchOp::new(Anchor::new("report_link", REPORT_LINK)?).fill("date", &meta.report_date));
    ops.push(
        PatchOp::new(Anchor::new("footer_updated", FOOTER_UPDATED)?)
            .fill("timestamp", render::long_timestamp(meta.generated_at, &labels.timezone_label)),
    );
    ops.push(
        PatchOp::new(Anchor::new("rc_updated", RC_UPDATED)?)
            .fill("line", render::rc_last_updated(meta.generated_at, &labels.timezone_label)),
    );

    Ok(ops)
}

fn alternation(labels: &[String]) -> String {
    labels
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|")
}

// ── Tests ──
