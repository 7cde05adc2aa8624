//! Edits that turn the report-page template into this week's report.

use tracing::debug;

use super::anchor::Anchor;
use super::{DocumentLabels, PatchOp};
use crate::error::Result;
use crate::metadata::RunMetadata;
use crate::render;
use crate::report::Report;

const RISK_BADGE: &str = r#"<div class="risk-badge (?P<class>risk-\w+)">(?P<label>.*?)</div>"#;
const SUMMARY: &str = r#"(?s)<div class="summary-box">.*?<strong>Overall Risk Level: (?P<level>[^<]+)</strong><br>\n(?P<bullets>.*?)</div>"#;
const P0_LIST: &str = r#"(?s)<div class="section-title">.*?P0 —.*?</div>(?P<items>.*?)</div>\s*<!-- ={40}"#;
const ZERO_RISK: &str = r"(?P<areas>Localizations \(string updates only\)[^\n]*?Smart Review)";
const RED_FLAGS: &str = r#"(?s)<div class="section-title">.*?Red Flags.*?</div>(?P<items>.*?)</div>\s*<!-- ={40}"#;
const GENERATED: &str = r"Generated by Claude AI • (?P<timestamp>[^<]+)<br>";

/// Report-page edits, in application order. Template placeholder tokens come
/// first so the anchors after them see the run's version and week.
pub fn ops(report: &Report, meta: &RunMetadata, labels: &DocumentLabels) -> Result<Vec<PatchOp>> {
    let mut ops = vec![PatchOp::new(Anchor::token(
        "template_version",
        &format!("{} {}", labels.release_label, labels.template_version),
    )?)
    .fill("token", format!("{} {}", labels.release_label, meta.version))];
    for date in &labels.template_dates {
        ops.push(PatchOp::new(Anchor::token("template_date", date)?).fill("token", &meta.week_of));
    }

    ops.push(
        PatchOp::new(Anchor::new("risk_badge", RISK_BADGE)?)
            .fill("class", render::risk_class(&report.risk_level))
            .fill("label", render::badge_label(&report.risk_level)),
    );

    let mut summary = PatchOp::new(Anchor::new("summary", SUMMARY)?).fill("level", &report.risk_level);
    if let Some(bullets) = render::summary_block(&report.summary_bullets) {
        summary = summary.fill("bullets", bullets);
    }
    ops.push(summary);

    match render::p0_list(&report.p0_items) {
        Some(html) => ops.push(PatchOp::new(Anchor::new("p0_list", P0_LIST)?).fill("items", html)),
        None => debug!("no P0 items, P0 section left as is"),
    }

    if report.zero_risk_text.is_empty() {
        debug!("no zero-risk areas, placeholder left as is");
    } else {
        ops.push(PatchOp::new(Anchor::new("zero_risk", ZERO_RISK)?).fill("areas", &report.zero_risk_text));
    }

    match render::red_flags(&report.other_changes) {
        Some(html) => ops.push(PatchOp::new(Anchor::new("red_flags", RED_FLAGS)?).fill("items", html)),
        None => debug!("no other changes, red flags left as is"),
    }

    ops.push(
        PatchOp::new(Anchor::new("generated_at", GENERATED)?)
            .fill("timestamp", render::long_timestamp(meta.generated_at, &labels.timezone_label)),
    );
    let report_id = format!(
        r"Report ID: {} (?P<version>[\d.]+)",
        regex::escape(&labels.release_label)
    );
    ops.push(PatchOp::new(Anchor::new("report_id", &report_id)?).fill("version", &meta.version));

    Ok(ops)
}

// ── Tests ──
