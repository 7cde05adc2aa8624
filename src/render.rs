//! HTML fragments for the dashboard and report page.
//!
//! Every function is pure. List renderers return `None` for an empty input so
//! the caller leaves that section of the document as it is.

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::report::P0Item;

const TOP_CONCERNS: usize = 3;

/// CSS class for a risk level: "MEDIUM-HIGH" → "risk-mediumhigh".
pub fn risk_class(level: &str) -> String {
    format!("risk-{}", level.to_lowercase().replace('-', ""))
}

pub fn badge_label(level: &str) -> String {
    format!("⚠️ {level} RISK")
}

/// Footer timestamp, e.g. "October 19, 2026 at 09:30 AM PST".
pub fn long_timestamp(at: NaiveDateTime, zone: &str) -> String {
    format!("{} {zone}", at.format("%B %d, %Y at %I:%M %p"))
}

/// RC-section timestamp, e.g. "Oct 19, 2026 at 09:30 AM PST".
pub fn short_timestamp(at: NaiveDateTime, zone: &str) -> String {
    format!("{} {zone}", at.format("%b %d, %Y at %I:%M %p"))
}

pub fn rc_last_updated(at: NaiveDateTime, zone: &str) -> String {
    format!("\n                    Last updated: {}", short_timestamp(at, zone))
}

/// Dashboard cards for the first three P0 items. An item without a
/// description shows its full text instead.
pub fn top_concerns(items: &[P0Item]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let mut html = String::new();
    for item in items.iter().take(TOP_CONCERNS) {
        let desc = if item.description.is_empty() {
            &item.full_text
        } else {
            &item.description
        };
        let _ = write!(
            html,
            r#"<div class="risk-item critical">
                    <div class="risk-item-title">{title}</div>
                    <div class="risk-item-description">{desc}</div>
                </div>
                "#,
            title = item.title,
        );
    }
    Some(format!("\n                {}", html.trim_end()))
}

/// Summary bullets joined by line breaks, framed for the summary box.
pub fn summary_block(bullets: &[String]) -> Option<String> {
    if bullets.is_empty() {
        return None;
    }
    let joined = bullets
        .iter()
        .map(|b| format!("• {b}"))
        .collect::<Vec<_>>()
        .join("<br>\n                ");
    Some(format!("                {joined}\n            "))
}

/// Full P0 list for the report page.
pub fn p0_list(items: &[P0Item]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let mut html = String::new();
    for item in items {
        let _ = write!(
            html,
            r#"
            <div class="risk-item critical">
                <div class="risk-item-title">
                    <span class="emoji">🎯</span>
                    {title}
                </div>
                <div class="risk-item-description">
                    {desc}
                </div>
                <div class="risk-item-impact">
                    {full}
                </div>
            </div>
"#,
            title = item.title,
            desc = item.description,
            full = item.full_text,
        );
    }
    Some(format!("\n{html}\n        "))
}

/// Red-flag cards built from the other-changes list.
pub fn red_flags(changes: &[String]) -> Option<String> {
    if changes.is_empty() {
        return None;
    }
    let mut html = String::new();
    for change in changes {
        let _ = write!(
            html,
            r#"
            <div class="risk-item high">
                <div class="risk-item-title">
                    <span class="emoji">⚠️</span>
                    {change}
                </div>
            </div>
"#
        );
    }
    Some(format!("\n{html}\n        "))
}
