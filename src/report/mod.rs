pub mod bullets;
pub mod sections;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use sections::SectionHeaders;

pub const DEFAULT_RISK_LEVEL: &str = "MEDIUM";

static RISK_LEVEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Overall Release Risk Level:\s*(\w+(?:-\w+)?)").unwrap());

/// Structured form of one risk report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub risk_level: String,
    pub summary_bullets: Vec<String>,
    pub p0_items: Vec<P0Item>,
    pub other_changes: Vec<String>,
    pub zero_risk_text: String,
}

impl Default for Report {
    fn default() -> Self {
        Report {
            risk_level: DEFAULT_RISK_LEVEL.to_string(),
            summary_bullets: Vec::new(),
            p0_items: Vec::new(),
            other_changes: Vec::new(),
            zero_risk_text: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct P0Item {
    pub ticket: String,
    pub title: String,
    pub description: String,
    pub full_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReportParser {
    headers: SectionHeaders,
}

impl ReportParser {
    pub fn new(other_headers: &[String]) -> Result<Self> {
        Ok(ReportParser {
            headers: SectionHeaders::new(other_headers)?,
        })
    }

    /// Parse free-form report text. Never fails: absent sections fall back to
    /// empty values and the risk level to MEDIUM.
    pub fn parse(&self, raw: &str) -> Report {
        let sections = self.headers.split(raw);

        let risk_level = RISK_LEVEL_RE
            .captures(raw)
            .map(|c| c[1].to_uppercase())
            .unwrap_or_else(|| DEFAULT_RISK_LEVEL.to_string());

        Report {
            risk_level,
            summary_bullets: sections.summary.map(bullets::collect_bullets).unwrap_or_default(),
            p0_items: sections
                .p0
                .map(|s| {
                    bullets::collect_bullets(s)
                        .iter()
                        .map(|b| bullets::split_item(b))
                        .collect()
                })
                .unwrap_or_default(),
            other_changes: sections.other.map(bullets::collect_bullets).unwrap_or_default(),
            zero_risk_text: sections
                .zero_risk
                .and_then(bullets::first_bullet)
                .unwrap_or_default(),
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/report.txt").unwrap()
    }

    #[test]
    fn full_fixture() {
        let report = ReportParser::default().parse(&fixture());
        assert_eq!(report.risk_level, "HIGH-RISK");
        assert_eq!(report.summary_bullets.len(), 2);
        assert_eq!(report.p0_items.len(), 3);
        assert_eq!(report.other_changes.len(), 1);
        assert_eq!(report.zero_risk_text, "Localizations, Smart Review");
    }

    #[test]
    fn p0_order_preserved() {
        let report = ReportParser::default().parse(&fixture());
        let tickets: Vec<&str> = report.p0_items.iter().map(|i| i.ticket.as_str()).collect();
        assert_eq!(tickets, vec!["VOICE-827", "NUX-1844", ""]);
        assert_eq!(report.p0_items[2].title, "Refactored auth module");
        assert_eq!(report.p0_items[2].description, "");
    }

    #[test]
    fn parse_is_deterministic() {
        let parser = ReportParser::default();
        let text = fixture();
        assert_eq!(parser.parse(&text), parser.parse(&text));
    }

    #[test]
    fn empty_input_gives_defaults() {
        let report = ReportParser::default().parse("");
        assert_eq!(report, Report::default());
        assert_eq!(report.risk_level, "MEDIUM");
    }

    #[test]
    fn missing_no_code_section() {
        let text = "Overall Release Risk Level: low\n• fine\n\nP0 — Top QA Focus Areas\n• VOICE-1 — a\n";
        let report = ReportParser::default().parse(text);
        assert_eq!(report.risk_level, "LOW");
        assert_eq!(report.zero_risk_text, "");
        assert_eq!(report.summary_bullets, vec!["fine"]);
        assert_eq!(report.p0_items.len(), 1);
    }

    #[test]
    fn sections_out_of_order() {
        let text = "No Code Changes (Zero Risk)\n• Onboarding\n\
                    P0 — Must Test\n• A-1 — first\n• A-2 — second\n\
                    Overall Release Risk Level: Critical\n• broad changes\n";
        let report = ReportParser::default().parse(text);
        assert_eq!(report.risk_level, "CRITICAL");
        assert_eq!(report.zero_risk_text, "Onboarding");
        assert_eq!(report.summary_bullets, vec!["broad changes"]);
        let tickets: Vec<&str> = report.p0_items.iter().map(|i| i.ticket.as_str()).collect();
        assert_eq!(tickets, vec!["A-1", "A-2"]);
    }

    #[test]
    fn only_first_zero_risk_bullet() {
        let text = "No Code Changes\nnothing here\n• Settings, Profile\n• Second line\n";
        let report = ReportParser::default().parse(text);
        assert_eq!(report.zero_risk_text, "Settings, Profile");
    }

    #[test]
    fn hyphenated_level_uppercased() {
        let report = ReportParser::default().parse("Overall Release Risk Level: medium-high\n");
        assert_eq!(report.risk_level, "MEDIUM-HIGH");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(ReportParser::default().parse(&fixture())).unwrap();
        assert_eq!(json["riskLevel"], "HIGH-RISK");
        assert_eq!(json["p0Items"][0]["fullText"], "VOICE-827 — Fixed crash on login");
        assert_eq!(json["zeroRiskText"], "Localizations, Smart Review");
    }

    #[test]
    fn summary_prose_mentioning_no_code_changes() {
        let text = "Overall Release Risk Level: HIGH\n\
                    • Most modules had no code changes, risk sits in paywall.\n\
                    • Networking touched.\n\n\
                    P0 — Focus\n\
                    • A-1 — x\n";
        let report = ReportParser::default().parse(text);
        assert_eq!(
            report.summary_bullets,
            vec![
                "Most modules had no code changes, risk sits in paywall.",
                "Networking touched.",
            ]
        );
        assert_eq!(report.p0_items.len(), 1);
    }

    #[test]
    fn configured_aliases_build() {
        let parser = ReportParser::new(&["Red Flags".to_string()]).unwrap();
        let report = parser.parse("Red Flags\n• flaky login\n");
        assert_eq!(report.other_changes, vec!["flaky login"]);
    }
}
