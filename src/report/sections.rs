use std::ops::Range;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::error::{DashboardError, Result};

pub const RISK_LABEL: &str = "Overall Release Risk Level:";
pub const P0_HEADER: &str = "P0 —";
pub const NO_CODE_HEADER: &str = "No Code Changes";
pub const DEFAULT_OTHER_HEADER: &str = "Other Notable Changes";

static RISK: LazyLock<Header> = LazyLock::new(|| Header::new(RISK_LABEL).unwrap());
static P0: LazyLock<Header> = LazyLock::new(|| Header::new(P0_HEADER).unwrap());
static NO_CODE: LazyLock<Header> = LazyLock::new(|| Header::new(NO_CODE_HEADER).unwrap());
static DEFAULT_OTHER: LazyLock<Header> = LazyLock::new(|| Header::new(DEFAULT_OTHER_HEADER).unwrap());

/// A header phrase matched case-insensitively anywhere in the text.
#[derive(Debug, Clone)]
pub struct Header(Regex);

impl Header {
    pub fn new(phrase: &str) -> std::result::Result<Self, regex::Error> {
        RegexBuilder::new(&regex::escape(phrase))
            .case_insensitive(true)
            .build()
            .map(Header)
    }

    fn find_from(&self, text: &str, from: usize) -> Option<Range<usize>> {
        self.0.find_at(text, from).map(|m| m.range())
    }
}

/// Raw text of each recognised section. A missing header leaves its slot None.
#[derive(Debug, Default)]
pub struct ReportSections<'t> {
    pub summary: Option<&'t str>,
    pub p0: Option<&'t str>,
    pub other: Option<&'t str>,
    pub zero_risk: Option<&'t str>,
}

#[derive(Debug, Clone)]
pub struct SectionHeaders {
    risk: Header,
    p0: Header,
    other: Vec<Header>,
    no_code: Header,
}

impl Default for SectionHeaders {
    fn default() -> Self {
        Self::with_other(vec![DEFAULT_OTHER.clone()])
    }
}

impl SectionHeaders {
    /// `other_aliases` are interchangeable headers for the other-changes section.
    pub fn new(other_aliases: &[String]) -> Result<Self> {
        let other = other_aliases
            .iter()
            .map(|phrase| {
                Header::new(phrase).map_err(|source| DashboardError::InvalidHeader {
                    phrase: phrase.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_other(other))
    }

    fn with_other(other: Vec<Header>) -> Self {
        SectionHeaders {
            risk: RISK.clone(),
            p0: P0.clone(),
            other,
            no_code: NO_CODE.clone(),
        }
    }

    /// Cut `text` into sections. The summary runs to the P0 header or the end
    /// of text, so header phrases inside summary prose do not cut it short.
    /// Every other section runs from the line after its header to the nearest
    /// following header of any kind, so sections may appear in any order and
    /// a missing one never swallows its neighbour.
    pub fn split<'t>(&self, text: &'t str) -> ReportSections<'t> {
        let boundaries: Vec<&Header> = [&self.risk, &self.p0, &self.no_code]
            .into_iter()
            .chain(self.other.iter())
            .collect();

        let other_start = self
            .other
            .iter()
            .filter_map(|h| h.find_from(text, 0))
            .min_by_key(|r| r.start);

        let section = |header: Option<Range<usize>>| header.and_then(|h| body(text, h, &boundaries));

        ReportSections {
            summary: self
                .risk
                .find_from(text, 0)
                .and_then(|h| body(text, h, &[&self.p0])),
            p0: section(self.p0.find_from(text, 0)),
            other: section(other_start),
            zero_risk: section(self.no_code.find_from(text, 0)),
        }
    }
}

/// Text between the end of the header's line and the first `until` match after it.
fn body<'t>(text: &'t str, header: Range<usize>, until: &[&Header]) -> Option<&'t str> {
    let start = header.end + text[header.end..].find('\n')? + 1;
    let end = until
        .iter()
        .filter_map(|h| h.find_from(text, start))
        .map(|r| r.start)
        .min()
        .unwrap_or(text.len());
    Some(&text[start..end])
}

// ── Tests ──
