use std::ops::Range;

use regex::{Captures, Regex};

use crate::error::{DashboardError, Result};

/// How many matches one anchor edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// Only the first match. The default for every document field.
    First,
    /// Every match. Reserved for template placeholder tokens.
    Every,
}

/// A literal structural pattern whose named capture groups are the holes to
/// be rewritten. Everything outside the holes is left byte-for-byte intact.
#[derive(Debug, Clone)]
pub struct Anchor {
    name: &'static str,
    pattern: Regex,
    occurrence: Occurrence,
}

/// One located region and the byte ranges of the holes that took part in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub whole: Range<usize>,
    pub holes: Vec<(String, Range<usize>)>,
}

impl Span {
    pub fn hole(&self, name: &str) -> Option<Range<usize>> {
        self.holes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r.clone())
    }
}

impl Anchor {
    pub fn new(name: &'static str, pattern: &str) -> Result<Self> {
        let pattern =
            Regex::new(pattern).map_err(|source| DashboardError::InvalidAnchor { name, source })?;
        Ok(Anchor {
            name,
            pattern,
            occurrence: Occurrence::First,
        })
    }

    /// A placeholder token: the literal itself is the single `token` hole and
    /// every occurrence is replaced.
    pub fn token(name: &'static str, literal: &str) -> Result<Self> {
        let mut anchor = Self::new(name, &format!("(?P<token>{})", regex::escape(literal)))?;
        anchor.occurrence = Occurrence::Every;
        Ok(anchor)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// First match only.
    pub fn locate(&self, document: &str) -> Option<Span> {
        self.pattern
            .captures(document)
            .map(|caps| self.to_span(&caps))
    }

    /// Regions this anchor edits in `document`, honouring its occurrence rule.
    pub fn spans(&self, document: &str) -> Vec<Span> {
        match self.occurrence {
            Occurrence::First => self.locate(document).into_iter().collect(),
            Occurrence::Every => self
                .pattern
                .captures_iter(document)
                .map(|caps| self.to_span(&caps))
                .collect(),
        }
    }

    fn to_span(&self, caps: &Captures) -> Span {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or_default();
        let holes = self
            .pattern
            .capture_names()
            .flatten()
            .filter_map(|n| caps.name(n).map(|m| (n.to_string(), m.range())))
            .collect();
        Span { whole, holes }
    }
}
