pub mod anchor;
pub mod dashboard;
pub mod report_page;

use std::ops::Range;

use tracing::{debug, warn};

use anchor::{Anchor, Span};

/// Product labels and template placeholders the anchors are built from.
#[derive(Debug, Clone)]
pub struct DocumentLabels {
    pub release_label: String,
    pub template_version: String,
    pub template_dates: Vec<String>,
    pub timezone_label: String,
    pub secondary_counter_labels: Vec<String>,
}

/// One edit: an anchor plus the value for each hole it should rewrite.
/// Holes without a value keep their current text.
#[derive(Debug, Clone)]
pub struct PatchOp {
    anchor: Anchor,
    fill: Vec<(&'static str, String)>,
}

impl PatchOp {
    pub fn new(anchor: Anchor) -> Self {
        PatchOp {
            anchor,
            fill: Vec::new(),
        }
    }

    pub fn fill(mut self, hole: &'static str, value: impl Into<String>) -> Self {
        self.fill.push((hole, value.into()));
        self
    }

    pub fn name(&self) -> &'static str {
        self.anchor.name()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub document: String,
    pub applied: Vec<&'static str>,
    /// Anchors that matched nothing; their fields were left unchanged.
    pub missing: Vec<&'static str>,
}

/// Apply `ops` in order. Each op sees the output of the one before it.
pub fn patch(document: &str, ops: &[PatchOp]) -> Patched {
    let mut doc = document.to_string();
    let mut applied = Vec::new();
    let mut missing = Vec::new();

    for op in ops {
        let spans = op.anchor.spans(&doc);
        if spans.is_empty() {
            warn!(anchor = op.name(), "anchor not found, field left unchanged");
            missing.push(op.name());
            continue;
        }
        doc = splice(&doc, &spans, &op.fill);
        debug!(anchor = op.name(), at = spans[0].whole.start, matches = spans.len(), "patched");
        applied.push(op.name());
    }

    Patched {
        document: doc,
        applied,
        missing,
    }
}

fn splice(doc: &str, spans: &[Span], fill: &[(&'static str, String)]) -> String {
    let mut edits: Vec<(Range<usize>, &str)> = spans
        .iter()
        .flat_map(|span| {
            fill.iter()
                .filter_map(move |(hole, value)| span.hole(hole).map(|r| (r, value.as_str())))
        })
        .collect();
    edits.sort_by_key(|(r, _)| r.start);

    let mut out = String::with_capacity(doc.len());
    let mut cursor = 0;
    for (range, value) in edits {
        // nested holes: the outer edit already covers this one
        if range.start < cursor {
            continue;
        }
        out.push_str(&doc[cursor..range.start]);
        out.push_str(value);
        cursor = range.end;
    }
    out.push_str(&doc[cursor..]);
    out
}
