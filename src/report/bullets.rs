use std::sync::LazyLock;

use regex::Regex;

use super::P0Item;

static TICKET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]+-\d+").unwrap());

const BULLET_MARKERS: &[char] = &['•'];
const TITLE_SEPARATORS: &[char] = &['—', '–'];

/// Text of a bullet line with the marker stripped, or None for non-bullet lines.
pub fn bullet_text(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(BULLET_MARKERS)?;
    Some(rest.trim())
}

/// All non-empty bullets in `span`, in order of appearance.
pub fn collect_bullets(span: &str) -> Vec<String> {
    span.lines()
        .filter_map(bullet_text)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn first_bullet(span: &str) -> Option<String> {
    span.lines()
        .filter_map(bullet_text)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// Build a P0 item from one bullet. The ticket is looked up, never cut out,
/// so it stays in `title` and `full_text`.
pub fn split_item(bullet: &str) -> P0Item {
    let full_text = bullet.trim();
    let ticket = TICKET_RE
        .find(full_text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let (title, description) = match full_text.split_once(TITLE_SEPARATORS) {
        Some((head, tail)) => (head.trim(), tail.trim()),
        None => (full_text, ""),
    };

    P0Item {
        ticket,
        title: title.to_string(),
        description: description.to_string(),
        full_text: full_text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_marker_required() {
        assert_eq!(bullet_text("• Crash on login"), Some("Crash on login"));
        assert_eq!(bullet_text("   •   indented  "), Some("indented"));
        assert_eq!(bullet_text("No marker here"), None);
        assert_eq!(bullet_text("- dash is not a marker"), None);
    }

    #[test]
    fn empty_bullets_dropped() {
        let span = "• one\n•   \nplain line\n• two\n";
        assert_eq!(collect_bullets(span), vec!["one", "two"]);
    }

    #[test]
    fn ticket_stays_in_title() {
        let item = split_item("VOICE-827 — Fixed crash on login");
        assert_eq!(item.ticket, "VOICE-827");
        assert_eq!(item.title, "VOICE-827");
        assert_eq!(item.description, "Fixed crash on login");
        assert_eq!(item.full_text, "VOICE-827 — Fixed crash on login");
    }

    #[test]
    fn no_separator_is_whole_title() {
        let item = split_item("Refactored auth module");
        assert_eq!(item.ticket, "");
        assert_eq!(item.title, "Refactored auth module");
        assert_eq!(item.description, "");
    }

    #[test]
    fn only_first_separator_splits() {
        let item = split_item("Paywall rework (NUX-1844, NUX-1850) — new flow — needs QA");
        assert_eq!(item.ticket, "NUX-1844");
        assert_eq!(item.title, "Paywall rework (NUX-1844, NUX-1850)");
        assert_eq!(item.description, "new flow — needs QA");
    }

    #[test]
    fn en_dash_separates() {
        let item = split_item("Offline mode – sync queue rewritten");
        assert_eq!(item.title, "Offline mode");
        assert_eq!(item.description, "sync queue rewritten");
    }

    #[test]
    fn lowercase_ticket_ignored() {
        assert_eq!(split_item("voice-827 cleanup").ticket, "");
    }
}
