use chrono::{NaiveDate, NaiveDateTime};

/// Caller-supplied values for one run. Passed explicitly into rendering so
/// patching never reads the clock itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetadata {
    pub version: String,
    /// Human-readable week label, e.g. "October 19, 2026".
    pub week_of: String,
    /// Report identifier, `YYYY-MM-DD`. Names the report page and the archive.
    pub report_date: String,
    pub generated_at: NaiveDateTime,
}

impl RunMetadata {
    pub fn at(version: impl Into<String>, report_date: Option<NaiveDate>, now: NaiveDateTime) -> Self {
        RunMetadata {
            version: version.into(),
            week_of: now.format("%B %d, %Y").to_string(),
            report_date: report_date
                .unwrap_or(now.date())
                .format("%Y-%m-%d")
                .to_string(),
            generated_at: now,
        }
    }

    /// Whether the version is dotted digits, the only form the release-line
    /// and report-ID anchors match on the next run.
    pub fn has_numeric_version(&self) -> bool {
        !self.version.is_empty() && self.version.chars().all(|c| c.is_ascii_digit() || c == '.')
    }
}

pub fn parse_report_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn date_defaults_to_today() {
        let meta = RunMetadata::at("4.34.0", None, noon());
        assert_eq!(meta.report_date, "2026-10-19");
        assert_eq!(meta.week_of, "October 19, 2026");
    }

    #[test]
    fn explicit_date_wins() {
        let date = parse_report_date("2026-10-16").unwrap();
        let meta = RunMetadata::at("4.34.0", Some(date), noon());
        assert_eq!(meta.report_date, "2026-10-16");
        assert_eq!(meta.week_of, "October 19, 2026");
    }

    #[test]
    fn bad_date_rejected() {
        assert!(parse_report_date("19/10/2026").is_err());
    }

    #[test]
    fn numeric_version_check() {
        assert!(RunMetadata::at("4.34.0", None, noon()).has_numeric_version());
        assert!(!RunMetadata::at("Unknown", None, noon()).has_numeric_version());
        assert!(!RunMetadata::at("4.34.0-rc1", None, noon()).has_numeric_version());
        assert!(!RunMetadata::at("", None, noon()).has_numeric_version());
    }
}
