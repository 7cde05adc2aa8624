use std::fmt::Display;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// A document the run cannot start without.
    #[error("required file not found: {}", path.display())]
    MissingResource { path: PathBuf },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// GitHub, the report-generation service, or git failed.
    #[error("{service} failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("anchor `{name}` has an invalid pattern: {source}")]
    InvalidAnchor {
        name: &'static str,
        source: regex::Error,
    },

    #[error("section header `{phrase}` is not usable: {source}")]
    InvalidHeader {
        phrase: String,
        source: regex::Error,
    },

    #[error("invalid compare URL: {0}")]
    InvalidCompareUrl(String),

    #[error("need at least 2 release branches to compare, found {0}")]
    NotEnoughReleases(usize),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DashboardError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn upstream(service: &'static str, err: impl Display) -> Self {
        DashboardError::Upstream {
            service,
            message: err.to_string(),
        }
    }
}
