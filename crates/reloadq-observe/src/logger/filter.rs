use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::LoggerError;

/// Validated `EnvFilter` expression, e.g. `"info"` or `"reloadq_core=debug,info"`.
///
/// The raw string is kept so the value can travel through config files and CLI flags;
/// it is checked once on construction and turned into a live filter on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogFilter(String);

impl LogFilter {
    pub fn new(s: impl Into<String>) -> Result<Self, LoggerError> {
        let s = s.into();
        match EnvFilter::try_new(&s) {
            Ok(_) => Ok(Self(s)),
            Err(e) => Err(LoggerError::InvalidFilter(format!("{s}: {e}"))),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the live filter.
    pub fn to_env_filter(&self) -> EnvFilter {
        // Validated in `new`; fall back to `info` rather than panic.
        EnvFilter::try_new(&self.0).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl Default for LogFilter {
    fn default() -> Self {
        Self("info".to_owned())
    }
}

impl FromStr for LogFilter {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LogFilter {
    type Error = LoggerError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<LogFilter> for String {
    fn from(f: LogFilter) -> Self {
        f.0
    }
}
