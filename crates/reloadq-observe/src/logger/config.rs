use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{filter::LogFilter, format::LogFormat};

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter expression.
    pub filter: LogFilter,
    /// Include module targets in log lines.
    pub with_targets: bool,
    /// Allow ANSI colors (text format only).
    pub use_color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: LogFilter::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LogConfig {
    /// Colors are used only when enabled and stdout is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = LogConfig::default();
        assert_eq!(cfg.format, LogFormat::Text);
        assert_eq!(cfg.filter.as_str(), "info");
        assert!(cfg.with_targets);
        assert!(cfg.use_color);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: LogConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.filter.as_str(), "info");
        assert!(cfg.use_color);
    }

    #[test]
    fn color_disabled_explicitly() {
        let cfg = LogConfig {
            use_color: false,
            ..Default::default()
        };
        assert!(!cfg.should_use_color());
    }
}
