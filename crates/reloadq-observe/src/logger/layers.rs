use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logger::{
    config::LogConfig,
    error::{LoggerError, LoggerResult},
    timer::UtcRfc3339,
};

pub(crate) fn install_text(cfg: &LogConfig) -> LoggerResult<()> {
    let fmt_layer = fmt::layer()
        .with_ansi(cfg.should_use_color())
        .with_target(cfg.with_targets)
        .with_timer(UtcRfc3339);

    install(
        tracing_subscriber::registry()
            .with(cfg.filter.to_env_filter())
            .with(fmt_layer),
    )
}

pub(crate) fn install_json(cfg: &LogConfig) -> LoggerResult<()> {
    let fmt_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_timer(UtcRfc3339);

    install(
        tracing_subscriber::registry()
            .with(cfg.filter.to_env_filter())
            .with(fmt_layer),
    )
}

#[cfg(target_os = "linux")]
pub(crate) fn install_journald(cfg: &LogConfig) -> LoggerResult<()> {
    let journald =
        tracing_journald::layer().map_err(|e| LoggerError::JournaldInitFailed(e.to_string()))?;

    install(
        tracing_subscriber::registry()
            .with(cfg.filter.to_env_filter())
            .with(journald),
    )
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn install_journald(_cfg: &LogConfig) -> LoggerResult<()> {
    Err(LoggerError::JournaldNotSupported)
}

fn install<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::format::LogFormat;

    // One test only: the global subscriber can be installed once per process.
    #[test]
    fn second_install_is_rejected() {
        let cfg = LogConfig {
            format: LogFormat::Text,
            use_color: false,
            ..Default::default()
        };

        install_text(&cfg).expect("first install succeeds");
        assert!(matches!(
            install_json(&cfg),
            Err(LoggerError::AlreadyInitialized)
        ));
    }

    #[test]
    #[cfg(not(target_os = "linux"))]
    fn journald_is_rejected_off_linux() {
        let result = install_journald(&LogConfig::default());
        assert!(matches!(result, Err(LoggerError::JournaldNotSupported)));
    }
}
