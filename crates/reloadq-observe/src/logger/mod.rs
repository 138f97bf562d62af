mod config;
mod error;
mod filter;
mod format;
mod layers;
mod timer;

pub use config::LogConfig;
pub use error::{LoggerError, LoggerResult};
pub use filter::LogFilter;
pub use format::LogFormat;
pub use timer::UtcRfc3339;

/// Installs the global tracing subscriber described by `cfg`.
///
/// After this call every `tracing` macro in the process goes through the configured
/// filter and output. Can be called once; later calls fail with
/// [`LoggerError::AlreadyInitialized`].
///
/// # Examples
/// ```rust
/// use reloadq_observe::{LogConfig, init_logger};
///
/// init_logger(&LogConfig::default()).expect("logger");
/// tracing::info!("logger initialized");
/// ```
pub fn init_logger(cfg: &LogConfig) -> LoggerResult<()> {
    match cfg.format {
        LogFormat::Text => layers::install_text(cfg),
        LogFormat::Json => layers::install_json(cfg),
        LogFormat::Journald => layers::install_journald(cfg),
    }
}
