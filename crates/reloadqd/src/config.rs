use std::{path::PathBuf, time::Duration};

use clap::Parser;
use reloadq_api::{
    CommandServerConfig, command::DEFAULT_SOCKET_PATH, http::DEFAULT_METRICS_ADDR,
};
use reloadq_exec::ReloaderConfig;
use reloadq_observe::{LogConfig, LogFilter, LogFormat};

/// Coalescing nginx reload daemon.
#[derive(Debug, Parser)]
#[command(name = "reloadqd", version)]
pub struct Args {
    /// Unix socket accepting reload commands
    #[arg(long, env = "RELOAD_SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    pub socket: PathBuf,

    /// Listen address of the health/metrics HTTP server
    #[arg(long, env = "RELOAD_METRICS_ADDR", default_value = DEFAULT_METRICS_ADDR)]
    pub metrics: String,

    /// nginx binary used for `-t` and `-s reload`
    #[arg(long, env = "RELOAD_NGINX_BIN", default_value = "nginx")]
    pub nginx: String,

    /// Budget shared by config test and reload, in milliseconds
    #[arg(
        long,
        env = "RELOAD_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub reload_timeout_ms: u64,

    /// Per-connection deadline on the command socket, in milliseconds
    #[arg(
        long,
        env = "RELOAD_CONN_TIMEOUT_MS",
        default_value_t = 5_000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub conn_timeout_ms: u64,

    /// Log filter (e.g. `info`, `debug,reloadq_api=trace`)
    #[arg(long, env = "RELOAD_LOG_LEVEL", default_value = "info")]
    pub log_level: LogFilter,

    /// Log output: text, json or journald
    #[arg(long, env = "RELOAD_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

impl Args {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format,
            filter: self.log_level.clone(),
            ..Default::default()
        }
    }

    pub fn reloader_config(&self) -> ReloaderConfig {
        ReloaderConfig::nginx(&self.nginx)
            .with_timeout(Duration::from_millis(self.reload_timeout_ms))
    }

    pub fn command_config(&self) -> CommandServerConfig {
        CommandServerConfig::new(&self.socket)
            .with_conn_timeout(Duration::from_millis(self.conn_timeout_ms))
    }
}
