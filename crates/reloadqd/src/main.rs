mod config;
mod signals;

use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::info;

use reloadq_api::{ApiError, CommandServer, HttpApi, MetricsServer};
use reloadq_core::ReloadQueue;
use reloadq_exec::CommandReloader;
use reloadq_observe::init_logger;
use reloadq_prometheus::PrometheusMetrics;

use config::Args;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    // 1) logger
    init_logger(&args.log_config())?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting reloadqd");

    // 2) metrics + action
    let metrics = PrometheusMetrics::new().context("registering metrics")?;
    let reloader =
        CommandReloader::new(args.reloader_config()).context("invalid reloader configuration")?;
    info!(reloader = %reloader.config(), "reloader configured");

    // 3) queue
    let shutdown = CancellationToken::new();
    let queue = Arc::new(
        ReloadQueue::new(Arc::new(reloader)).with_metrics(Arc::new(metrics.clone())),
    );
    queue.start(shutdown.child_token())?;

    // 4) surfaces; both bind before anything is served
    let command = CommandServer::listen(args.command_config(), queue.clone())?;
    let http = MetricsServer::bind(
        &args.metrics,
        HttpApi::new(queue.clone()).with_prometheus(metrics),
    )
    .await?;

    let command_stop = CancellationToken::new();
    let http_stop = CancellationToken::new();
    let mut command_task = tokio::spawn(command.serve(command_stop.clone()));
    let mut http_task = tokio::spawn(http.serve(http_stop.clone()));

    info!(
        socket = %args.socket.display(),
        metrics = %args.metrics,
        "ready"
    );

    // 5) run until a signal or a fatal server error
    let mut command_done = None;
    let mut http_done = None;
    let signal = tokio::select! {
        res = signals::wait_for_shutdown_signal() => res.context("installing signal handlers"),
        res = &mut command_task => {
            command_done = Some(joined("command server", res));
            Ok(())
        }
        res = &mut http_task => {
            http_done = Some(joined("metrics server", res));
            Ok(())
        }
    };

    // 6) ordered shutdown: listener, in-flight reload, queue drain, metrics
    command_stop.cancel();
    let command_result = match command_done {
        Some(res) => res,
        None => joined("command server", command_task.await),
    };

    shutdown.cancel();
    let queue_result = queue.close().await.context("closing reload queue");

    http_stop.cancel();
    let http_result = match http_done {
        Some(res) => res,
        None => joined("metrics server", http_task.await),
    };

    info!(stats = ?queue.stats(), "shutdown complete");
    signal
        .and(command_result)
        .and(queue_result)
        .and(http_result)
}

fn joined(what: &'static str, res: Result<Result<(), ApiError>, JoinError>) -> anyhow::Result<()> {
    res.with_context(|| format!("{what} task failed"))?
        .context(what)
}
