//! Read-only HTTP surface: liveness and queue statistics.
mod handlers;

use std::{io, net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use reloadq_core::ReloadQueue;
use reloadq_prometheus::PrometheusMetrics;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::ApiError;

pub const DEFAULT_METRICS_ADDR: &str = "127.0.0.1:9111";

#[derive(Clone)]
pub(crate) struct HttpState {
    pub(crate) queue: Arc<ReloadQueue>,
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

/// Router builder for the metrics endpoints.
///
/// - `GET /health`: `{"status":"ok"}` while the process is up.
/// - `GET /metrics`: queue statistics as JSON.
/// - `GET /metrics/prometheus`: text exposition, 404 unless a backend is attached.
pub struct HttpApi {
    state: HttpState,
}

impl HttpApi {
    pub fn new(queue: Arc<ReloadQueue>) -> Self {
        Self {
            state: HttpState {
                queue,
                prometheus: None,
            },
        }
    }

    pub fn with_prometheus(mut self, metrics: PrometheusMetrics) -> Self {
        self.state.prometheus = Some(metrics);
        self
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/metrics", get(handlers::stats))
            .route("/metrics/prometheus", get(handlers::prometheus))
            .with_state(self.state)
    }
}

/// HTTP listener serving an [`HttpApi`].
pub struct MetricsServer {
    listener: TcpListener,
    router: Router,
}

impl MetricsServer {
    pub async fn bind(addr: &str, api: HttpApi) -> Result<Self, ApiError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiError::HttpBind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self {
            listener,
            router: api.router(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` fires; in-flight requests are allowed to finish.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), ApiError> {
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, "metrics listening");
        }

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(ApiError::HttpServe)?;

        debug!("metrics server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reloadq_core::{ActionError, ReloadAction};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpStream,
    };

    struct Noop;

    #[async_trait]
    impl ReloadAction for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }

        async fn reload(&self, _cancel: CancellationToken) -> Result<(), ActionError> {
            Ok(())
        }
    }

    async fn get(addr: SocketAddr, path: &str) -> (u16, String) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        let status = raw
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap();
        let body = raw.split("\r\n\r\n").nth(1).unwrap_or_default().to_string();
        (status, body)
    }

    async fn spawn(api: HttpApi) -> (SocketAddr, CancellationToken, tokio::task::JoinHandle<()>) {
        let server = MetricsServer::bind("127.0.0.1:0", api).await.unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let handle = tokio::spawn(async move {
            server.serve(token).await.unwrap();
        });
        (addr, shutdown, handle)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let queue = Arc::new(ReloadQueue::new(Arc::new(Noop)));
        let (addr, shutdown, handle) = spawn(HttpApi::new(queue)).await;

        let (status, body) = get(addr, "/health").await;
        assert_eq!(status, 200);
        assert_eq!(body, r#"{"status":"ok"}"#);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn metrics_reports_queue_stats() {
        let queue = Arc::new(ReloadQueue::new(Arc::new(Noop)));
        queue.enqueue();
        queue.enqueue();
        let (addr, shutdown, handle) = spawn(HttpApi::new(queue)).await;

        let (status, body) = get(addr, "/metrics").await;
        assert_eq!(status, 200);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["reloads"], 0);
        assert_eq!(json["failures"], 0);
        assert_eq!(json["deduplicated"], 1);
        assert_eq!(json["pending"], true);
        assert!(json.get("last_reload").is_none());

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn prometheus_requires_backend() {
        let queue = Arc::new(ReloadQueue::new(Arc::new(Noop)));
        let (addr, shutdown, handle) = spawn(HttpApi::new(queue)).await;

        let (status, _) = get(addr, "/metrics/prometheus").await;
        assert_eq!(status, 404);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn prometheus_renders_exposition() {
        let metrics = PrometheusMetrics::new().unwrap();
        let queue = Arc::new(
            ReloadQueue::new(Arc::new(Noop)).with_metrics(Arc::new(metrics.clone())),
        );
        queue.enqueue();
        queue.enqueue();
        let api = HttpApi::new(queue).with_prometheus(metrics);
        let (addr, shutdown, handle) = spawn(api).await;

        let (status, body) = get(addr, "/metrics/prometheus").await;
        assert_eq!(status, 200);
        assert!(body.contains("reloadq_requests_coalesced_total 1"), "{body}");

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let queue = Arc::new(ReloadQueue::new(Arc::new(Noop)));
        let (addr, shutdown, handle) = spawn(HttpApi::new(queue)).await;

        let (status, _) = get(addr, "/reload").await;
        assert_eq!(status, 404);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let queue = Arc::new(ReloadQueue::new(Arc::new(Noop)));
        let err = MetricsServer::bind("not-an-address", HttpApi::new(queue))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::HttpBind { .. }));
    }
}
