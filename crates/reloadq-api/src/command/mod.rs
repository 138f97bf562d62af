//! Unix socket command server.
//!
//! One request per connection: the client writes a single line, the server writes a
//! single line back and closes. `RELOAD` is the only command.
mod protocol;
pub use protocol::{Command, Response};

mod socket;

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use reloadq_core::ReloadQueue;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    net::UnixListener,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ApiError;
use protocol::{MAX_REQUEST_LEN, dispatch};

pub const DEFAULT_SOCKET_PATH: &str = "/var/run/nginx-reload.sock";
pub const DEFAULT_CONN_TIMEOUT: Duration = Duration::from_secs(5);

/// Command socket settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandServerConfig {
    pub path: PathBuf,
    /// Deadline for a whole exchange: read, enqueue, respond.
    pub conn_timeout: Duration,
}

impl Default for CommandServerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SOCKET_PATH),
            conn_timeout: DEFAULT_CONN_TIMEOUT,
        }
    }
}

impl CommandServerConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_conn_timeout(mut self, timeout: Duration) -> Self {
        self.conn_timeout = timeout;
        self
    }
}

/// Bound command socket feeding a [`ReloadQueue`].
///
/// The socket file is removed when the server is dropped or [`close`](Self::close)d.
pub struct CommandServer {
    listener: UnixListener,
    path: PathBuf,
    conn_timeout: Duration,
    queue: Arc<ReloadQueue>,
}

impl CommandServer {
    /// Bind the socket with owner-only permissions.
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen(cfg: CommandServerConfig, queue: Arc<ReloadQueue>) -> Result<Self, ApiError> {
        let listener = socket::bind_socket(&cfg.path)?;
        info!(path = %cfg.path.display(), "command socket listening");

        Ok(Self {
            listener,
            path: cfg.path,
            conn_timeout: cfg.conn_timeout,
            queue,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept connections until `shutdown` fires.
    ///
    /// Each connection is handled on its own task. An accept failure ends the loop
    /// with an error. The socket file is removed on return either way.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), ApiError> {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!("command server stopping");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, _) = accepted.map_err(ApiError::Accept)?;
                    let queue = Arc::clone(&self.queue);
                    let timeout = self.conn_timeout;
                    tokio::spawn(async move {
                        handle_connection(stream, &queue, timeout).await;
                    });
                }
            }
        }
    }

    /// Remove the socket file. Safe to call more than once.
    pub fn close(&self) {
        socket::cleanup_socket(&self.path);
    }
}

impl Drop for CommandServer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Serve one exchange on `stream` within `timeout`.
///
/// On timeout the connection is dropped without a response.
pub(crate) async fn handle_connection<S>(stream: S, queue: &ReloadQueue, timeout: Duration)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match tokio::time::timeout(timeout, exchange(stream, queue)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(error = %e, "connection error"),
        Err(_) => warn!(timeout_ms = timeout.as_millis() as u64, "connection timed out"),
    }
}

async fn exchange<S>(mut stream: S, queue: &ReloadQueue) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    let read = BufReader::new(&mut stream)
        .take(MAX_REQUEST_LEN)
        .read_until(b'\n', &mut line)
        .await?;

    let response = dispatch((read > 0).then_some(line.as_slice()), queue);

    stream.write_all(response.as_line().as_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reloadq_core::{ActionError, ReloadAction};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::duplex;

    struct Counting(AtomicUsize);

    #[async_trait]
    impl ReloadAction for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn reload(&self, _cancel: CancellationToken) -> Result<(), ActionError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn queue() -> ReloadQueue {
        ReloadQueue::new(Arc::new(Counting(AtomicUsize::new(0))))
    }

    async fn roundtrip(queue: &ReloadQueue, request: &[u8]) -> String {
        let (mut client, server) = duplex(64 * 1024);
        client.write_all(request).await.unwrap();
        client.shutdown().await.unwrap();

        handle_connection(server, queue, Duration::from_secs(1)).await;

        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn reload_is_acknowledged() {
        let q = queue();
        assert_eq!(roundtrip(&q, b"RELOAD\n").await, "OK\n");
        assert!(q.pending());
    }

    #[tokio::test]
    async fn missing_newline_still_parses() {
        let q = queue();
        assert_eq!(roundtrip(&q, b"  RELOAD  ").await, "OK\n");
    }

    #[tokio::test]
    async fn repeated_reloads_coalesce() {
        let q = queue();
        for _ in 0..3 {
            assert_eq!(roundtrip(&q, b"RELOAD\n").await, "OK\n");
        }
        assert_eq!(q.stats().deduplicated, 2);
    }

    #[tokio::test]
    async fn empty_connection_is_rejected() {
        let q = queue();
        assert_eq!(roundtrip(&q, b"").await, "ERROR: empty request\n");
        assert!(!q.pending());
    }

    #[tokio::test]
    async fn unknown_command_is_rejected() {
        let q = queue();
        assert_eq!(roundtrip(&q, b"STATUS\n").await, "ERROR: unknown command\n");
        assert_eq!(roundtrip(&q, b"\n").await, "ERROR: unknown command\n");
        assert_eq!(q.stats().accounted(), 0);
    }

    #[tokio::test]
    async fn oversized_line_is_cut_at_limit() {
        let q = queue();
        let mut request = vec![b'X'; 4 * MAX_REQUEST_LEN as usize];
        request.push(b'\n');
        assert_eq!(roundtrip(&q, &request).await, "ERROR: unknown command\n");
    }

    #[tokio::test]
    async fn closed_queue_reports_shutdown() {
        let q = queue();
        q.start(CancellationToken::new()).unwrap();
        q.close().await.unwrap();

        assert_eq!(roundtrip(&q, b"RELOAD\n").await, "ERROR: shutting down\n");
    }

    #[tokio::test]
    async fn silent_client_times_out_without_response() {
        let q = queue();
        let (mut client, server) = duplex(64);

        handle_connection(server, &q, Duration::from_millis(50)).await;

        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        assert!(out.is_empty());
        assert!(!q.pending());
    }
}
