use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("removing stale socket {}: {source}", .path.display())]
    StaleSocket { path: PathBuf, source: io::Error },

    #[error("creating socket directory {}: {source}", .path.display())]
    SocketDir { path: PathBuf, source: io::Error },

    #[error("listening on {}: {source}", .path.display())]
    Bind { path: PathBuf, source: io::Error },

    #[error("setting socket permissions on {}: {source}", .path.display())]
    Permissions { path: PathBuf, source: io::Error },

    #[error("accept: {0}")]
    Accept(#[source] io::Error),

    #[error("metrics listener on {addr}: {source}")]
    HttpBind { addr: String, source: io::Error },

    #[error("metrics server: {0}")]
    HttpServe(#[source] io::Error),
}
