use std::{
    fs::{self, Permissions},
    io,
    os::unix::fs::PermissionsExt,
    path::Path,
};

use tokio::net::UnixListener;
use tracing::{debug, warn};

use crate::ApiError;

/// Owner read/write only.
const SOCKET_MODE: u32 = 0o600;

/// Bind a fresh socket at `path`, replacing a stale one left by a previous run.
pub(crate) fn bind_socket(path: &Path) -> Result<UnixListener, ApiError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ApiError::SocketDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    remove_stale(path).map_err(|source| ApiError::StaleSocket {
        path: path.to_path_buf(),
        source,
    })?;

    let listener = UnixListener::bind(path).map_err(|source| ApiError::Bind {
        path: path.to_path_buf(),
        source,
    })?;

    if let Err(source) = fs::set_permissions(path, Permissions::from_mode(SOCKET_MODE)) {
        drop(listener);
        cleanup_socket(path);
        return Err(ApiError::Permissions {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(listener)
}

fn remove_stale(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(_) => {
            debug!(path = %path.display(), "removing stale socket");
            fs::remove_file(path)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Remove the socket file; missing file is not an error.
pub(crate) fn cleanup_socket(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "socket file removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove socket file"),
    }
}
