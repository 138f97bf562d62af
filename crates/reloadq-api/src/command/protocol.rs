use std::str::FromStr;

use reloadq_core::{EnqueueOutcome, ReloadQueue};
use tracing::{info, warn};

/// Longest accepted request line, newline included.
pub(crate) const MAX_REQUEST_LEN: u64 = 1024;

/// Request understood by the command socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reload,
}

impl FromStr for Command {
    type Err = ();

    /// Surrounding whitespace is ignored; names are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "RELOAD" => Ok(Command::Reload),
            _ => Err(()),
        }
    }
}

/// The single line written back on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ok,
    EmptyRequest,
    UnknownCommand,
    ShuttingDown,
}

impl Response {
    pub fn as_line(&self) -> &'static str {
        match self {
            Response::Ok => "OK\n",
            Response::EmptyRequest => "ERROR: empty request\n",
            Response::UnknownCommand => "ERROR: unknown command\n",
            Response::ShuttingDown => "ERROR: shutting down\n",
        }
    }
}

/// Turn one raw request into its response, enqueueing a reload when asked to.
///
/// `None` means the peer closed the connection before sending anything.
pub(crate) fn dispatch(raw: Option<&[u8]>, queue: &ReloadQueue) -> Response {
    let Some(raw) = raw else {
        warn!("empty request");
        return Response::EmptyRequest;
    };

    let line = String::from_utf8_lossy(raw);
    match line.parse::<Command>() {
        Ok(Command::Reload) => {
            info!("reload requested");
            match queue.enqueue() {
                EnqueueOutcome::Queued | EnqueueOutcome::Coalesced => Response::Ok,
                EnqueueOutcome::Closed => Response::ShuttingDown,
            }
        }
        Err(()) => {
            warn!(cmd = ?line.trim(), "unknown command");
            Response::UnknownCommand
        }
    }
}
