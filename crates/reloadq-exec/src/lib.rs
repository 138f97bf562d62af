//! Subprocess-backed reload action.
//!
//! [`CommandReloader`] runs a validate command and, only if it succeeds, an apply command,
//! both under one shared deadline. Defaults target nginx (`nginx -t`, `nginx -s reload`).
mod error;
pub use error::ExecError;

mod command;
pub use command::StepCommand;

mod reloader;
pub use reloader::{CommandReloader, DEFAULT_RELOAD_TIMEOUT, ReloaderConfig};
