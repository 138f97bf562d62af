//! External surfaces of the reload daemon.
//! - [`command`]: line protocol on a Unix domain socket that feeds the reload queue.
//! - [`http`]: read-only health and metrics endpoints.
mod error;
pub use error::ApiError;

pub mod command;
pub use command::{CommandServer, CommandServerConfig};

pub mod http;
pub use http::{HttpApi, MetricsServer};
