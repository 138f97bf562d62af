use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid reloader configuration: {0}")]
    InvalidConfig(String),
}
