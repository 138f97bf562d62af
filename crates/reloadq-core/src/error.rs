use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("reload worker already started")]
    AlreadyStarted,

    #[error("reload worker is not running")]
    NotStarted,

    #[error("reload worker panicked: {0}")]
    WorkerPanicked(String),
}
