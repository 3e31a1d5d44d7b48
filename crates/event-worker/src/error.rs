//! Error types for the Event Worker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    /// The queue store could not be reached at startup
    #[error("Connection error: {0}")]
    Connection(String),

    /// A queue command failed after startup
    #[error("Queue error: {0}")]
    Queue(String),

    /// Appending to the output log failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
