//! Error types for Chatlay.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatlayError {
    #[error("Invalid channel name: '{0}'")]
    InvalidChannel(String),

    #[error("{0}")]
    TransportConnect(String),

    #[error("{0}")]
    TransportRead(String),

    #[error("connection closed by server")]
    EndOfStream,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
