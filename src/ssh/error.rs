//! SSH connection error types

use thiserror::Error;

/// Failure to establish the remote session. Fatal: the caller reports it
/// once and terminates, there is no retry path.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("SFTP subsystem not available: {0}")]
    SubsystemNotAvailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SSH protocol error: {0}")]
    ProtocolError(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl From<russh::Error> for ConnectError {
    fn from(err: russh::Error) -> Self {
        ConnectError::ProtocolError(err.to_string())
    }
}
