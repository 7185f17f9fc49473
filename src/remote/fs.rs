//! Remote filesystem seam.
//!
//! Search and transfer code consume this trait instead of the SFTP session
//! directly, so both run against an in-memory tree in tests.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Streaming reader over a remote file.
pub type RemoteReader = Box<dyn AsyncRead + Send + Unpin>;

/// Non-fatal remote access failure. Listing errors abandon a subtree,
/// transfer errors terminate one task; neither reaches the top level.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SFTP protocol error: {0}")]
    Protocol(String),
}

/// Entry type as reported by the server's attribute bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Unknown,
}

/// One directory entry or stat result.
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    /// File name (not full path)
    pub name: String,
    /// Full remote path
    pub path: String,
    pub kind: EntryKind,
    /// Size in bytes; 0 when the server does not report one.
    pub size: u64,
}

#[async_trait]
pub trait RemoteFs: Send + Sync {
    /// List directory entries, `.`/`..` excluded, in server order.
    async fn read_dir(&self, path: &str) -> Result<Vec<EntryInfo>, RemoteError>;

    /// Attributes of a single path.
    async fn stat(&self, path: &str) -> Result<EntryInfo, RemoteError>;

    /// Open a file for sequential streaming read.
    async fn open_read(&self, path: &str) -> Result<RemoteReader, RemoteError>;
}
