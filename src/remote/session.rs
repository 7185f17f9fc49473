//! Live SFTP session over the SSH connection.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use russh::client;
use russh::Disconnect;
use russh_sftp::client::error::Error as SftpErrorInner;
use russh_sftp::client::SftpSession;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::ssh::{self, ClientHandler, ConnectError};

use super::fs::{EntryInfo, EntryKind, RemoteError, RemoteFs, RemoteReader};
use super::path::{join_remote_path, remote_file_name};

/// Read-ahead buffer over the SFTP file stream. russh-sftp has no prefetch
/// hint, so a buffered reader stands in to keep requests larger than the
/// consumer's block size.
const READ_AHEAD_BYTES: usize = 2 * 1024 * 1024;

/// One authenticated SSH+SFTP session, exclusively owned by the run.
pub struct RemoteSession {
    handle: client::Handle<ClientHandler>,
    sftp: SftpSession,
    closed: AtomicBool,
}

impl RemoteSession {
    /// Connect, authenticate, and open the SFTP subsystem.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, ConnectError> {
        let handle = ssh::connect(config).await?;

        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| ConnectError::SubsystemNotAvailable(e.to_string()))?;
        channel.request_subsystem(true, "sftp").await.map_err(|e| {
            ConnectError::SubsystemNotAvailable(format!("Failed to request SFTP subsystem: {}", e))
        })?;

        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| ConnectError::SubsystemNotAvailable(e.to_string()))?;

        info!("SFTP subsystem opened");

        Ok(Self {
            handle,
            sftp,
            closed: AtomicBool::new(false),
        })
    }

    /// Release the session. Idempotent; close failures are swallowed.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.sftp.close().await {
            debug!("SFTP close failed (ignored): {}", e);
        }
        if let Err(e) = self
            .handle
            .disconnect(Disconnect::ByApplication, "closing", "en")
            .await
        {
            debug!("SSH disconnect failed (ignored): {}", e);
        }
    }

    fn map_sftp_error(err: SftpErrorInner, path: &str) -> RemoteError {
        let err_str = err.to_string();
        if err_str.contains("No such file") || err_str.contains("not found") {
            RemoteError::NotFound(path.to_string())
        } else if err_str.contains("Permission denied") {
            RemoteError::PermissionDenied(path.to_string())
        } else {
            RemoteError::Protocol(err_str)
        }
    }

    fn kind_of(metadata: &russh_sftp::protocol::FileAttributes) -> EntryKind {
        if metadata.is_symlink() {
            EntryKind::Symlink
        } else if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_regular() {
            EntryKind::File
        } else {
            EntryKind::Unknown
        }
    }
}

#[async_trait]
impl RemoteFs for RemoteSession {
    async fn read_dir(&self, path: &str) -> Result<Vec<EntryInfo>, RemoteError> {
        debug!("Listing directory: {}", path);
        let read_dir = self
            .sftp
            .read_dir(path)
            .await
            .map_err(|e| Self::map_sftp_error(e, path))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let name = entry.file_name();
            if name == "." || name == ".." {
                continue;
            }
            let metadata = entry.metadata();
            entries.push(EntryInfo {
                path: join_remote_path(path, &name),
                kind: Self::kind_of(&metadata),
                size: metadata.size.unwrap_or(0),
                name,
            });
        }
        Ok(entries)
    }

    async fn stat(&self, path: &str) -> Result<EntryInfo, RemoteError> {
        let metadata = self
            .sftp
            .metadata(path)
            .await
            .map_err(|e| Self::map_sftp_error(e, path))?;

        Ok(EntryInfo {
            name: remote_file_name(path).to_string(),
            path: path.to_string(),
            kind: Self::kind_of(&metadata),
            size: metadata.size.unwrap_or(0),
        })
    }

    async fn open_read(&self, path: &str) -> Result<RemoteReader, RemoteError> {
        let file = self
            .sftp
            .open(path)
            .await
            .map_err(|e| Self::map_sftp_error(e, path))?;
        Ok(Box::new(tokio::io::BufReader::with_capacity(
            READ_AHEAD_BYTES,
            file,
        )))
    }
}
