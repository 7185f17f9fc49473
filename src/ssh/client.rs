//! SSH client connection using russh

use std::borrow::Cow;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use russh::client;
use russh::keys::PublicKey;
use russh::{cipher, Preferred};
use tracing::{debug, info};

use crate::config::ConnectionConfig;

use super::error::ConnectError;

/// Cipher preference, fastest modern suites first. Negotiation still
/// settles on whatever the server shares; the ordering is advisory.
static PREFERRED_CIPHERS: &[cipher::Name] = &[
    cipher::CHACHA20_POLY1305,
    cipher::AES_256_GCM,
    cipher::AES_256_CTR,
    cipher::AES_128_CTR,
];

/// Connect and authenticate, returning the live SSH handle.
pub async fn connect(
    config: &ConnectionConfig,
) -> Result<client::Handle<ClientHandler>, ConnectError> {
    let addr = format!("{}:{}", config.host, config.port);
    info!("Connecting to SFTP server at {}", addr);

    let socket_addr = addr
        .to_socket_addrs()
        .map_err(|e| ConnectError::ConnectionFailed(format!("Failed to resolve address: {}", e)))?
        .next()
        .ok_or_else(|| ConnectError::ConnectionFailed("No address found".to_string()))?;

    let ssh_config = client::Config {
        keepalive_interval: Some(Duration::from_secs(30)),
        keepalive_max: 3,
        preferred: Preferred {
            cipher: Cow::Borrowed(PREFERRED_CIPHERS),
            ..Preferred::DEFAULT
        },
        ..Default::default()
    };

    let mut handle = tokio::time::timeout(
        Duration::from_secs(config.timeout_secs),
        client::connect(Arc::new(ssh_config), socket_addr, ClientHandler),
    )
    .await
    .map_err(|_| ConnectError::Timeout("Connection timed out".to_string()))?
    .map_err(|e| ConnectError::ConnectionFailed(e.to_string()))?;

    debug!("SSH handshake completed");

    let authenticated = handle
        .authenticate_password(&config.username, &config.password)
        .await
        .map_err(|e| ConnectError::AuthenticationFailed(e.to_string()))?;

    if !authenticated.success() {
        return Err(ConnectError::AuthenticationFailed(
            "Authentication rejected by server".to_string(),
        ));
    }

    info!("SSH authentication successful");
    Ok(handle)
}

/// Client handler for russh callbacks. Host keys are accepted as-is; the
/// downloader talks to a single preconfigured server.
pub struct ClientHandler;

impl client::Handler for ClientHandler {
    type Error = ConnectError;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        debug!("Accepting server host key");
        Ok(true)
    }
}
