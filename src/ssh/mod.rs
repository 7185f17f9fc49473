//! SSH transport layer built on russh.
//!
//! One authenticated connection per run; the SFTP subsystem is opened on
//! top of it by `remote::session`.

mod client;
mod error;

pub use client::{connect, ClientHandler};
pub use error::ConnectError;
