//! romfetch - a controller-friendly SFTP ROM browser and downloader.
//!
//! The core is the remote search/transfer engine and the session state
//! machine driving it; presentation and raw input mapping sit behind the
//! `app::ui::Ui` seam, with a terminal reference implementation in `term`.

pub mod app;
pub mod config;
pub mod notify;
pub mod remote;
pub mod ssh;
pub mod term;
pub mod transfer;
