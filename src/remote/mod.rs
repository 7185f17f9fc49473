//! Remote file access: the `RemoteFs` seam, the live SFTP session behind
//! it, and the tree walk / substring search built on top.

pub mod fs;
pub mod path;
pub mod search;
pub mod session;
pub mod walk;

pub use fs::{EntryInfo, EntryKind, RemoteError, RemoteFs, RemoteReader};
pub use search::{list_platforms, search, SEARCH_LIMIT};
pub use session::RemoteSession;
pub use walk::{WalkEntry, Walker};
