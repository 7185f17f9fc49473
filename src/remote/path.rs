//! Path utilities bridging remote SFTP paths (always `/`) and local
//! platform-native paths.

use std::path::{Path, PathBuf};

/// Join remote SFTP path components using `/` separator.
///
/// Remote paths always use `/` regardless of the local or remote OS.
pub fn join_remote_path(base: &str, component: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, component)
    } else {
        format!("{}/{}", base, component)
    }
}

/// Final component of a remote path, for display titles.
pub fn remote_file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Strip a base directory prefix from a remote path, producing the
/// display label. Falls back to the full path if the prefix is absent.
pub fn strip_base(base: &str, path: &str) -> String {
    let prefix = format!("{}/", base.trim_end_matches('/'));
    path.strip_prefix(&prefix).unwrap_or(path).to_string()
}

/// Local destination for one downloaded file:
/// `<dest_root>/<platform>/<label path>`, the label's `/` segments
/// becoming native components.
pub fn local_dest(dest_root: &Path, platform: &str, label: &str) -> PathBuf {
    let mut out = dest_root.join(platform);
    for segment in label.split('/').filter(|s| !s.is_empty()) {
        out.push(segment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_remote_path() {
        assert_eq!(join_remote_path("/roms", "ps1"), "/roms/ps1");
        assert_eq!(join_remote_path("/roms/", "ps1"), "/roms/ps1");
        assert_eq!(join_remote_path("/", "roms"), "/roms");
    }

    #[test]
    fn test_strip_base() {
        assert_eq!(strip_base("/roms/ps1", "/roms/ps1/disc1/a.bin"), "disc1/a.bin");
        assert_eq!(strip_base("/roms/ps1/", "/roms/ps1/a.bin"), "a.bin");
        assert_eq!(strip_base("/roms/ps1", "/other/b.bin"), "/other/b.bin");
    }

    #[test]
    fn test_local_dest_expands_label_segments() {
        let dest = local_dest(Path::new("/tmp/dl"), "ps1", "disc1/a.bin");
        assert_eq!(dest, Path::new("/tmp/dl").join("ps1").join("disc1").join("a.bin"));
    }

    #[test]
    fn test_remote_file_name() {
        assert_eq!(remote_file_name("/roms/ps1/a.bin"), "a.bin");
        assert_eq!(remote_file_name("a.bin"), "a.bin");
    }
}
