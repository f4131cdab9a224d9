//! Small filesystem helpers shared by the scanner and bundle resolver.

use std::fs::{File, Metadata};
use std::io::{self, Read};
use std::path::Path;

use walkdir::WalkDir;

/// Reads at most `limit` leading bytes of `path`.
pub(crate) fn read_prefix(path: &Path, limit: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    File::open(path)?
        .take(limit as u64)
        .read_to_end(&mut buf)?;
    Ok(buf)
}

/// Permission bits, or 0 where the platform has none.
pub(crate) fn file_mode(metadata: &Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o7777
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
        0
    }
}

/// Total size of the regular files under `dir`, symlinks not followed.
pub(crate) fn dir_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// `path` relative to `root`, with `/` separators (even on Windows).
pub(crate) fn relative_slash_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn read_prefix_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        fs::write(&path, vec![7u8; 10_000]).unwrap();
        assert_eq!(read_prefix(&path, 16).unwrap().len(), 16);
        assert_eq!(read_prefix(&path, 1 << 20).unwrap().len(), 10_000);
    }

    #[test]
    fn dir_size_sums_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/one"), b"123").unwrap();
        fs::write(dir.path().join("a/b/two"), b"4567").unwrap();
        assert_eq!(dir_size(dir.path()), 7);
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/games/test");
        let path = root.join("data").join("game.exe");
        assert_eq!(relative_slash_path(root, &path), "data/game.exe");
    }
}
