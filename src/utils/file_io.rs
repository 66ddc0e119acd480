use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// Opens `path` for appending, creating the file and its parent directories
/// when missing.
pub fn open_file_for_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().append(true).create(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_file_for_append_creates_missing_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a/b/daemon.log");

        assert!(open_file_for_append(&path).is_ok());
        assert!(path.exists());
    }
}
