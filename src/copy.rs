//! Copying the included files of a scan to another directory.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ScanError};
use crate::scanner::Scan;

/// Copy everything from `source` into `sink`, returning the byte count.
pub fn copy_stream<R: Read, W: Write>(source: R, sink: W) -> io::Result<u64> {
    let mut reader = BufReader::new(source);
    let mut writer = BufWriter::new(sink);
    let copied = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(copied)
}

/// Copy every included file of `scan` below `dest`, keeping relative paths.
///
/// Included directories are recreated even when empty. Returns the number of
/// bytes copied.
pub fn copy_included_files(scan: &Scan, dest: &Path) -> Result<u64> {
    for dir in scan.included_directories() {
        let target = dest.join(relative_on_disk(scan, dir));
        fs::create_dir_all(&target).map_err(|e| ScanError::io(&target, e))?;
    }

    let mut total = 0;
    for file in scan.included_files() {
        let source = scan.disk_path(file);
        let target = dest.join(relative_on_disk(scan, file));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| ScanError::io(parent, e))?;
        }
        let reader = File::open(&source).map_err(|e| ScanError::io(&source, e))?;
        let writer = File::create(&target).map_err(|e| ScanError::io(&target, e))?;
        total += copy_stream(reader, writer).map_err(|e| ScanError::io(&target, e))?;
    }

    debug!(
        files = scan.included_files().len(),
        bytes = total,
        dest = %dest.display(),
        "copied included files"
    );
    Ok(total)
}

/// Relative path of a reported entry, keeping its original name on disk.
fn relative_on_disk(scan: &Scan, name: &str) -> PathBuf {
    let path = scan.disk_path(name);
    match path.strip_prefix(scan.basedir()) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DirectoryScanner;
    use crate::test_utils::TestTree;

    #[test]
    fn test_copy_stream_counts_bytes() {
        let mut out = Vec::new();
        let copied = copy_stream(&b"hello world"[..], &mut out).unwrap();
        assert_eq!(copied, 11);
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn test_copy_stream_empty() {
        let mut out = Vec::new();
        assert_eq!(copy_stream(io::empty(), &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_copy_included_files() {
        let tree = TestTree::new();
        tree.add_file("src/lib.rs", "pub fn a() {}");
        tree.add_file("src/skip.tmp", "junk");
        tree.add_dir("src/empty");

        let scan = DirectoryScanner::new()
            .with_basedir(tree.path())
            .with_excludes(&["**/*.tmp"])
            .scan()
            .unwrap();

        let dest = TestTree::new();
        let copied = copy_included_files(&scan, dest.path()).unwrap();

        assert_eq!(copied, "pub fn a() {}".len() as u64);
        assert_eq!(
            fs::read_to_string(dest.path().join("src/lib.rs")).unwrap(),
            "pub fn a() {}"
        );
        assert!(!dest.path().join("src/skip.tmp").exists());
        assert!(dest.path().join("src/empty").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_keeps_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tree = TestTree::new();
        let name = OsStr::from_bytes(b"data\xff.bin");
        if fs::write(tree.path().join(name), "payload").is_err() {
            // Filesystem only accepts UTF-8 names
            return;
        }

        let scan = DirectoryScanner::new().with_basedir(tree.path()).scan().unwrap();
        assert_eq!(scan.included_files(), &["data\u{FFFD}.bin".to_string()]);

        let dest = TestTree::new();
        let copied = copy_included_files(&scan, dest.path()).unwrap();
        assert_eq!(copied, "payload".len() as u64);
        assert_eq!(fs::read(dest.path().join(name)).unwrap(), b"payload");
    }
}
