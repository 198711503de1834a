//! Selection hook applied after include/exclude matching.

use std::path::Path;

/// Decides whether an entry that passed the include/exclude tests is kept.
///
/// Entries rejected here land in the deselected buckets. `name` is the
/// relative path, `path` the entry on disk.
pub trait FileSelector: Send + Sync {
    fn is_selected(&self, name: &str, path: &Path) -> bool;
}

impl<F> FileSelector for F
where
    F: Fn(&str, &Path) -> bool + Send + Sync,
{
    fn is_selected(&self, name: &str, path: &Path) -> bool {
        self(name, path)
    }
}

/// Keeps files no larger than the given number of bytes. Directories are
/// always kept.
#[derive(Debug, Clone, Copy)]
pub struct MaxSizeSelector(pub u64);

impl FileSelector for MaxSizeSelector {
    fn is_selected(&self, _name: &str, path: &Path) -> bool {
        match path.metadata() {
            Ok(meta) if meta.is_file() => meta.len() <= self.0,
            _ => true,
        }
    }
}
