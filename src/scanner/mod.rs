//! Directory scanning with include/exclude classification
//!
//! `DirectoryScanner` walks a base directory and sorts every file and
//! directory into one of four buckets per kind: included, not included,
//! excluded, or deselected.
//!
//! The walk happens in two passes:
//!
//! - The fast pass (run by `scan`) skips subtrees that provably hold no
//!   included entries. Included buckets are final after this pass.
//! - The slow pass revisits the skipped subtrees so the other buckets are
//!   complete. It runs lazily, the first time one of those buckets is read.

mod config;
mod defaults;
mod directory;
mod select;
mod state;
mod symlink;

pub use config::ScannerConfig;
pub use defaults::DEFAULT_EXCLUDES;
pub use directory::{DirectoryScanner, FilenameComparator, Scan};
pub use select::{FileSelector, MaxSizeSelector};
pub use state::{Buckets, Disposition, EntryKind, Phase, PrunedDir, ScanReport, ScanState};
pub use symlink::SymlinkPolicy;
