//! Fileset - Ant-style include/exclude directory scanning

pub mod copy;
pub mod error;
pub mod output;
pub mod pattern;
pub mod scanner;
pub mod tokenizer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use copy::{copy_included_files, copy_stream};
pub use error::{ErrorKind, ScanError};
pub use output::{print_json, OutputConfig, TextFormatter};
pub use pattern::{MatchPattern, MatchPatterns};
pub use scanner::{
    DirectoryScanner, Disposition, FileSelector, Scan, ScanReport, ScannerConfig, SymlinkPolicy,
};
pub use tokenizer::{tokenize_path, TokenizedPath};
