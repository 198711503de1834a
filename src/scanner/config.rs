//! Configuration types for the directory scanner

use std::path::PathBuf;

/// Configuration for a scan.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub basedir: Option<PathBuf>,
    /// Include patterns. `None` includes everything (`**`); an empty list
    /// includes nothing.
    pub includes: Option<Vec<String>>,
    pub excludes: Vec<String>,
    /// The built-in VCS/metadata excludes are part of `excludes`. Setting
    /// this on a config passed to `DirectoryScanner::from_config` appends them.
    pub default_excludes: bool,
    pub follow_symlinks: bool,
    pub case_sensitive: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            basedir: None,
            includes: None,
            excludes: Vec::new(),
            default_excludes: false,
            follow_symlinks: false,
            case_sensitive: true,
        }
    }
}

impl ScannerConfig {
    pub fn new(basedir: impl Into<PathBuf>) -> Self {
        Self {
            basedir: Some(basedir.into()),
            ..Default::default()
        }
    }
}
