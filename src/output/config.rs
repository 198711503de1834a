//! Output configuration types

use crate::scanner::Disposition;

/// Configuration for output formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Buckets to list, in order
    pub show: Vec<Disposition>,
    /// List directories as well as files
    pub directories: bool,
    /// Print a one-line summary after each base directory
    pub summary: bool,
}

impl OutputConfig {
    /// Does printing require the exhaustive pass?
    pub fn needs_slow_scan(&self) -> bool {
        self.show.iter().any(|d| *d != Disposition::Included)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            show: vec![Disposition::Included],
            directories: false,
            summary: true,
        }
    }
}
