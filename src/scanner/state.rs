//! Classification results of a scan.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Why an entry ended up where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    Included,
    NotIncluded,
    Excluded,
    Deselected,
}

impl Disposition {
    pub const ALL: [Disposition; 4] = [
        Disposition::Included,
        Disposition::NotIncluded,
        Disposition::Excluded,
        Disposition::Deselected,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Disposition::Included => "included",
            Disposition::NotIncluded => "not included",
            Disposition::Excluded => "excluded",
            Disposition::Deselected => "deselected",
        }
    }
}

/// Entity kind of a scanned entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// The four dispositions for one entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Buckets {
    pub included: Vec<String>,
    pub not_included: Vec<String>,
    pub excluded: Vec<String>,
    pub deselected: Vec<String>,
}

impl Buckets {
    pub fn get(&self, disposition: Disposition) -> &[String] {
        match disposition {
            Disposition::Included => &self.included,
            Disposition::NotIncluded => &self.not_included,
            Disposition::Excluded => &self.excluded,
            Disposition::Deselected => &self.deselected,
        }
    }

    fn get_mut(&mut self, disposition: Disposition) -> &mut Vec<String> {
        match disposition {
            Disposition::Included => &mut self.included,
            Disposition::NotIncluded => &mut self.not_included,
            Disposition::Excluded => &mut self.excluded,
            Disposition::Deselected => &mut self.deselected,
        }
    }

    pub fn total(&self) -> usize {
        Disposition::ALL.iter().map(|d| self.get(*d).len()).sum()
    }
}

/// A directory the fast pass did not enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedDir {
    /// Relative path as recorded in the buckets
    pub name: String,
    /// Location on disk, with the original (possibly non-UTF-8) names
    pub path: PathBuf,
}

/// Progress of the two-pass scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Fast pass done; these directories were not descended into.
    Fast { pruned: Vec<PrunedDir> },
    /// Pruned directories have been revisited exhaustively.
    Complete,
}

/// The eight result buckets plus pass bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanState {
    pub(crate) files: Buckets,
    pub(crate) dirs: Buckets,
    pub(crate) everything_included: bool,
    pub(crate) phase: Phase,
    /// On-disk paths of entries whose names were not valid UTF-8
    pub(crate) lossy_paths: HashMap<String, PathBuf>,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            files: Buckets::default(),
            dirs: Buckets::default(),
            everything_included: true,
            phase: Phase::Fast { pruned: Vec::new() },
            lossy_paths: HashMap::new(),
        }
    }
}

impl ScanState {
    pub(crate) fn record(&mut self, kind: EntryKind, disposition: Disposition, name: String) {
        if disposition != Disposition::Included {
            self.everything_included = false;
        }
        let buckets = match kind {
            EntryKind::File => &mut self.files,
            EntryKind::Directory => &mut self.dirs,
        };
        buckets.get_mut(disposition).push(name);
    }

    /// Remember where `name` lives if it went through lossy conversion.
    pub(crate) fn note_disk_path(&mut self, name: &str, path: &Path) {
        if name.contains(char::REPLACEMENT_CHARACTER) {
            self.lossy_paths.insert(name.to_string(), path.to_path_buf());
        }
    }

    pub(crate) fn mark_pruned(&mut self, name: &str, path: &Path) {
        if let Phase::Fast { pruned } = &mut self.phase {
            pruned.push(PrunedDir {
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        }
    }

    /// Move to [`Phase::Complete`], handing back the directories still to visit.
    pub(crate) fn take_pruned(&mut self) -> Option<Vec<PrunedDir>> {
        match std::mem::replace(&mut self.phase, Phase::Complete) {
            Phase::Fast { pruned } => Some(pruned),
            Phase::Complete => None,
        }
    }

    pub fn files(&self) -> &Buckets {
        &self.files
    }

    pub fn directories(&self) -> &Buckets {
        &self.dirs
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn is_everything_included(&self) -> bool {
        self.everything_included
    }
}

/// Serialisable snapshot of a completed scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub basedir: PathBuf,
    pub everything_included: bool,
    pub files: Buckets,
    pub directories: Buckets,
}
