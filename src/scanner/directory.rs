//! DirectoryScanner - classifies every entry below a base directory

use std::cmp::Ordering;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::error::{Result, ScanError};
use crate::pattern::{normalize_pattern, MatchPatterns};
use crate::tokenizer::{TokenizedPath, SEPARATOR};

use super::config::ScannerConfig;
use super::defaults::DEFAULT_EXCLUDES;
use super::select::FileSelector;
use super::state::{Disposition, EntryKind, PrunedDir, ScanReport, ScanState};
use super::symlink::{is_link, AncestorChain, SymlinkPolicy};

/// Orders the names within one directory listing.
pub type FilenameComparator = Arc<dyn Fn(&str, &str) -> Ordering + Send + Sync>;

/// Configures and runs scans.
///
/// A scanner can be reused; every call to [`scan`](Self::scan) starts from
/// empty results and returns them as an independent [`Scan`].
#[derive(Clone, Default)]
pub struct DirectoryScanner {
    config: ScannerConfig,
    comparator: Option<FilenameComparator>,
    selector: Option<Arc<dyn FileSelector>>,
}

impl fmt::Debug for DirectoryScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryScanner")
            .field("config", &self.config)
            .field("sorted", &self.comparator.is_some())
            .field("selector", &self.selector.is_some())
            .finish()
    }
}

impl DirectoryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: ScannerConfig) -> Self {
        let mut scanner = Self::new();
        scanner.set_basedir_opt(config.basedir.clone());
        if let Some(includes) = &config.includes {
            scanner.set_includes(includes);
        }
        scanner.set_excludes(&config.excludes);
        if config.default_excludes {
            scanner.add_default_excludes();
        }
        scanner.set_follow_symlinks(config.follow_symlinks);
        scanner.set_case_sensitive(config.case_sensitive);
        scanner
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn basedir(&self) -> Option<&Path> {
        self.config.basedir.as_deref()
    }

    pub fn set_basedir(&mut self, basedir: impl Into<PathBuf>) {
        self.config.basedir = Some(basedir.into());
    }

    fn set_basedir_opt(&mut self, basedir: Option<PathBuf>) {
        self.config.basedir = basedir;
    }

    /// Replace the include patterns. Each is normalized for the host separator.
    pub fn set_includes<S: AsRef<str>>(&mut self, includes: &[S]) {
        self.config.includes = Some(normalize_all(includes));
    }

    /// Go back to including everything.
    pub fn clear_includes(&mut self) {
        self.config.includes = None;
    }

    /// Replace the exclude patterns, dropping any default excludes added
    /// earlier.
    pub fn set_excludes<S: AsRef<str>>(&mut self, excludes: &[S]) {
        self.config.excludes = normalize_all(excludes);
        self.config.default_excludes = false;
    }

    /// Append the built-in VCS/metadata excludes to the current exclude set.
    pub fn add_default_excludes(&mut self) {
        if self.config.default_excludes {
            return;
        }
        self.config.excludes.extend(normalize_all(DEFAULT_EXCLUDES));
        self.config.default_excludes = true;
    }

    pub fn set_follow_symlinks(&mut self, follow: bool) {
        self.config.follow_symlinks = follow;
    }

    pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.config.case_sensitive = case_sensitive;
    }

    pub fn set_filename_comparator<F>(&mut self, comparator: F)
    where
        F: Fn(&str, &str) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
    }

    pub fn set_selector<S: FileSelector + 'static>(&mut self, selector: S) {
        self.selector = Some(Arc::new(selector));
    }

    pub fn with_basedir(mut self, basedir: impl Into<PathBuf>) -> Self {
        self.set_basedir(basedir);
        self
    }

    pub fn with_includes<S: AsRef<str>>(mut self, includes: &[S]) -> Self {
        self.set_includes(includes);
        self
    }

    pub fn with_excludes<S: AsRef<str>>(mut self, excludes: &[S]) -> Self {
        self.set_excludes(excludes);
        self
    }

    pub fn with_default_excludes(mut self) -> Self {
        self.add_default_excludes();
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.set_follow_symlinks(follow);
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.set_case_sensitive(case_sensitive);
        self
    }

    /// Sort each directory listing by name.
    pub fn sorted(mut self) -> Self {
        self.set_filename_comparator(|a: &str, b: &str| a.cmp(b));
        self
    }

    pub fn with_filename_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&str, &str) -> Ordering + Send + Sync + 'static,
    {
        self.set_filename_comparator(comparator);
        self
    }

    pub fn with_selector<S: FileSelector + 'static>(mut self, selector: S) -> Self {
        self.set_selector(selector);
        self
    }

    pub fn is_symbolic_link(&self, parent: &Path, name: &str) -> io::Result<bool> {
        self.policy().is_symbolic_link(parent, name)
    }

    pub fn is_parent_symbolic_link(&self, parent: &Path, name: &str) -> io::Result<bool> {
        self.policy().is_parent_symbolic_link(parent, name)
    }

    fn policy(&self) -> SymlinkPolicy {
        SymlinkPolicy::new(self.config.follow_symlinks)
    }

    /// Run the fast pass.
    ///
    /// Patterns are compiled before the filesystem is touched, so a bad
    /// pattern is reported even when the base directory is also wrong.
    pub fn scan(&self) -> Result<Scan> {
        let started = Instant::now();

        let includes = match &self.config.includes {
            Some(patterns) => MatchPatterns::compile(patterns, SEPARATOR)?,
            None => MatchPatterns::compile(["**"], SEPARATOR)?,
        };
        let excludes = MatchPatterns::compile(&self.config.excludes, SEPARATOR)?;

        let basedir = self.config.basedir.clone().ok_or(ScanError::MissingBasedir)?;
        if !basedir.exists() {
            return Err(ScanError::BasedirNotFound(basedir));
        }
        if !basedir.is_dir() {
            return Err(ScanError::NotADirectory(basedir));
        }

        debug!(
            basedir = %basedir.display(),
            includes = includes.len(),
            excludes = excludes.len(),
            follow_symlinks = self.config.follow_symlinks,
            "starting scan"
        );

        let walker = Walker {
            basedir,
            includes,
            excludes,
            case_sensitive: self.config.case_sensitive,
            policy: self.policy(),
            comparator: self.comparator.clone(),
            selector: self.selector.clone(),
        };

        let mut state = ScanState::default();
        let root = TokenizedPath::root();
        let disposition = walker.classify(&root, &walker.basedir);
        state.record(EntryKind::Directory, disposition, String::new());

        let mut ancestors = AncestorChain::resolve(&walker.basedir, Path::new(""))
            .map_err(|e| ScanError::io(&walker.basedir, e))?;
        walker.scandir(&mut state, &walker.basedir, &root, Mode::Fast, &mut ancestors)?;

        let elapsed = started.elapsed();
        debug!(
            files = state.files().included.len(),
            dirs = state.directories().included.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "fast scan finished"
        );

        Ok(Scan {
            walker,
            state,
            elapsed,
        })
    }
}

fn normalize_all<S: AsRef<str>>(patterns: &[S]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| normalize_pattern(p.as_ref(), SEPARATOR))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Skip subtrees that cannot contain included entries.
    Fast,
    /// Visit everything.
    Slow,
}

/// Everything a traversal needs, fixed for the lifetime of one scan.
struct Walker {
    basedir: PathBuf,
    includes: MatchPatterns,
    excludes: MatchPatterns,
    case_sensitive: bool,
    policy: SymlinkPolicy,
    comparator: Option<FilenameComparator>,
    selector: Option<Arc<dyn FileSelector>>,
}

impl Walker {
    fn classify(&self, entry: &TokenizedPath, path: &Path) -> Disposition {
        if !self.includes.matches(entry, self.case_sensitive) {
            return Disposition::NotIncluded;
        }
        if self.excludes.matches(entry, self.case_sensitive) {
            return Disposition::Excluded;
        }
        let selected = self
            .selector
            .as_ref()
            .is_none_or(|s| s.is_selected(entry.as_str(), path));
        if selected {
            Disposition::Included
        } else {
            Disposition::Deselected
        }
    }

    /// Fast-pass recursion rule for a directory with the given disposition.
    fn descends_fast(&self, disposition: Disposition, entry: &TokenizedPath) -> bool {
        match disposition {
            Disposition::Included | Disposition::Deselected => true,
            Disposition::NotIncluded => self.includes.could_match(entry, self.case_sensitive),
            Disposition::Excluded => {
                self.includes.could_match(entry, self.case_sensitive)
                    && !self.excludes.matches_subtree(entry, self.case_sensitive)
            }
        }
    }

    /// Materialize and order one directory listing.
    ///
    /// Each entry keeps its name on disk for filesystem calls, next to the
    /// lossily converted name used for matching and reporting.
    fn list(&self, dir: &Path) -> Result<Vec<(OsString, String)>> {
        let entries = fs::read_dir(dir).map_err(|e| ScanError::io(dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ScanError::io(dir, e))?;
            let name = entry.file_name();
            let display = name.to_string_lossy().into_owned();
            names.push((name, display));
        }
        if let Some(comparator) = &self.comparator {
            names.sort_by(|a, b| comparator(&a.1, &b.1));
        }
        Ok(names)
    }

    fn scandir(
        &self,
        state: &mut ScanState,
        dir: &Path,
        prefix: &TokenizedPath,
        mode: Mode,
        ancestors: &mut AncestorChain,
    ) -> Result<()> {
        let names = self.list(dir)?;

        if !prefix.is_empty() && self.policy.cuts_off(dir).map_err(|e| ScanError::io(dir, e))? {
            debug!(dir = %prefix.as_str(), entries = names.len(), "not following symlinked directory");
            for (os_name, name) in names {
                let path = dir.join(&os_name);
                if let Some(kind) = entry_kind(&path)? {
                    let entry = prefix.child(&name, SEPARATOR);
                    state.note_disk_path(entry.as_str(), &path);
                    state.record(kind, Disposition::Excluded, entry.into_string());
                }
            }
            return Ok(());
        }

        for (os_name, name) in names {
            let path = dir.join(&os_name);
            let entry = prefix.child(&name, SEPARATOR);
            let kind = entry_kind(&path)?;
            if kind.is_some() {
                state.note_disk_path(entry.as_str(), &path);
            }
            match kind {
                Some(EntryKind::File) => {
                    let disposition = self.classify(&entry, &path);
                    trace!(file = %entry.as_str(), ?disposition, "classified");
                    state.record(EntryKind::File, disposition, entry.into_string());
                }
                Some(EntryKind::Directory) => {
                    self.visit_directory(state, &path, &os_name, entry, mode, ancestors)?;
                }
                None => trace!(entry = %entry.as_str(), "skipping special entry"),
            }
        }
        Ok(())
    }

    fn visit_directory(
        &self,
        state: &mut ScanState,
        path: &Path,
        name: &OsStr,
        entry: TokenizedPath,
        mode: Mode,
        ancestors: &mut AncestorChain,
    ) -> Result<()> {
        let linked = self.policy.follows_links() && is_link(path).map_err(|e| ScanError::io(path, e))?;
        let identity = ancestors
            .identity_of(path, name, linked)
            .map_err(|e| ScanError::io(path, e))?;

        if linked && ancestors.contains(&identity) {
            debug!(dir = %entry.as_str(), target = %identity.display(), "symlink cycle");
            state.record(EntryKind::Directory, Disposition::Excluded, entry.into_string());
            return Ok(());
        }

        let disposition = self.classify(&entry, path);
        trace!(dir = %entry.as_str(), ?disposition, "classified");
        state.record(EntryKind::Directory, disposition, entry.as_str().to_string());

        let descend = match mode {
            Mode::Slow => true,
            Mode::Fast => self.descends_fast(disposition, &entry),
        };
        if !descend {
            debug!(dir = %entry.as_str(), ?disposition, "pruned");
            state.mark_pruned(entry.as_str(), path);
            return Ok(());
        }

        ancestors.push(identity);
        let result = self.scandir(state, path, &entry, mode, ancestors);
        ancestors.pop();

        match (result, mode) {
            (Err(e), Mode::Slow) => {
                warn!(dir = %entry.as_str(), error = %e, "skipping directory during exhaustive scan");
                Ok(())
            }
            (result, _) => result,
        }
    }

    /// Exhaustively scan one directory the fast pass skipped.
    fn rescan(&self, state: &mut ScanState, pruned: &PrunedDir) -> Result<()> {
        let dir = &pruned.path;
        let relative = dir.strip_prefix(&self.basedir).unwrap_or(dir);
        let parent = relative.parent().unwrap_or(Path::new(""));
        if !self.policy.follows_links()
            && self
                .policy
                .is_reached_through_link(&self.basedir, parent)
                .map_err(|e| ScanError::io(dir, e))?
        {
            debug!(dir = %pruned.name, "below a symlinked directory, not rescanning");
            return Ok(());
        }

        let mut ancestors =
            AncestorChain::resolve(&self.basedir, relative).map_err(|e| ScanError::io(dir, e))?;
        let prefix = TokenizedPath::new(&pruned.name, SEPARATOR);
        self.scandir(state, dir, &prefix, Mode::Slow, &mut ancestors)
    }
}

/// Resolve an entry to a file or directory, following links.
///
/// Dangling links and entries that vanished since the listing yield `None`,
/// as do sockets, fifos and devices.
fn entry_kind(path: &Path) -> Result<Option<EntryKind>> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Directory)),
        Ok(meta) if meta.is_file() => Ok(Some(EntryKind::File)),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound || is_dangling_link(path) => Ok(None),
        Err(e) => Err(ScanError::io(path, e)),
    }
}

fn is_dangling_link(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
}

/// Results of one scan.
///
/// Included entries are final after the fast pass. The other buckets are
/// completed by an exhaustive pass over the pruned directories the first
/// time one of them is requested.
pub struct Scan {
    walker: Walker,
    state: ScanState,
    elapsed: Duration,
}

impl fmt::Debug for Scan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scan")
            .field("basedir", &self.walker.basedir)
            .field("state", &self.state)
            .finish()
    }
}

impl Scan {
    pub fn basedir(&self) -> &Path {
        &self.walker.basedir
    }

    /// Time spent in the fast pass.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Location on disk of a reported entry.
    ///
    /// Differs from joining `name` onto the base directory only when the
    /// name was not valid UTF-8.
    pub fn disk_path(&self, name: &str) -> PathBuf {
        match self.state.lossy_paths.get(name) {
            Some(path) => path.clone(),
            None => self.walker.basedir.join(name),
        }
    }

    pub fn included_files(&self) -> &[String] {
        &self.state.files.included
    }

    pub fn included_directories(&self) -> &[String] {
        &self.state.dirs.included
    }

    pub fn not_included_files(&mut self) -> &[String] {
        self.files(Disposition::NotIncluded)
    }

    pub fn not_included_directories(&mut self) -> &[String] {
        self.directories(Disposition::NotIncluded)
    }

    pub fn excluded_files(&mut self) -> &[String] {
        self.files(Disposition::Excluded)
    }

    pub fn excluded_directories(&mut self) -> &[String] {
        self.directories(Disposition::Excluded)
    }

    pub fn deselected_files(&mut self) -> &[String] {
        self.files(Disposition::Deselected)
    }

    pub fn deselected_directories(&mut self) -> &[String] {
        self.directories(Disposition::Deselected)
    }

    /// Files with the given disposition, completing the scan if needed.
    pub fn files(&mut self, disposition: Disposition) -> &[String] {
        if disposition != Disposition::Included {
            self.slow_scan();
        }
        self.state.files.get(disposition)
    }

    /// Directories with the given disposition, completing the scan if needed.
    pub fn directories(&mut self, disposition: Disposition) -> &[String] {
        if disposition != Disposition::Included {
            self.slow_scan();
        }
        self.state.dirs.get(disposition)
    }

    pub fn is_everything_included(&self) -> bool {
        self.state.is_everything_included()
    }

    pub fn has_slow_results(&self) -> bool {
        self.state.is_complete()
    }

    /// Revisit every directory the fast pass pruned. Runs at most once.
    ///
    /// Failures are logged and skipped per directory.
    pub fn slow_scan(&mut self) {
        let Some(pruned) = self.state.take_pruned() else {
            return;
        };
        debug!(directories = pruned.len(), "starting exhaustive scan");
        for dir in pruned {
            if let Err(e) = self.walker.rescan(&mut self.state, &dir) {
                warn!(dir = %dir.name, error = %e, "skipping directory during exhaustive scan");
            }
        }
    }

    /// Complete the scan and take a serialisable snapshot of all buckets.
    pub fn into_report(mut self) -> ScanReport {
        self.slow_scan();
        ScanReport {
            basedir: self.walker.basedir,
            everything_included: self.state.everything_included,
            files: self.state.files,
            directories: self.state.dirs,
        }
    }
}
