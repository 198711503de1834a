//! Symbolic link policy consulted while scanning.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Whether traversal follows symbolic links, plus the link queries the
/// scanner needs.
///
/// Entry types are always resolved through links, so a link to a directory
/// is classified as a directory. When links are not followed, the entries
/// *inside* a linked directory are cut off: they are bucketed as excluded
/// and never descended into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymlinkPolicy {
    follow: bool,
}

impl SymlinkPolicy {
    pub fn new(follow: bool) -> Self {
        Self { follow }
    }

    pub fn follows_links(&self) -> bool {
        self.follow
    }

    /// Is `parent/name` itself a symbolic link?
    pub fn is_symbolic_link(&self, parent: &Path, name: &str) -> io::Result<bool> {
        is_link(&parent.join(name))
    }

    /// Is the directory holding `name` a symbolic link?
    pub fn is_parent_symbolic_link(&self, parent: &Path, _name: &str) -> io::Result<bool> {
        is_link(parent)
    }

    /// Should the entries of `dir` be cut off instead of classified?
    pub fn cuts_off(&self, dir: &Path) -> io::Result<bool> {
        if self.follow {
            return Ok(false);
        }
        is_link(dir)
    }

    /// Is `relative` (below `base`) reached through a link at any level?
    ///
    /// `base` itself is not considered.
    pub fn is_reached_through_link(&self, base: &Path, relative: &Path) -> io::Result<bool> {
        let mut current = base.to_path_buf();
        for segment in relative.components() {
            current.push(segment);
            if is_link(&current)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

pub(crate) fn is_link(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(meta.file_type().is_symlink()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Canonical identities of the directories currently open in a traversal.
///
/// Used when links are followed: a directory that resolves to one of its own
/// ancestors would recurse forever and is treated as an exclusion boundary.
#[derive(Debug, Default)]
pub(crate) struct AncestorChain {
    open: Vec<PathBuf>,
}

impl AncestorChain {
    /// Build the chain for `base` and every directory on the way to `relative`.
    pub(crate) fn resolve(base: &Path, relative: &Path) -> io::Result<Self> {
        let mut chain = Self::default();
        let mut current = base.to_path_buf();
        chain.open.push(fs::canonicalize(&current)?);
        for segment in relative.components() {
            current.push(segment);
            chain.open.push(fs::canonicalize(&current)?);
        }
        Ok(chain)
    }

    /// Canonical identity of `name` inside the innermost open directory.
    ///
    /// Only links need a filesystem round trip.
    pub(crate) fn identity_of(&self, path: &Path, name: &OsStr, is_link: bool) -> io::Result<PathBuf> {
        match self.open.last() {
            Some(parent) if !is_link => Ok(parent.join(name)),
            _ => fs::canonicalize(path),
        }
    }

    pub(crate) fn contains(&self, identity: &Path) -> bool {
        self.open.iter().any(|open| open == identity)
    }

    pub(crate) fn push(&mut self, identity: PathBuf) {
        self.open.push(identity);
    }

    pub(crate) fn pop(&mut self) {
        self.open.pop();
    }
}
