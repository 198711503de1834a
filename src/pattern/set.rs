//! An OR-combined collection of patterns.

use crate::error::Result;
use crate::tokenizer::TokenizedPath;

use super::MatchPattern;

#[derive(Debug, Clone, Default)]
pub struct MatchPatterns {
    patterns: Vec<MatchPattern>,
}

impl MatchPatterns {
    /// Normalize and compile each raw pattern.
    ///
    /// Fails on the first pattern that does not compile.
    pub fn compile<I, S>(patterns: I, separator: char) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|raw| MatchPattern::parse(raw.as_ref(), separator))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// True if any pattern fully matches `path`.
    pub fn matches(&self, path: &TokenizedPath, case_sensitive: bool) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches(path, case_sensitive))
    }

    /// True if any pattern could match something at or below `path`.
    pub fn could_match(&self, path: &TokenizedPath, case_sensitive: bool) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_start(path, case_sensitive))
    }

    /// True if some pattern matches `path` and its whole subtree.
    pub fn matches_subtree(&self, path: &TokenizedPath, case_sensitive: bool) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_subtree(path, case_sensitive))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> TokenizedPath {
        TokenizedPath::new(p, '/')
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = MatchPatterns::default();
        assert!(set.is_empty());
        assert!(!set.matches(&path("a.txt"), true));
        assert!(!set.could_match(&path(""), true));
    }

    #[test]
    fn test_matches_is_or() {
        let set = MatchPatterns::compile(["*.txt", "**/*.log"], '/').unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.matches(&path("a.txt"), true));
        assert!(set.matches(&path("deep/b.log"), true));
        assert!(!set.matches(&path("deep/a.txt"), true));
    }

    #[test]
    fn test_could_match() {
        let set = MatchPatterns::compile(["src/main/**", "docs/*.md"], '/').unwrap();
        assert!(set.could_match(&path("src"), true));
        assert!(set.could_match(&path("docs"), true));
        assert!(!set.could_match(&path("target"), true));
        assert!(!set.could_match(&path("docs/api"), true));
    }

    #[test]
    fn test_compile_error_propagates() {
        let result = MatchPatterns::compile(["ok/**", "%regex[[]"], '/');
        assert!(result.is_err());
    }

    #[test]
    fn test_iter_preserves_order() {
        let set = MatchPatterns::compile(["b/", "a"], '/').unwrap();
        let sources: Vec<_> = set.iter().map(MatchPattern::source).collect();
        assert_eq!(sources, vec!["b/**", "a"]);
    }
}
