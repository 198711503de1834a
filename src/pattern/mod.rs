//! Include/exclude pattern compilation and matching.
//!
//! Patterns come in two flavours:
//!
//! - Ant globs (the default): `*` and `?` within a segment, `**` as a whole
//!   segment for any number of segments. May be written as `%ant[...]` or
//!   `ant:...` to be explicit.
//! - Regular expressions, written `%regex[...]` or `regex:...`, matched
//!   against the whole relative path.

mod ant;
mod set;

use regex::{Regex, RegexBuilder};

use crate::error::{Result, ScanError};
use crate::tokenizer::{tokenize_path, TokenizedPath};

pub use ant::{match_path, match_path_start, Segment};
pub use set::MatchPatterns;

const ANT_HANDLER_PREFIX: &str = "%ant[";
const REGEX_HANDLER_PREFIX: &str = "%regex[";
const HANDLER_SUFFIX: &str = "]";
const ANT_COLON_PREFIX: &str = "ant:";
const REGEX_COLON_PREFIX: &str = "regex:";

/// A pattern string split into its strategy wrapper and body.
struct Wrapped<'a> {
    open: &'a str,
    body: &'a str,
    close: &'a str,
    regex: bool,
}

impl<'a> Wrapped<'a> {
    fn parse(pattern: &'a str) -> Self {
        let bracketed = |prefix: &'a str| {
            pattern
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(HANDLER_SUFFIX))
        };

        if let Some(body) = bracketed(REGEX_HANDLER_PREFIX) {
            return Self::new(REGEX_HANDLER_PREFIX, body, HANDLER_SUFFIX, true);
        }
        if let Some(body) = bracketed(ANT_HANDLER_PREFIX) {
            return Self::new(ANT_HANDLER_PREFIX, body, HANDLER_SUFFIX, false);
        }
        if let Some(body) = pattern.strip_prefix(REGEX_COLON_PREFIX) {
            return Self::new(REGEX_COLON_PREFIX, body, "", true);
        }
        if let Some(body) = pattern.strip_prefix(ANT_COLON_PREFIX) {
            return Self::new(ANT_COLON_PREFIX, body, "", false);
        }
        Self::new("", pattern, "", false)
    }

    fn new(open: &'a str, body: &'a str, close: &'a str, regex: bool) -> Self {
        Self {
            open,
            body,
            close,
            regex,
        }
    }
}

/// Normalize a raw pattern for the given separator.
///
/// Surrounding whitespace is removed. In Ant patterns the foreign separator
/// is converted to `separator`, and a trailing separator gets `**` appended
/// so that `foo/` means everything below `foo`. Regex bodies are left alone.
pub fn normalize_pattern(raw: &str, separator: char) -> String {
    let wrapped = Wrapped::parse(raw.trim());
    if wrapped.regex {
        return format!("{}{}{}", wrapped.open, wrapped.body, wrapped.close);
    }

    let foreign = if separator == '/' { '\\' } else { '/' };
    let mut body = wrapped.body.replace(foreign, &separator.to_string());
    if body.ends_with(separator) {
        body.push_str("**");
    }
    format!("{}{}{}", wrapped.open, body, wrapped.close)
}

#[derive(Debug, Clone)]
enum Strategy {
    Ant {
        segments: Vec<Segment>,
        rooted: bool,
    },
    Regex {
        sensitive: Regex,
        insensitive: Regex,
    },
}

/// A single compiled include or exclude pattern.
#[derive(Debug, Clone)]
pub struct MatchPattern {
    source: String,
    separator: char,
    strategy: Strategy,
}

impl MatchPattern {
    /// Compile an already-normalized pattern.
    pub fn new(pattern: &str, separator: char) -> Result<Self> {
        let wrapped = Wrapped::parse(pattern);
        let strategy = if wrapped.regex {
            Strategy::Regex {
                sensitive: compile_regex(pattern, wrapped.body, true)?,
                insensitive: compile_regex(pattern, wrapped.body, false)?,
            }
        } else {
            let segments = tokenize_path(wrapped.body, separator)
                .iter()
                .map(|raw| Segment::compile(raw))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|source| ScanError::Glob {
                    pattern: pattern.to_string(),
                    source,
                })?;
            Strategy::Ant {
                segments,
                rooted: wrapped.body.starts_with(separator),
            }
        };

        Ok(Self {
            source: pattern.to_string(),
            separator,
            strategy,
        })
    }

    /// Normalize `raw` and compile it.
    pub fn parse(raw: &str, separator: char) -> Result<Self> {
        Self::new(&normalize_pattern(raw, separator), separator)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True for regex patterns, false for Ant globs.
    pub fn is_regex(&self) -> bool {
        matches!(self.strategy, Strategy::Regex { .. })
    }

    pub fn matches(&self, path: &TokenizedPath, case_sensitive: bool) -> bool {
        match &self.strategy {
            Strategy::Ant { segments, rooted } => {
                *rooted == path.is_rooted() && match_path(segments, path.tokens(), case_sensitive)
            }
            Strategy::Regex {
                sensitive,
                insensitive,
            } => {
                let regex = if case_sensitive { sensitive } else { insensitive };
                regex.is_match(path.as_str())
            }
        }
    }

    /// Could a path below `path` match this pattern?
    ///
    /// Regex patterns cannot be evaluated on a prefix and always answer yes.
    pub fn matches_start(&self, path: &TokenizedPath, case_sensitive: bool) -> bool {
        match &self.strategy {
            Strategy::Ant { segments, rooted } => {
                *rooted == path.is_rooted()
                    && match_path_start(segments, path.tokens(), case_sensitive)
            }
            Strategy::Regex { .. } => true,
        }
    }

    /// Does this pattern match `path` and everything below it?
    ///
    /// True when the pattern ends in `**` and matches `path` itself: the final
    /// `**` then absorbs any further segments.
    pub fn matches_subtree(&self, path: &TokenizedPath, case_sensitive: bool) -> bool {
        match &self.strategy {
            Strategy::Ant { segments, .. } => {
                segments.last().is_some_and(Segment::is_double_star)
                    && self.matches(path, case_sensitive)
            }
            Strategy::Regex { .. } => false,
        }
    }

    /// Match a raw path string, tokenizing it with this pattern's separator.
    pub fn matches_str(&self, path: &str, case_sensitive: bool) -> bool {
        self.matches(&TokenizedPath::new(path, self.separator), case_sensitive)
    }

    pub fn matches_start_str(&self, path: &str, case_sensitive: bool) -> bool {
        self.matches_start(&TokenizedPath::new(path, self.separator), case_sensitive)
    }
}

fn compile_regex(pattern: &str, body: &str, case_sensitive: bool) -> Result<Regex> {
    RegexBuilder::new(&format!("^(?:{})$", body))
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|source| ScanError::Regex {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn pattern(raw: &str) -> MatchPattern {
        MatchPattern::parse(raw, '/').unwrap()
    }

    #[test]
    fn test_normalize_trailing_separator() {
        assert_eq!(normalize_pattern("foo/", '/'), "foo/**");
        assert_eq!(normalize_pattern("  foo/bar/ ", '/'), "foo/bar/**");
        assert_eq!(normalize_pattern("foo/**", '/'), "foo/**");
        assert_eq!(normalize_pattern("%ant[foo/]", '/'), "%ant[foo/**]");
    }

    #[test]
    fn test_normalize_foreign_separator() {
        assert_eq!(normalize_pattern(r"src\main\", '/'), "src/main/**");
        assert_eq!(normalize_pattern("src/main/*.rs", '\\'), r"src\main\*.rs");
    }

    #[test]
    fn test_normalize_leaves_regex_alone() {
        assert_eq!(normalize_pattern(r"%regex[.*\\.txt]", '/'), r"%regex[.*\\.txt]");
        assert_eq!(normalize_pattern("regex:a/", '/'), "regex:a/");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["foo/", "a\\b\\", "**/*.txt", "%regex[x/]", "ant:dir/"] {
            let once = normalize_pattern(raw, '/');
            assert_eq!(normalize_pattern(&once, '/'), once);
        }
    }

    #[test]
    fn test_trailing_separator_equivalent_to_double_star() {
        let short = pattern("foo/");
        let long = pattern("foo/**");
        for path in ["foo", "foo/a", "foo/a/b.txt", "bar/foo", "foobar"] {
            assert_eq!(
                short.matches_str(path, true),
                long.matches_str(path, true),
                "disagree on {}",
                path
            );
        }
    }

    #[test]
    fn test_rooted_mismatch_never_matches() {
        let rooted = pattern("/etc/**");
        assert!(rooted.matches_str("/etc/hosts", true));
        assert!(!rooted.matches_str("etc/hosts", true));
        assert!(!rooted.matches_start_str("etc", true));

        let relative = pattern("etc/**");
        assert!(!relative.matches_str("/etc/hosts", true));
    }

    #[test]
    fn test_explicit_ant_prefixes() {
        let bracketed = pattern("%ant[**/*.rs]");
        assert!(!bracketed.is_regex());
        assert!(bracketed.matches_str("src/lib.rs", true));

        let colon = pattern("ant:*.rs");
        assert!(colon.matches_str("lib.rs", true));
        assert!(!colon.matches_str("src/lib.rs", true));
    }

    #[test]
    fn test_regex_patterns() {
        let re = pattern(r"%regex[.*/test_\d+\.txt]");
        assert!(re.is_regex());
        assert!(re.matches_str("a/b/test_42.txt", true));
        assert!(!re.matches_str("test_42.txt", true));
        assert!(!re.matches_str("a/test_x.txt", true));

        let colon = pattern("regex:[a-z]+");
        assert!(colon.matches_str("abc", true));
        assert!(!colon.matches_str("abc/def", true));
    }

    #[test]
    fn test_regex_is_anchored() {
        let re = pattern("regex:foo");
        assert!(re.matches_str("foo", true));
        assert!(!re.matches_str("foobar", true));
        assert!(!re.matches_str("a/foo", true));
    }

    #[test]
    fn test_regex_case_sensitivity() {
        let re = pattern("regex:README.*");
        assert!(!re.matches_str("readme.md", true));
        assert!(re.matches_str("readme.md", false));
    }

    #[test]
    fn test_regex_start_is_conservative() {
        let re = pattern("regex:nothing-matches-this");
        assert!(re.matches_start_str("any/dir", true));
    }

    #[test]
    fn test_malformed_regex_is_pattern_error() {
        let err = MatchPattern::parse("%regex[(unclosed]", '/').unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Pattern);
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_matches_subtree() {
        let p = pattern("**/.git/**");
        assert!(p.matches_subtree(&TokenizedPath::new(".git", '/'), true));
        assert!(p.matches_subtree(&TokenizedPath::new("a/.git/objects", '/'), true));
        assert!(!p.matches_subtree(&TokenizedPath::new("a/b", '/'), true));

        let files_only = pattern("target/**/*");
        assert!(!files_only.matches_subtree(&TokenizedPath::new("target", '/'), true));
    }

    #[test]
    fn test_case_insensitive_ant() {
        let p = pattern("**/*.TXT");
        assert!(!p.matches_str("dir/a.txt", true));
        assert!(p.matches_str("dir/a.txt", false));
        assert!(p.matches_str("DIR/A.TXT", true));
    }
}
