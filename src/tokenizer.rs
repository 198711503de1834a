//! Path tokenization shared by the pattern matcher and the scanner.

/// The host path separator.
pub const SEPARATOR: char = std::path::MAIN_SEPARATOR;

/// Split `path` on `separator`, dropping empty segments.
///
/// `"/a/b/"`, `"a/b"` and `"/a/b"` all yield `["a", "b"]`; the empty string
/// yields no segments.
pub fn tokenize_path(path: &str, separator: char) -> Vec<String> {
    path.split(separator)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// A path string together with its segments.
///
/// `rooted` records whether the original string started with the separator;
/// rooted patterns only ever match rooted candidates and vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedPath {
    path: String,
    tokens: Vec<String>,
    rooted: bool,
}

impl TokenizedPath {
    pub fn new(path: &str, separator: char) -> Self {
        Self {
            path: path.to_string(),
            tokens: tokenize_path(path, separator),
            rooted: path.starts_with(separator),
        }
    }

    /// The empty relative path, i.e. the base directory itself.
    pub fn root() -> Self {
        Self {
            path: String::new(),
            tokens: Vec::new(),
            rooted: false,
        }
    }

    /// Extend this path by one segment without re-tokenizing the prefix.
    pub fn child(&self, name: &str, separator: char) -> Self {
        let path = if self.path.is_empty() {
            name.to_string()
        } else if self.path.ends_with(separator) {
            format!("{}{}", self.path, name)
        } else {
            format!("{}{}{}", self.path, separator, name)
        };
        let mut tokens = self.tokens.clone();
        tokens.push(name.to_string());
        Self {
            path,
            tokens,
            rooted: self.rooted,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_string(self) -> String {
        self.path
    }
}
