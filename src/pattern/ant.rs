//! Ant-style path matching over tokenized paths.
//!
//! A pattern is a list of [`Segment`]s. Ordinary segments are matched against
//! exactly one path segment using `*` / `?` wildcards; a `**` segment matches
//! any number of whole path segments, including none.

use glob::{MatchOptions, Pattern};

/// One compiled segment of an Ant pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// `**`: zero or more whole path segments.
    DoubleStar,
    /// A segment without wildcards, compared directly.
    Literal(String),
    /// A segment containing `*` or `?`, plus its case-folded form.
    Wildcard { pattern: Pattern, folded: Pattern },
}

impl Segment {
    pub fn compile(raw: &str) -> Result<Self, glob::PatternError> {
        if raw == "**" {
            return Ok(Segment::DoubleStar);
        }
        if !raw.contains(['*', '?']) {
            return Ok(Segment::Literal(raw.to_string()));
        }
        Ok(Segment::Wildcard {
            pattern: Pattern::new(&to_glob_syntax(raw))?,
            folded: Pattern::new(&to_glob_syntax(&fold_case(raw)))?,
        })
    }

    pub fn is_double_star(&self) -> bool {
        matches!(self, Segment::DoubleStar)
    }

    /// Match a single path segment.
    pub fn matches(&self, name: &str, case_sensitive: bool) -> bool {
        match self {
            Segment::DoubleStar => true,
            Segment::Literal(literal) => {
                if case_sensitive {
                    literal == name
                } else {
                    eq_ignore_case(literal, name)
                }
            }
            Segment::Wildcard { pattern, .. } if case_sensitive => {
                pattern.matches_with(name, MATCH_OPTIONS)
            }
            Segment::Wildcard { folded, .. } => {
                folded.matches_with(&fold_case(name), MATCH_OPTIONS)
            }
        }
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Unicode lowercase, char by char. Literal and wildcard segments fold the
/// same way.
fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Translate an Ant segment into `glob` syntax.
///
/// Only `*` and `?` are wildcards in Ant segments, so brackets are escaped.
/// Runs of `*` collapse to one: inside a segment they mean the same thing, and
/// `glob` rejects `**` that is not a whole path component.
fn to_glob_syntax(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut previous_star = false;
    for ch in raw.chars() {
        match ch {
            '*' if previous_star => continue,
            '[' => out.push_str("[[]"),
            ']' => out.push_str("[]]"),
            _ => out.push(ch),
        }
        previous_star = ch == '*';
    }
    out
}

fn only_double_stars(segments: &[Segment]) -> bool {
    segments.iter().all(Segment::is_double_star)
}

/// Full match of `path` against `pattern`.
///
/// Literal segments before the first `**` and after the last `**` are pinned
/// to the start and end of the path. Each run of segments between two `**`
/// is then placed at its earliest position in what remains; leftmost
/// placement is always safe because the following `**` can absorb anything
/// skipped over.
pub fn match_path(pattern: &[Segment], path: &[String], case_sensitive: bool) -> bool {
    let (mut pat_start, mut pat_end) = (0, pattern.len());
    let (mut str_start, mut str_end) = (0, path.len());

    while pat_start < pat_end && str_start < str_end {
        let segment = &pattern[pat_start];
        if segment.is_double_star() {
            break;
        }
        if !segment.matches(&path[str_start], case_sensitive) {
            return false;
        }
        pat_start += 1;
        str_start += 1;
    }

    if str_start == str_end {
        return only_double_stars(&pattern[pat_start..pat_end]);
    }
    if pat_start == pat_end {
        return false;
    }

    while pat_start < pat_end && str_start < str_end {
        let segment = &pattern[pat_end - 1];
        if segment.is_double_star() {
            break;
        }
        if !segment.matches(&path[str_end - 1], case_sensitive) {
            return false;
        }
        pat_end -= 1;
        str_end -= 1;
    }

    if str_start == str_end {
        return only_double_stars(&pattern[pat_start..pat_end]);
    }

    // pattern[pat_start] and pattern[pat_end - 1] are both `**` here
    while pat_end - pat_start > 1 && str_start < str_end {
        let next = match (pat_start + 1..pat_end).find(|&i| pattern[i].is_double_star()) {
            Some(i) => i,
            None => break,
        };
        if next == pat_start + 1 {
            // `**/**`
            pat_start += 1;
            continue;
        }

        let run = &pattern[pat_start + 1..next];
        let available = str_end - str_start;
        if run.len() > available {
            return false;
        }
        let found = (0..=available - run.len()).find(|&offset| {
            run.iter()
                .zip(&path[str_start + offset..])
                .all(|(segment, name)| segment.matches(name, case_sensitive))
        });
        match found {
            Some(offset) => {
                pat_start = next;
                str_start += offset + run.len();
            }
            None => return false,
        }
    }

    only_double_stars(&pattern[pat_start..pat_end])
}

/// Could some extension of `path` still match `pattern`?
///
/// Walks the leading literal segments only. Running out of path first is a
/// possible match, reaching any `**` is a possible match, and running out of
/// pattern with path left over is not.
pub fn match_path_start(pattern: &[Segment], path: &[String], case_sensitive: bool) -> bool {
    let mut pat_idx = 0;
    let mut str_idx = 0;

    while pat_idx < pattern.len() && str_idx < path.len() {
        let segment = &pattern[pat_idx];
        if segment.is_double_star() {
            break;
        }
        if !segment.matches(&path[str_idx], case_sensitive) {
            return false;
        }
        pat_idx += 1;
        str_idx += 1;
    }

    str_idx == path.len() || pat_idx < pattern.len()
}
