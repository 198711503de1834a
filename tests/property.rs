//! Property tests for pattern matching

use fileset::pattern::normalize_pattern;
use fileset::{MatchPattern, tokenize_path};
use proptest::prelude::*;

fn pattern_strategy() -> impl Strategy<Value = String> {
    let segment = prop::sample::select(vec!["a", "b", "ab", "*", "?", "**", "a*", "*b", "?b"]);
    prop::collection::vec(segment, 1..5).prop_map(|segments| segments.join("/"))
}

fn path_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[abAB]{1,2}", 1..6)
}

proptest! {
    #[test]
    fn match_implies_every_ancestor_could_match(
        pattern in pattern_strategy(),
        segments in path_strategy(),
        case_sensitive in any::<bool>(),
    ) {
        let compiled = MatchPattern::parse(&pattern, '/').unwrap();
        let path = segments.join("/");
        if compiled.matches_str(&path, case_sensitive) {
            for depth in 0..segments.len() {
                let ancestor = segments[..depth].join("/");
                prop_assert!(
                    compiled.matches_start_str(&ancestor, case_sensitive),
                    "{} matches {} but not the start {:?}",
                    pattern, path, ancestor
                );
            }
        }
    }

    #[test]
    fn case_insensitive_accepts_more(
        pattern in pattern_strategy(),
        segments in path_strategy(),
    ) {
        let compiled = MatchPattern::parse(&pattern, '/').unwrap();
        let path = segments.join("/");
        if compiled.matches_str(&path, true) {
            prop_assert!(compiled.matches_str(&path, false));
        }
    }

    #[test]
    fn trailing_separator_equals_double_star(
        pattern in pattern_strategy(),
        segments in path_strategy(),
    ) {
        let short = MatchPattern::parse(&format!("{}/", pattern), '/').unwrap();
        let long = MatchPattern::parse(&format!("{}/**", pattern), '/').unwrap();
        let path = segments.join("/");
        prop_assert_eq!(short.matches_str(&path, true), long.matches_str(&path, true));
    }

    #[test]
    fn normalize_is_idempotent(raw in "[ a-z*?/\\\\]{0,16}") {
        let once = normalize_pattern(&raw, '/');
        prop_assert_eq!(normalize_pattern(&once, '/'), once.clone());
    }

    #[test]
    fn tokens_are_never_empty(path in "[a-z/]{0,20}") {
        for token in tokenize_path(&path, '/') {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.contains('/'));
        }
    }

    #[test]
    fn double_star_matches_everything(segments in path_strategy()) {
        let all = MatchPattern::parse("**", '/').unwrap();
        prop_assert!(all.matches_str(&segments.join("/"), true));
    }
}
