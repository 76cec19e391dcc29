//! Property-based tests for tag matching laws

use std::collections::BTreeSet;

use dagrules::tags::matches_any;
use dagrules::{TagMatcher, TagSpec};
use proptest::prelude::*;

fn tag_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-e]", 0..5)
}

fn matcher() -> impl Strategy<Value = TagMatcher> {
    (tag_set(), tag_set()).prop_map(|(include, exclude)| TagMatcher { include, exclude })
}

proptest! {
    #[test]
    fn test_absent_spec_always_matches(tags in tag_set()) {
        prop_assert!(matches_any(&tags, None));
    }

    #[test]
    fn test_single_matcher_is_subset_and_disjoint(tags in tag_set(), matcher in matcher()) {
        let expected = matcher.include.is_subset(&tags) && matcher.exclude.is_disjoint(&tags);
        prop_assert_eq!(TagSpec::from(matcher).matches(&tags), expected);
    }

    #[test]
    fn test_list_is_or_of_elements(
        tags in tag_set(),
        matchers in prop::collection::vec(matcher(), 0..4),
    ) {
        let expected = matchers.iter().any(|matcher| matcher.matches(&tags));
        prop_assert_eq!(TagSpec::Any(matchers).matches(&tags), expected);
    }
}
