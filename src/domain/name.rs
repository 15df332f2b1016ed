use std::cmp::Reverse;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::{PhoneQuery, PlaceCandidate, NO_RESULT};

lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"\d+").unwrap();
    static ref PARENTHESIZED: Regex = Regex::new(r"\(.*?\)").unwrap();
}

pub const CANONICAL_COLUMNS: [&str; 2] = ["searchedPhoneNumber", "name"];

/// Reduces a free-text business name to its comparable base token.
///
/// Digits go first, then every `( ... )` qualifier (non-greedy), then the
/// result is trimmed and cut down to its first whitespace-delimited word.
/// `"ACME Corp(Seoul)1"` becomes `"ACME"`.
pub fn normalize(raw_name: &str) -> String {
    let without_digits = DIGITS.replace_all(raw_name, "");
    let without_qualifiers = PARENTHESIZED.replace_all(&without_digits, "");

    without_qualifiers
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalName {
    pub searched_phone_number: String,
    pub name: String,
}

impl CanonicalName {
    pub fn is_no_result(&self) -> bool {
        self.name == NO_RESULT
    }

    pub fn row(&self) -> Vec<String> {
        vec![self.searched_phone_number.clone(), self.name.clone()]
    }
}

/// Picks the most frequent base token among the candidates found for one phone.
///
/// Ties go to the token seen first in candidate order. When only the no-result
/// sentinel is present the sentinel itself is the canonical name.
pub fn resolve_canonical_name(phone: &PhoneQuery, candidates: &[PlaceCandidate]) -> CanonicalName {
    let base_names: Vec<String> = candidates
        .iter()
        .filter(|candidate| !candidate.is_no_result())
        .map(|candidate| normalize(&candidate.name))
        .collect();

    let name = match base_names.is_empty() {
        true => NO_RESULT.to_string(),
        false => {
            let counts = base_names.iter().counts();
            base_names
                .iter()
                .unique()
                .min_by_key(|name| Reverse(counts[name]))
                .cloned()
                .unwrap_or_default()
        }
    };

    CanonicalName {
        searched_phone_number: phone.to_string(),
        name,
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize, resolve_canonical_name};
    use crate::domain::{PhoneQuery, PlaceCandidate, NO_RESULT};

    fn phone() -> PhoneQuery {
        PhoneQuery::parse("021234567".to_string()).unwrap()
    }

    fn candidate(name: &str) -> PlaceCandidate {
        PlaceCandidate {
            searched_phone_number: "021234567".to_string(),
            name: name.to_string(),
            tel: "02-123-4567".to_string(),
            category: vec!["식당".to_string()],
            road_address: "서울 강서구".to_string(),
        }
    }

    #[test]
    fn normalize_strips_digits_and_qualifiers() {
        assert_eq!(normalize("ABC123(Branch)"), "ABC");
        assert_eq!(normalize("ACME Corp(Seoul)1"), "ACME");
        assert_eq!(normalize("ACME Corp2"), "ACME");
        assert_eq!(normalize("  스타벅스 강남점(2호) "), "스타벅스");
    }

    #[test]
    fn normalize_is_non_greedy() {
        assert_eq!(normalize("(주)한빛(본점)상사"), "한빛상사");
    }

    #[test]
    fn normalize_of_empty_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("1234"), "");
        assert_eq!(normalize("(only)"), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "ABC123(Branch)",
            "a)(b)",
            "((b)c)",
            "x(y",
            "  Multi Word Name ",
            "(주)한빛(본점)상사 2층",
            "",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn most_frequent_base_name_wins() {
        let candidates = vec![
            candidate("Other Shop"),
            candidate("ACME Corp(Seoul)1"),
            candidate("ACME Corp2"),
        ];
        let canonical = resolve_canonical_name(&phone(), &candidates);

        assert_eq!(canonical.name, "ACME");
        assert_eq!(canonical.searched_phone_number, "021234567");
    }

    #[test]
    fn ties_go_to_first_encountered() {
        let candidates = vec![
            candidate("Beta 1"),
            candidate("Alpha 2"),
            candidate("Alpha"),
            candidate("Beta"),
        ];

        for _ in 0..10 {
            assert_eq!(resolve_canonical_name(&phone(), &candidates).name, "Beta");
        }
    }

    #[test]
    fn sentinel_only_propagates_sentinel() {
        let candidates = vec![PlaceCandidate::no_result(&phone())];
        let canonical = resolve_canonical_name(&phone(), &candidates);

        assert_eq!(canonical.name, NO_RESULT);
        assert!(canonical.is_no_result());
    }
}
