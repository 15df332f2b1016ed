use std::sync::Arc;

use serde::Deserialize;
use strsim::{jaro_winkler, normalized_levenshtein};

const CORPORATE_MARKERS: [&str; 2] = ["(주)", "㈜"];

/// Drops a leading `(주)`/`㈜` corporate marker. Jaro-Winkler only pairs
/// characters within a small window, so the shifted name would score 0.
pub fn strip_corporate_marker(title: &str) -> &str {
    let title = title.trim();
    CORPORATE_MARKERS
        .iter()
        .find_map(|marker| title.strip_prefix(marker))
        .map(str::trim)
        .unwrap_or(title)
}

/// Scores how well a registry listing title matches the queried name.
/// Higher is better; scores must be deterministic for the same inputs.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, query: &str, title: &str) -> f64;
}

pub struct JaroWinkler;

impl SimilarityScorer for JaroWinkler {
    fn score(&self, query: &str, title: &str) -> f64 {
        jaro_winkler(query, strip_corporate_marker(title))
    }
}

pub struct Levenshtein;

impl SimilarityScorer for Levenshtein {
    fn score(&self, query: &str, title: &str) -> f64 {
        normalized_levenshtein(query, strip_corporate_marker(title))
    }
}

/// Accepts only the exact name or its `(주)`-prefixed corporate form.
pub struct CorporatePrefix;

impl SimilarityScorer for CorporatePrefix {
    fn score(&self, query: &str, title: &str) -> f64 {
        match strip_corporate_marker(title) == query {
            true => 1.0,
            false => 0.0,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    #[default]
    JaroWinkler,
    Levenshtein,
    CorporatePrefix,
}

impl MatchStrategy {
    pub fn scorer(&self) -> Arc<dyn SimilarityScorer> {
        match self {
            MatchStrategy::JaroWinkler => Arc::new(JaroWinkler),
            MatchStrategy::Levenshtein => Arc::new(Levenshtein),
            MatchStrategy::CorporatePrefix => Arc::new(CorporatePrefix),
        }
    }
}
