//! Query engine: field-weighted containment scoring over the search index.
//!
//! The engine operates on an already-built index slice and holds no state,
//! so any number of queries can run concurrently against the same index.
//!
//! # Scoring Algorithm
//!
//! 1. Tokenize: lower-case, split on whitespace runs, drop empty tokens.
//! 2. For every entry and every term:
//!    - `+content` if the term occurs anywhere in the concatenated content,
//!    - `+title` additionally if it occurs in the titles field,
//!    - `+ayah` additionally if it occurs in the ayahs field.
//! 3. Sum per entry; entries scoring `0` are dropped.
//! 4. Sort by score (desc). The sort is stable, so ties keep index order.
//!
//! Matching is plain substring containment, so a term can match inside a
//! longer word. Repeated query terms are scored once per occurrence.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::index::SearchIndexEntry;

/// Per-field score contributions for one matching term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Added when the term occurs anywhere in the entry.
    pub content: f64,
    /// Added on top when the term occurs in the titles.
    pub title: f64,
    /// Added on top when the term occurs in the ayahs.
    pub ayah: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            content: 1.0,
            title: 2.0,
            ayah: 1.5,
        }
    }
}

/// One ranked item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub chapter_id: String,
    pub item_index: usize,
    /// Distinct query terms found in the item, for highlighting.
    pub matched_terms: BTreeSet<String>,
    pub score: f64,
}

/// Split a raw query into lower-cased, non-empty terms.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Rank `index` against `query` with the default weights.
pub fn search_index(index: &[SearchIndexEntry], query: &str) -> Vec<SearchHit> {
    search_index_with(index, query, &ScoreWeights::default())
}

/// Rank `index` against `query` with explicit weights.
///
/// An empty query (after tokenization) returns no hits.
pub fn search_index_with(
    index: &[SearchIndexEntry],
    query: &str,
    weights: &ScoreWeights,
) -> Vec<SearchHit> {
    let terms = tokenize(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = index
        .iter()
        .filter_map(|entry| score_entry(entry, &terms, weights))
        .collect();

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    hits
}

/// Score a single entry, returning `None` when nothing matched.
pub fn score_entry(
    entry: &SearchIndexEntry,
    terms: &[String],
    weights: &ScoreWeights,
) -> Option<SearchHit> {
    let mut score = 0.0;
    let mut matched_terms = BTreeSet::new();

    for term in terms.iter().filter(|t| !t.is_empty()) {
        if entry.content.contains(term.as_str()) {
            score += weights.content;
            matched_terms.insert(term.clone());
        }
        if entry.titles.contains(term.as_str()) {
            score += weights.title;
        }
        if entry.ayahs.contains(term.as_str()) {
            score += weights.ayah;
        }
    }

    if score > 0.0 {
        Some(SearchHit {
            chapter_id: entry.chapter_id.clone(),
            item_index: entry.item_index,
            matched_terms,
            score,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(chapter: &str, index: usize, titles: &str, texts: &str, ayahs: &str) -> SearchIndexEntry {
        let content = [titles, texts, ayahs]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        SearchIndexEntry {
            chapter_id: chapter.to_string(),
            item_index: index,
            content,
            titles: titles.to_string(),
            texts: texts.to_string(),
            ayahs: ayahs.to_string(),
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  Mercy \t of\nGOD  "), vec!["mercy", "of", "god"]);
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let index = vec![entry("1", 0, "", "anything", "")];
        assert!(search_index(&index, "").is_empty());
        assert!(search_index(&index, " \n ").is_empty());
    }

    #[test]
    fn test_field_weights_rank_title_over_ayah_over_text() {
        let index = vec![
            entry("1", 0, "", "mercy here", ""),
            entry("1", 1, "mercy", "", ""),
            entry("1", 2, "", "", "mercy"),
        ];
        let hits = search_index(&index, "mercy");
        let order: Vec<usize> = hits.iter().map(|h| h.item_index).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert!((hits[0].score - 3.0).abs() < 1e-9);
        assert!((hits[1].score - 2.5).abs() < 1e-9);
        assert!((hits[2].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_multi_term_accumulates() {
        let index = vec![
            entry("1", 0, "", "mercy only", ""),
            entry("1", 1, "", "mercy and god", ""),
        ];
        let hits = search_index(&index, "mercy god");
        assert_eq!(hits[0].item_index, 1);
        assert!(hits[0].score > hits[1].score);
        assert_eq!(
            hits[0].matched_terms,
            BTreeSet::from(["god".to_string(), "mercy".to_string()])
        );
        assert_eq!(hits[1].matched_terms, BTreeSet::from(["mercy".to_string()]));
    }

    #[test]
    fn test_substring_matching_inside_words() {
        let index = vec![entry("1", 0, "", "merciful", "")];
        let hits = search_index(&index, "MERC");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].matched_terms.contains("merc"));
    }

    #[test]
    fn test_non_matching_entries_are_excluded() {
        let index = vec![entry("1", 0, "", "a", ""), entry("2", 0, "", "b", "")];
        let hits = search_index(&index, "b");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chapter_id, "2");
        assert!(search_index(&index, "nonexistentword").is_empty());
    }

    #[test]
    fn test_ties_keep_index_order() {
        let index = vec![
            entry("3", 0, "", "same", ""),
            entry("1", 0, "", "same", ""),
            entry("2", 4, "", "same", ""),
        ];
        let keys: Vec<(String, usize)> = search_index(&index, "same")
            .into_iter()
            .map(|h| (h.chapter_id, h.item_index))
            .collect();
        assert_eq!(
            keys,
            vec![("3".into(), 0), ("1".into(), 0), ("2".into(), 4)]
        );
    }

    #[test]
    fn test_repeated_terms_score_per_occurrence() {
        let index = vec![entry("1", 0, "", "word", "")];
        let once = search_index(&index, "word");
        let twice = search_index(&index, "word word");
        assert!((twice[0].score - 2.0 * once[0].score).abs() < 1e-9);
        assert_eq!(twice[0].matched_terms.len(), 1);
    }

    #[test]
    fn test_custom_weights() {
        let index = vec![entry("1", 0, "x", "", ""), entry("1", 1, "", "", "x")];
        let weights = ScoreWeights {
            content: 1.0,
            title: 0.0,
            ayah: 5.0,
        };
        let hits = search_index_with(&index, "x", &weights);
        assert_eq!(hits[0].item_index, 1);
        assert!((hits[0].score - 6.0).abs() < 1e-9);
        assert!((hits[1].score - 1.0).abs() < 1e-9);
    }
}
