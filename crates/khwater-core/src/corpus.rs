//! The corpus: every chapter and its items, plus the on-disk document shapes.
//!
//! A [`Corpus`] is immutable once built. Chapter identifiers are numeric
//! strings and every listing (chapter ids, summaries, index build order) is
//! in numeric order, so `"10"` follows `"9"`.
//!
//! Chapter lookups are the one place where this crate reports a hard
//! failure: a missing chapter or item is a [`CorpusError`], distinct from the
//! silent degradations of the resolver.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::Item;

/// Lookup failures at the chapter boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CorpusError {
    #[error("chapter not found: {id}")]
    ChapterNotFound { id: String },
    #[error("item not found: chapter {chapter}, index {index}")]
    ItemNotFound { chapter: String, index: usize },
}

/// Compare chapter identifiers numerically.
///
/// Numeric identifiers sort by value and come before non-numeric ones.
/// Non-numeric identifiers, and numeric ones with equal value (`"01"` vs
/// `"1"`), fall back to string order.
pub fn compare_chapter_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// All chapters, keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    chapters: HashMap<String, Vec<Item>>,
    ids: Vec<String>,
}

impl Corpus {
    pub fn new(chapters: HashMap<String, Vec<Item>>) -> Self {
        let mut ids: Vec<String> = chapters.keys().cloned().collect();
        ids.sort_by(|a, b| compare_chapter_ids(a, b));
        Self { chapters, ids }
    }

    /// Chapter identifiers in numeric order.
    pub fn chapter_ids(&self) -> &[String] {
        &self.ids
    }

    /// `(id, items)` pairs in numeric chapter order.
    pub fn chapters(&self) -> impl Iterator<Item = (&str, &[Item])> + '_ {
        self.ids
            .iter()
            .filter_map(|id| self.chapters.get(id).map(|items| (id.as_str(), items.as_slice())))
    }

    pub fn get(&self, id: &str) -> Option<&[Item]> {
        self.chapters.get(id).map(Vec::as_slice)
    }

    /// Like [`get`](Corpus::get), also returning the stored identifier.
    pub fn get_key_value(&self, id: &str) -> Option<(&str, &[Item])> {
        self.chapters
            .get_key_value(id)
            .map(|(key, items)| (key.as_str(), items.as_slice()))
    }

    /// Items of chapter `id`, or [`CorpusError::ChapterNotFound`].
    pub fn chapter(&self, id: &str) -> Result<&[Item], CorpusError> {
        self.get(id).ok_or_else(|| CorpusError::ChapterNotFound { id: id.to_string() })
    }

    /// A single item, or the matching [`CorpusError`].
    pub fn item(&self, id: &str, index: usize) -> Result<&Item, CorpusError> {
        self.chapter(id)?
            .get(index)
            .ok_or_else(|| CorpusError::ItemNotFound {
                chapter: id.to_string(),
                index,
            })
    }

    /// Number of chapters.
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Total number of items across all chapters.
    pub fn item_count(&self) -> usize {
        self.chapters.values().map(Vec::len).sum()
    }

    /// Display metadata for every chapter, in numeric order.
    pub fn summaries(&self) -> Vec<ChapterSummary> {
        self.chapters()
            .map(|(id, items)| ChapterSummary::new(id, items))
            .collect()
    }
}

impl From<HashMap<String, Vec<Item>>> for Corpus {
    fn from(chapters: HashMap<String, Vec<Item>>) -> Self {
        Self::new(chapters)
    }
}

impl FromIterator<(String, Vec<Item>)> for Corpus {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Item>)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Listing metadata for one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    pub id: String,
    /// Generic label, `الفصل <id>`.
    pub title: String,
    /// First line of the chapter's opening title, falling back to `title`.
    pub chapter_title: String,
    pub description: String,
    pub item_count: usize,
}

impl ChapterSummary {
    pub fn new(id: &str, items: &[Item]) -> Self {
        let title = format!("الفصل {}", id);
        let chapter_title = items
            .first()
            .and_then(Item::heading)
            .map(str::to_string)
            .unwrap_or_else(|| title.clone());
        Self {
            id: id.to_string(),
            chapter_title,
            description: format!("محتوى الفصل {}", id),
            item_count: items.len(),
            title,
        }
    }
}

// ============ On-disk shapes ============

/// Single-file layout: every chapter in one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusDocument {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub generated: Option<String>,
    #[serde(default)]
    pub total_lists: Option<usize>,
    pub lists: HashMap<String, Vec<Item>>,
}

impl CorpusDocument {
    pub fn into_corpus(self) -> Corpus {
        Corpus::new(self.lists)
    }
}

/// `index.json` of the split-directory layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusManifest {
    #[serde(default)]
    pub total_chapters: Option<usize>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub generated: Option<String>,
    pub chapters: Vec<ManifestChapter>,
}

/// One chapter entry in [`CorpusManifest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestChapter {
    pub id: String,
    /// Item count recorded when the manifest was generated.
    #[serde(default)]
    pub items: Option<usize>,
    #[serde(default, rename = "sizeKB")]
    pub size_kb: Option<f64>,
}

/// `<id>.json` of the split-directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterDocument {
    pub items: Vec<Item>,
    #[serde(default)]
    pub metadata: Option<ChapterDocumentMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDocumentMetadata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub generated: Option<String>,
    #[serde(default)]
    pub total_items: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_item(text: &str) -> Item {
        Item {
            texts: Some(vec![text.to_string()]),
            ..Default::default()
        }
    }

    fn corpus(ids: &[&str]) -> Corpus {
        ids.iter()
            .map(|id| (id.to_string(), vec![text_item(id)]))
            .collect()
    }

    #[test]
    fn test_chapter_ids_sort_numerically() {
        let c = corpus(&["2", "10", "1", "9"]);
        assert_eq!(c.chapter_ids(), ["1", "2", "9", "10"]);
    }

    #[test]
    fn test_compare_chapter_ids_mixed() {
        let mut ids = vec!["b", "10", "a", "2", "02"];
        ids.sort_by(|a, b| compare_chapter_ids(a, b));
        assert_eq!(ids, vec!["02", "2", "10", "a", "b"]);
    }

    #[test]
    fn test_chapter_lookup_errors_are_typed() {
        let c = corpus(&["1"]);
        assert!(c.chapter("1").is_ok());
        assert_eq!(
            c.chapter("7"),
            Err(CorpusError::ChapterNotFound { id: "7".into() })
        );
        assert_eq!(
            c.item("1", 3),
            Err(CorpusError::ItemNotFound {
                chapter: "1".into(),
                index: 3
            })
        );
        assert_eq!(
            c.item("7", 0).unwrap_err().to_string(),
            "chapter not found: 7"
        );
    }

    #[test]
    fn test_counts() {
        let mut chapters = HashMap::new();
        chapters.insert("1".to_string(), vec![text_item("a"), text_item("b")]);
        chapters.insert("2".to_string(), vec![text_item("c")]);
        let c = Corpus::new(chapters);
        assert_eq!(c.len(), 2);
        assert_eq!(c.item_count(), 3);
        assert!(!c.is_empty());
        assert!(Corpus::default().is_empty());
    }

    #[test]
    fn test_summaries_use_first_title_line() {
        let mut chapters = HashMap::new();
        chapters.insert(
            "3".to_string(),
            vec![Item {
                titles: Some(vec!["عنوان\nتكملة".into()]),
                ..Default::default()
            }],
        );
        chapters.insert("1".to_string(), vec![text_item("بدون عنوان")]);
        let summaries = Corpus::new(chapters).summaries();

        assert_eq!(summaries[0].id, "1");
        assert_eq!(summaries[0].chapter_title, "الفصل 1");
        assert_eq!(summaries[1].chapter_title, "عنوان");
        assert_eq!(summaries[1].title, "الفصل 3");
        assert_eq!(summaries[1].item_count, 1);
    }

    #[test]
    fn test_parse_corpus_document() {
        let doc: CorpusDocument = serde_json::from_value(json!({
            "version": "1.0",
            "generated": "2024-01-01T00:00:00Z",
            "totalLists": 2,
            "lists": {
                "10": [{"texts": ["x"], "order": ["texts"]}],
                "2": [{"titles": ["t"], "order": ["titles"]}],
            },
        }))
        .unwrap();
        assert_eq!(doc.total_lists, Some(2));
        let c = doc.into_corpus();
        assert_eq!(c.chapter_ids(), ["2", "10"]);
    }

    #[test]
    fn test_parse_manifest_and_chapter_document() {
        let manifest: CorpusManifest = serde_json::from_value(json!({
            "totalChapters": 1,
            "version": "1.0",
            "generated": "2024-01-01",
            "chapters": [{"id": "1", "items": 2, "sizeKB": 1.5}],
            "summary": {"totalChapters": 1, "totalItems": 2, "totalSizeKB": "1.5", "averageSizeKB": "1.5"},
        }))
        .unwrap();
        assert_eq!(manifest.chapters[0].size_kb, Some(1.5));

        let chapter: ChapterDocument = serde_json::from_value(json!({
            "items": [{"texts": ["a"], "order": ["texts"]}],
            "metadata": {"id": "1", "version": "1.0", "generated": "x", "totalItems": 1},
        }))
        .unwrap();
        assert_eq!(chapter.items.len(), 1);
        assert_eq!(chapter.metadata.unwrap().total_items, Some(1));
    }
}
