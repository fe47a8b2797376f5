//! Search index builder.
//!
//! Flattens every item of a [`Corpus`] into one [`SearchIndexEntry`] holding
//! a lower-cased text blob for containment matching, plus the separate
//! `titles`, `texts` and `ayahs` fields used for field-weighted scoring.
//!
//! The blob concatenates, in this order, `titles`, `texts`, `ayahs` and
//! `subtitles`, each array joined with a single space. Blank elements are
//! dropped and absent or empty arrays contribute nothing. Items whose blob is empty after trimming are
//! left out of the index entirely; footers are never indexed.

use serde::Serialize;

use crate::corpus::Corpus;
use crate::models::{ContentType, Item};

/// Fields concatenated into [`SearchIndexEntry::content`], in order.
const CONTENT_FIELDS: [ContentType; 4] = [
    ContentType::Titles,
    ContentType::Texts,
    ContentType::Ayahs,
    ContentType::Subtitles,
];

/// One searchable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndexEntry {
    pub chapter_id: String,
    /// Position of the item within its chapter.
    pub item_index: usize,
    /// Lower-cased concatenation of all searchable fields.
    pub content: String,
    pub titles: String,
    pub texts: String,
    pub ayahs: String,
}

/// Build the index for every chapter, in numeric chapter order.
pub fn build_index(corpus: &Corpus) -> Vec<SearchIndexEntry> {
    corpus
        .chapters()
        .flat_map(|(chapter_id, items)| {
            items
                .iter()
                .enumerate()
                .filter_map(move |(item_index, item)| index_item(chapter_id, item_index, item))
        })
        .collect()
}

/// Index a single item, or `None` if it has no searchable text.
pub fn index_item(chapter_id: &str, item_index: usize, item: &Item) -> Option<SearchIndexEntry> {
    let content = CONTENT_FIELDS
        .into_iter()
        .map(|kind| joined(item, kind))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .trim()
        .to_string();

    if content.is_empty() {
        return None;
    }

    Some(SearchIndexEntry {
        chapter_id: chapter_id.to_string(),
        item_index,
        content,
        titles: joined(item, ContentType::Titles).to_lowercase(),
        texts: joined(item, ContentType::Texts).to_lowercase(),
        ayahs: joined(item, ContentType::Ayahs).to_lowercase(),
    })
}

fn joined(item: &Item, kind: ContentType) -> String {
    item.values(kind)
        .map(|values| {
            values
                .iter()
                .map(String::as_str)
                .filter(|value| !value.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}
