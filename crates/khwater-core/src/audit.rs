//! Ordering diagnostics for legacy data.
//!
//! The resolver silently skips anything it cannot render. This module
//! reports those same conditions so that data repairs can be targeted:
//! unknown tags, missing, negative or out-of-range indices, references to absent
//! fields, simple-order tag counts exceeding the values available, and
//! values that no order entry ever reaches.
//!
//! It also tracks how far the migration from the simple to the detailed
//! ordering scheme has progressed.

use serde::Serialize;
use std::fmt;

use crate::corpus::Corpus;
use crate::index::index_item;
use crate::models::{ContentType, Item, OrderEntry, OrderTag, OrderingKind, ReadingOrder};

/// A single ordering defect in one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum OrderIssue {
    /// An order entry whose tag is not a known content type.
    UnknownTag { position: usize, tag: String },
    /// A detailed entry whose index is absent or not an integer.
    InvalidIndex { position: usize, kind: ContentType },
    /// A detailed entry with a negative index.
    NegativeIndex {
        position: usize,
        kind: ContentType,
        index: i64,
    },
    /// A detailed entry pointing past the end of its array.
    OutOfRange {
        position: usize,
        kind: ContentType,
        index: i64,
        len: usize,
    },
    /// An entry for a field that is absent or empty.
    MissingField { position: usize, kind: ContentType },
    /// A simple order with more tags of `kind` than values.
    SurplusTags {
        kind: ContentType,
        tags: usize,
        values: usize,
    },
    /// A value that no order entry renders.
    Unreferenced { kind: ContentType, index: usize },
}

impl fmt::Display for OrderIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderIssue::UnknownTag { position, tag } => {
                write!(f, "#{}: unknown tag '{}'", position, tag)
            }
            OrderIssue::InvalidIndex { position, kind } => {
                write!(f, "#{}: {} has no valid index", position, kind)
            }
            OrderIssue::NegativeIndex {
                position,
                kind,
                index,
            } => write!(f, "#{}: {}[{}] has a negative index", position, kind, index),
            OrderIssue::OutOfRange {
                position,
                kind,
                index,
                len,
            } => write!(
                f,
                "#{}: {}[{}] is out of range ({} values)",
                position, kind, index, len
            ),
            OrderIssue::MissingField { position, kind } => {
                write!(f, "#{}: {} is absent or empty", position, kind)
            }
            OrderIssue::SurplusTags { kind, tags, values } => write!(
                f,
                "{} tagged {} times but only {} values exist",
                kind, tags, values
            ),
            OrderIssue::Unreferenced { kind, index } => {
                write!(f, "{}[{}] is never rendered", kind, index)
            }
        }
    }
}

/// Diagnose one item.
pub fn audit_item(item: &Item) -> Vec<OrderIssue> {
    match item.reading_order() {
        ReadingOrder::Detailed(entries) => audit_detailed(item, entries),
        ReadingOrder::Simple(tags) => audit_simple(item, tags),
    }
}

fn audit_detailed(item: &Item, entries: &[OrderEntry]) -> Vec<OrderIssue> {
    let mut issues = Vec::new();
    let mut referenced: Vec<Vec<bool>> = ContentType::ALL
        .into_iter()
        .map(|kind| vec![false; item.count(kind)])
        .collect();

    for (position, entry) in entries.iter().enumerate() {
        let Some(kind) = entry.kind.content_type() else {
            issues.push(unknown_tag(position, &entry.kind));
            continue;
        };
        let len = item.count(kind);
        if len == 0 {
            issues.push(OrderIssue::MissingField { position, kind });
            continue;
        }
        let slot = match (kind, entry.index) {
            (ContentType::Footer, _) => 0,
            (_, None) => {
                issues.push(OrderIssue::InvalidIndex { position, kind });
                continue;
            }
            (_, Some(index)) if index < 0 => {
                issues.push(OrderIssue::NegativeIndex {
                    position,
                    kind,
                    index,
                });
                continue;
            }
            (_, Some(index)) => match usize::try_from(index) {
                Ok(slot) if slot < len => slot,
                _ => {
                    issues.push(OrderIssue::OutOfRange {
                        position,
                        kind,
                        index,
                        len,
                    });
                    continue;
                }
            },
        };
        referenced[slot_of(kind)][slot] = true;
    }

    for kind in ContentType::ALL {
        for (index, seen) in referenced[slot_of(kind)].iter().enumerate() {
            if !seen {
                issues.push(OrderIssue::Unreferenced { kind, index });
            }
        }
    }

    issues
}

fn audit_simple(item: &Item, tags: &[OrderTag]) -> Vec<OrderIssue> {
    let mut issues = Vec::new();
    let mut tag_counts = [0usize; ContentType::ALL.len()];

    for (position, tag) in tags.iter().enumerate() {
        let Some(kind) = tag.content_type() else {
            issues.push(unknown_tag(position, tag));
            continue;
        };
        tag_counts[slot_of(kind)] += 1;
        if item.count(kind) == 0 {
            issues.push(OrderIssue::MissingField { position, kind });
        }
    }

    for kind in ContentType::ALL {
        let tags = tag_counts[slot_of(kind)];
        let values = item.count(kind);
        if values > 0 && tags > values {
            issues.push(OrderIssue::SurplusTags { kind, tags, values });
        }
        if tags == 0 {
            issues.extend((0..values).map(|index| OrderIssue::Unreferenced { kind, index }));
        }
    }

    issues
}

fn unknown_tag(position: usize, tag: &OrderTag) -> OrderIssue {
    OrderIssue::UnknownTag {
        position,
        tag: tag.to_string(),
    }
}

fn slot_of(kind: ContentType) -> usize {
    match kind {
        ContentType::Titles => 0,
        ContentType::Subtitles => 1,
        ContentType::Texts => 2,
        ContentType::Ayahs => 3,
        ContentType::Footer => 4,
    }
}

/// Diagnostics for one item that has at least one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAudit {
    pub chapter_id: String,
    pub item_index: usize,
    pub ordering: OrderingKind,
    pub issues: Vec<OrderIssue>,
}

/// Corpus-wide ordering and searchability summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub chapters: usize,
    pub items: usize,
    pub detailed_items: usize,
    pub simple_items: usize,
    /// Items that produce a search index entry.
    pub searchable_items: usize,
    pub findings: Vec<ItemAudit>,
}

impl AuditReport {
    /// Share of items on the detailed ordering scheme, in percent.
    pub fn migration_coverage(&self) -> f64 {
        if self.items == 0 {
            return 100.0;
        }
        self.detailed_items as f64 * 100.0 / self.items as f64
    }

    /// Total number of issues across all items.
    pub fn issue_count(&self) -> usize {
        self.findings.iter().map(|f| f.issues.len()).sum()
    }
}

/// Audit every item of `corpus`, in numeric chapter order.
pub fn audit_corpus(corpus: &Corpus) -> AuditReport {
    let mut report = AuditReport {
        chapters: corpus.len(),
        ..Default::default()
    };

    for (chapter_id, items) in corpus.chapters() {
        for (item_index, item) in items.iter().enumerate() {
            report.items += 1;
            let ordering = item.reading_order().kind();
            match ordering {
                OrderingKind::Detailed => report.detailed_items += 1,
                OrderingKind::Simple => report.simple_items += 1,
            }
            if index_item(chapter_id, item_index, item).is_some() {
                report.searchable_items += 1;
            }
            let issues = audit_item(item);
            if !issues.is_empty() {
                report.findings.push(ItemAudit {
                    chapter_id: chapter_id.to_string(),
                    item_index,
                    ordering,
                    issues,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_clean_detailed_item_has_no_issues() {
        let it = item(json!({
            "titles": ["t"],
            "texts": ["a", "b"],
            "footer": "f",
            "detailedOrder": [
                {"type": "titles", "index": 0},
                {"type": "texts", "index": 1},
                {"type": "texts", "index": 0},
                {"type": "footer", "index": 0},
            ],
        }));
        assert!(audit_item(&it).is_empty());
    }

    #[test]
    fn test_detailed_defects() {
        let it = item(json!({
            "texts": ["a", "b"],
            "detailedOrder": [
                {"type": "texts", "index": 5},
                {"type": "verse", "index": 0},
                {"type": "texts", "index": -2},
                {"type": "ayahs", "index": 0},
                {"type": "texts", "index": 0},
            ],
        }));
        assert_eq!(
            audit_item(&it),
            vec![
                OrderIssue::OutOfRange {
                    position: 0,
                    kind: ContentType::Texts,
                    index: 5,
                    len: 2
                },
                OrderIssue::UnknownTag {
                    position: 1,
                    tag: "verse".into()
                },
                OrderIssue::NegativeIndex {
                    position: 2,
                    kind: ContentType::Texts,
                    index: -2
                },
                OrderIssue::MissingField {
                    position: 3,
                    kind: ContentType::Ayahs
                },
                OrderIssue::Unreferenced {
                    kind: ContentType::Texts,
                    index: 1
                },
            ]
        );
    }

    #[test]
    fn test_malformed_indices_are_reported() {
        let it = item(json!({
            "texts": ["a", "b"],
            "detailedOrder": [
                {"index": 0},
                {"type": "texts", "index": null},
                {"type": "texts", "index": "x"},
                {"type": "texts", "index": "1"},
                {"type": "texts", "index": 0.0},
            ],
        }));
        assert_eq!(
            audit_item(&it),
            vec![
                OrderIssue::UnknownTag {
                    position: 0,
                    tag: "null".into()
                },
                OrderIssue::InvalidIndex {
                    position: 1,
                    kind: ContentType::Texts
                },
                OrderIssue::InvalidIndex {
                    position: 2,
                    kind: ContentType::Texts
                },
            ]
        );
        assert_eq!(
            audit_item(&it)[1].to_string(),
            "#1: texts has no valid index"
        );
    }

    #[test]
    fn test_simple_surplus_and_unreferenced() {
        let it = item(json!({
            "texts": ["a"],
            "ayahs": ["q"],
            "order": ["texts", "texts", "texts"],
        }));
        assert_eq!(
            audit_item(&it),
            vec![
                OrderIssue::SurplusTags {
                    kind: ContentType::Texts,
                    tags: 3,
                    values: 1
                },
                OrderIssue::Unreferenced {
                    kind: ContentType::Ayahs,
                    index: 0
                },
            ]
        );
    }

    #[test]
    fn test_issue_display() {
        let issue = OrderIssue::OutOfRange {
            position: 2,
            kind: ContentType::Texts,
            index: 5,
            len: 2,
        };
        assert_eq!(issue.to_string(), "#2: texts[5] is out of range (2 values)");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["issue"], "out_of_range");
    }

    #[test]
    fn test_corpus_report() {
        let lists: std::collections::HashMap<String, Vec<Item>> = serde_json::from_value(json!({
            "1": [
                {"texts": ["a"], "detailedOrder": [{"type": "texts", "index": 0}]},
                {"texts": ["b"], "order": ["texts"]},
            ],
            "2": [
                {"order": []},
                {"texts": ["c"], "detailedOrder": [{"type": "texts", "index": 3}]},
            ],
        }))
        .unwrap();
        let report = audit_corpus(&Corpus::new(lists));

        assert_eq!(report.chapters, 2);
        assert_eq!(report.items, 4);
        assert_eq!(report.detailed_items, 2);
        assert_eq!(report.simple_items, 2);
        assert_eq!(report.searchable_items, 3);
        assert!((report.migration_coverage() - 50.0).abs() < 1e-9);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].chapter_id, "2");
        assert_eq!(report.findings[0].item_index, 1);
        // out of range + the never-rendered value it was meant to reach
        assert_eq!(report.issue_count(), 2);
    }

    #[test]
    fn test_empty_corpus_is_fully_migrated() {
        let report = audit_corpus(&Corpus::default());
        assert_eq!(report.items, 0);
        assert!((report.migration_coverage() - 100.0).abs() < 1e-9);
    }
}
