//! Result aggregator: groups ranked hits into per-chapter result sets.

use serde::Serialize;
use std::collections::HashMap;

use crate::corpus::{compare_chapter_ids, Corpus};
use crate::models::Item;
use crate::search::SearchHit;

/// Items of one chapter that matched a query, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterResults<'a> {
    pub chapter_id: &'a str,
    pub items: Vec<&'a Item>,
}

/// Group `hits` by chapter, resolving each hit back to its item.
///
/// Groups are ordered by numeric chapter id. Within a group, items keep the
/// order of `hits` (score-descending when fed from the query engine). Hits
/// whose chapter or item no longer exists are dropped, and a chapter only
/// gets a group if at least one of its hits resolves.
pub fn aggregate<'a>(hits: &[SearchHit], corpus: &'a Corpus) -> Vec<ChapterResults<'a>> {
    let mut groups: Vec<ChapterResults<'a>> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for hit in hits {
        let Some((chapter_id, item)) = lookup(corpus, hit) else {
            continue;
        };
        let position = *positions.entry(chapter_id).or_insert_with(|| {
            groups.push(ChapterResults {
                chapter_id,
                items: Vec::new(),
            });
            groups.len() - 1
        });
        groups[position].items.push(item);
    }

    groups.sort_by(|a, b| compare_chapter_ids(a.chapter_id, b.chapter_id));
    groups
}

fn lookup<'a>(corpus: &'a Corpus, hit: &SearchHit) -> Option<(&'a str, &'a Item)> {
    let (chapter_id, items) = corpus.get_key_value(&hit.chapter_id)?;
    Some((chapter_id, items.get(hit.item_index)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn item(text: &str) -> Item {
        Item {
            texts: Some(vec![text.to_string()]),
            ..Default::default()
        }
    }

    fn hit(chapter: &str, index: usize, score: f64) -> SearchHit {
        SearchHit {
            chapter_id: chapter.to_string(),
            item_index: index,
            matched_terms: BTreeSet::new(),
            score,
        }
    }

    fn corpus() -> Corpus {
        [
            ("1", vec![item("1a"), item("1b")]),
            ("2", vec![item("2a")]),
            ("10", vec![item("10a"), item("10b"), item("10c")]),
        ]
        .into_iter()
        .map(|(id, items)| (id.to_string(), items))
        .collect()
    }

    #[test]
    fn test_groups_sorted_numerically() {
        let c = corpus();
        let hits = vec![hit("2", 0, 5.0), hit("10", 0, 4.0), hit("1", 0, 3.0)];
        let ids: Vec<&str> = aggregate(&hits, &c).iter().map(|g| g.chapter_id).collect();
        assert_eq!(ids, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_items_keep_hit_order_within_chapter() {
        let c = corpus();
        let hits = vec![hit("10", 2, 9.0), hit("1", 1, 8.0), hit("10", 0, 7.0)];
        let groups = aggregate(&hits, &c);
        let tens: Vec<&str> = groups[1]
            .items
            .iter()
            .map(|i| i.texts.as_deref().unwrap()[0].as_str())
            .collect();
        assert_eq!(tens, vec!["10c", "10a"]);
    }

    #[test]
    fn test_stale_hits_are_dropped() {
        let c = corpus();
        let hits = vec![hit("2", 5, 9.0), hit("99", 0, 8.0), hit("1", 0, 1.0)];
        let groups = aggregate(&hits, &c);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].chapter_id, "1");
        assert_eq!(groups[0].items, vec![&c.get("1").unwrap()[0]]);
    }

    #[test]
    fn test_no_hits_no_groups() {
        assert!(aggregate(&[], &corpus()).is_empty());
    }
}
