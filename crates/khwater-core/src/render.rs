//! Order resolver: turns an item's reading-order description into blocks.
//!
//! [`resolve`] is the only entry point. It is a pure function of the item
//! and never fails: references that cannot be satisfied (unknown tags,
//! negative or out-of-range indices, absent arrays) are skipped and the rest
//! of the item is still rendered.
//!
//! # Detailed order
//!
//! Each `(type, index)` entry yields exactly one [`BlockValue::Text`] block
//! holding `item[type][index]`. `footer` entries ignore the index.
//!
//! # Simple order
//!
//! Legacy items only carry type tags, so the resolver reconstructs blocks
//! per tag:
//!
//! - `titles` / `subtitles`: the first tag emits every value of the array
//!   joined with a space; later tags of the same type emit nothing.
//! - `texts` / `ayahs`: every tag emits the whole array as one
//!   [`BlockValue::Paragraphs`] block.
//! - `footer`: emits the footer.
//!
//! Tags whose array is absent or empty emit nothing.

use serde::Serialize;
use std::borrow::Cow;

use crate::models::{ContentType, Item, OrderEntry, OrderTag, ReadingOrder};

/// Payload of one rendered block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BlockValue<'a> {
    /// A single string.
    Text(Cow<'a, str>),
    /// An ordered run of strings; presentation renders each as a paragraph.
    Paragraphs(&'a [String]),
}

impl BlockValue<'_> {
    /// The block's strings, in order.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            BlockValue::Text(text) => vec![text.as_ref()],
            BlockValue::Paragraphs(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// One element of an item's rendered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderBlock<'a> {
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub value: BlockValue<'a>,
}

impl<'a> RenderBlock<'a> {
    fn text(kind: ContentType, value: impl Into<Cow<'a, str>>) -> Self {
        Self {
            kind,
            value: BlockValue::Text(value.into()),
        }
    }

    fn paragraphs(kind: ContentType, values: &'a [String]) -> Self {
        Self {
            kind,
            value: BlockValue::Paragraphs(values),
        }
    }
}

/// Resolve an item into its blocks in original reading order.
pub fn resolve(item: &Item) -> Vec<RenderBlock<'_>> {
    match item.reading_order() {
        ReadingOrder::Detailed(entries) => resolve_detailed(item, entries),
        ReadingOrder::Simple(tags) => resolve_simple(item, tags),
    }
}

fn resolve_detailed<'a>(item: &'a Item, entries: &'a [OrderEntry]) -> Vec<RenderBlock<'a>> {
    entries
        .iter()
        .filter_map(|entry| {
            let kind = entry.kind.content_type()?;
            let value = match kind {
                ContentType::Footer => item.footer.as_deref()?,
                ContentType::Titles
                | ContentType::Subtitles
                | ContentType::Texts
                | ContentType::Ayahs => {
                    let index = usize::try_from(entry.index?).ok()?;
                    item.values(kind)?.get(index)?.as_str()
                }
            };
            Some(RenderBlock::text(kind, value))
        })
        .collect()
}

fn resolve_simple<'a>(item: &'a Item, tags: &'a [OrderTag]) -> Vec<RenderBlock<'a>> {
    let mut blocks = Vec::new();
    let mut titles_seen = false;
    let mut subtitles_seen = false;

    for kind in tags.iter().filter_map(OrderTag::content_type) {
        match kind {
            ContentType::Titles | ContentType::Subtitles => {
                let seen = if kind == ContentType::Titles {
                    &mut titles_seen
                } else {
                    &mut subtitles_seen
                };
                if std::mem::replace(seen, true) {
                    continue;
                }
                if let Some(values) = non_empty(item.values(kind)) {
                    blocks.push(RenderBlock::text(kind, join_values(values)));
                }
            }
            ContentType::Texts | ContentType::Ayahs => {
                if let Some(values) = non_empty(item.values(kind)) {
                    blocks.push(RenderBlock::paragraphs(kind, values));
                }
            }
            ContentType::Footer => {
                if let Some(footer) = item.footer.as_deref() {
                    blocks.push(RenderBlock::text(kind, footer));
                }
            }
        }
    }

    blocks
}

fn non_empty(values: Option<&[String]>) -> Option<&[String]> {
    values.filter(|v| !v.is_empty())
}

fn join_values(values: &[String]) -> Cow<'_, str> {
    match values {
        [single] => Cow::Borrowed(single.as_str()),
        _ => Cow::Owned(values.join(" ")),
    }
}
