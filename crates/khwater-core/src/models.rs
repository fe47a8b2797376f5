//! Core content model: block types, reading-order descriptions, and items.
//!
//! An [`Item`] is one unit of reading material. Its text lives in typed
//! arrays (`titles`, `subtitles`, `texts`, `ayahs`) plus an optional single
//! `footer`; the order in which those blocks are read is described
//! separately, either by the index-precise `detailedOrder` or by the legacy
//! tag-only `order`.
//!
//! Items are deserialized leniently: unknown order tags, negative or
//! malformed indices and a `null` order are accepted so that a single damaged
//! entry never prevents a chapter from loading. The resolver and the audit pass decide what to do with them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of block types an item can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Titles,
    Subtitles,
    Texts,
    Ayahs,
    Footer,
}

impl ContentType {
    /// Every content type, in declaration order.
    pub const ALL: [ContentType; 5] = [
        ContentType::Titles,
        ContentType::Subtitles,
        ContentType::Texts,
        ContentType::Ayahs,
        ContentType::Footer,
    ];

    /// The tag used for this type in JSON data.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Titles => "titles",
            ContentType::Subtitles => "subtitles",
            ContentType::Texts => "texts",
            ContentType::Ayahs => "ayahs",
            ContentType::Footer => "footer",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the [`ContentType`] tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content type: '{0}'")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownContentType(s.to_string()))
    }
}

/// One tag in an order description, as found in the data.
///
/// Legacy data contains tags outside the closed set (typos, singular forms,
/// stray numbers). Those are preserved as [`OrderTag::Unknown`] instead of
/// failing the whole chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderTag {
    Known(ContentType),
    Unknown(serde_json::Value),
}

impl OrderTag {
    /// The content type, if the tag is recognised.
    pub fn content_type(&self) -> Option<ContentType> {
        match self {
            OrderTag::Known(kind) => Some(*kind),
            OrderTag::Unknown(_) => None,
        }
    }

    /// Classify a raw JSON tag.
    pub fn from_value(value: serde_json::Value) -> Self {
        match serde_json::from_value::<ContentType>(value.clone()) {
            Ok(kind) => OrderTag::Known(kind),
            Err(_) => OrderTag::Unknown(value),
        }
    }
}

impl From<ContentType> for OrderTag {
    fn from(kind: ContentType) -> Self {
        OrderTag::Known(kind)
    }
}

impl fmt::Display for OrderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderTag::Known(kind) => write!(f, "{}", kind),
            OrderTag::Unknown(serde_json::Value::String(s)) => f.write_str(s),
            OrderTag::Unknown(other) => write!(f, "{}", other),
        }
    }
}

/// One position in a `detailedOrder` description.
///
/// Deserialized from any JSON value. An entry that is not an object, lacks
/// `type`, or carries an index that is not an integer still loads; the
/// resolver skips it and the audit reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct OrderEntry {
    /// Which array the block comes from.
    #[serde(rename = "type")]
    pub kind: OrderTag,
    /// Zero-based offset into that array. Ignored for `footer`. `None` when
    /// absent or not an integer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
}

impl OrderEntry {
    pub fn new(kind: ContentType, index: i64) -> Self {
        Self {
            kind: OrderTag::Known(kind),
            index: Some(index),
        }
    }
}

impl From<serde_json::Value> for OrderEntry {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(mut fields) => Self {
                kind: fields
                    .remove("type")
                    .map(OrderTag::from_value)
                    .unwrap_or(OrderTag::Unknown(serde_json::Value::Null)),
                index: fields.get("index").and_then(integer_index),
            },
            other => Self {
                kind: OrderTag::Unknown(other),
                index: None,
            },
        }
    }
}

/// Integers, integral floats (`0.0`) and integer strings (`"0"`) all address
/// an array slot; anything else does not.
fn integer_index(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// The two reading-order representations found in the data.
///
/// The corpus was migrated from the tag-only scheme to the index-precise one
/// chapter by chapter and the migration was never finished, so both must be
/// supported. `Detailed` is authoritative whenever it is present and
/// non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingOrder<'a> {
    /// `(type, index)` pairs, one per rendered block.
    Detailed(&'a [OrderEntry]),
    /// Type tags only; repeated tags consume the arrays left to right.
    Simple(&'a [OrderTag]),
}

impl ReadingOrder<'_> {
    pub fn kind(&self) -> OrderingKind {
        match self {
            ReadingOrder::Detailed(_) => OrderingKind::Detailed,
            ReadingOrder::Simple(_) => OrderingKind::Simple,
        }
    }
}

/// Which ordering representation an item uses, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingKind {
    Detailed,
    Simple,
}

/// One unit of reading content within a chapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ayahs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub order: Vec<OrderTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_order: Option<Vec<OrderEntry>>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<OrderTag>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<OrderTag>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Item {
    /// The values stored for `kind`, or `None` when the field is absent.
    ///
    /// The footer is exposed as a one-element slice so callers can treat
    /// every type uniformly.
    pub fn values(&self, kind: ContentType) -> Option<&[String]> {
        match kind {
            ContentType::Titles => self.titles.as_deref(),
            ContentType::Subtitles => self.subtitles.as_deref(),
            ContentType::Texts => self.texts.as_deref(),
            ContentType::Ayahs => self.ayahs.as_deref(),
            ContentType::Footer => self.footer.as_ref().map(std::slice::from_ref),
        }
    }

    /// Number of values stored for `kind` (0 when absent).
    pub fn count(&self, kind: ContentType) -> usize {
        self.values(kind).map_or(0, <[String]>::len)
    }

    /// The ordering representation in effect for this item.
    pub fn reading_order(&self) -> ReadingOrder<'_> {
        match self.detailed_order.as_deref() {
            Some(entries) if !entries.is_empty() => ReadingOrder::Detailed(entries),
            _ => ReadingOrder::Simple(&self.order),
        }
    }

    /// `true` when the item holds no text of any type.
    pub fn is_empty(&self) -> bool {
        ContentType::ALL.into_iter().all(|kind| self.count(kind) == 0)
    }

    /// First line of the first title, if any.
    pub fn heading(&self) -> Option<&str> {
        self.titles
            .as_deref()
            .and_then(<[String]>::first)
            .and_then(|title| title.lines().next())
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}
