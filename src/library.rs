//! Process-wide corpus service.
//!
//! A [`Library`] owns the corpus source and a lazily built [`Snapshot`]:
//! the loaded [`Corpus`] together with its search index. The first caller
//! to need the snapshot triggers the load; concurrent first callers wait on
//! the same in-flight build instead of starting their own. A failed load is
//! not cached, so the next caller retries.
//!
//! [`Library::rebuild`] loads a fresh snapshot and swaps it in whole.
//! Readers holding the previous `Arc<Snapshot>` keep a consistent view
//! until they drop it.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, OnceCell};

use khwater_core::aggregate::{aggregate, ChapterResults};
use khwater_core::corpus::{ChapterSummary, Corpus, CorpusError};
use khwater_core::index::{build_index, SearchIndexEntry};
use khwater_core::models::Item;
use khwater_core::render::{resolve, RenderBlock};
use khwater_core::search::{search_index_with, tokenize, ScoreWeights};
use khwater_core::source::CorpusSource;

use crate::config::Config;
use crate::loader::FsSource;

/// An immutable corpus plus the search index derived from it.
#[derive(Debug)]
pub struct Snapshot {
    corpus: Corpus,
    index: Vec<SearchIndexEntry>,
}

/// Size figures for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    pub chapters: usize,
    pub items: usize,
    /// Items with searchable text.
    pub indexed_items: usize,
}

/// Ranked, chapter-grouped results for one query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse<'a> {
    pub query: &'a str,
    /// Normalized query terms, for client-side highlighting.
    pub terms: Vec<String>,
    pub total_items: usize,
    pub results: Vec<ChapterResults<'a>>,
}

/// One chapter's items rendered in reading order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterView<'a> {
    #[serde(flatten)]
    pub summary: ChapterSummary,
    pub items: Vec<ItemView<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemView<'a> {
    pub index: usize,
    pub blocks: Vec<RenderBlock<'a>>,
}

impl Snapshot {
    pub fn build(corpus: Corpus) -> Self {
        let index = build_index(&corpus);
        let stats = SnapshotStats {
            chapters: corpus.len(),
            items: corpus.item_count(),
            indexed_items: index.len(),
        };
        tracing::info!(
            entries = stats.indexed_items,
            excluded = stats.items - stats.indexed_items,
            "search index built"
        );
        Self { corpus, index }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index(&self) -> &[SearchIndexEntry] {
        &self.index
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            chapters: self.corpus.len(),
            items: self.corpus.item_count(),
            indexed_items: self.index.len(),
        }
    }

    /// Rank the index against `query` and group hits by chapter.
    pub fn search<'a>(&'a self, query: &'a str, weights: &ScoreWeights) -> SearchResponse<'a> {
        let hits = search_index_with(&self.index, query, weights);
        let results = aggregate(&hits, &self.corpus);
        SearchResponse {
            query,
            terms: tokenize(query),
            total_items: results.iter().map(|group| group.items.len()).sum(),
            results,
        }
    }

    /// Every item of chapter `id`, resolved into display blocks.
    pub fn chapter_view(&self, id: &str) -> Result<ChapterView<'_>, CorpusError> {
        let items = self.corpus.chapter(id)?;
        Ok(ChapterView {
            summary: ChapterSummary::new(id, items),
            items: items
                .iter()
                .enumerate()
                .map(|(index, item)| ItemView {
                    index,
                    blocks: resolve(item),
                })
                .collect(),
        })
    }

    /// Display blocks of a single item.
    pub fn item_blocks(&self, id: &str, index: usize) -> Result<Vec<RenderBlock<'_>>, CorpusError> {
        Ok(resolve(self.corpus.item(id, index)?))
    }
}

/// Owned chapter group returned by [`Library::search_chapters`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterMatches {
    pub chapter_id: String,
    pub items: Vec<Item>,
}

type SnapshotCell = Arc<OnceCell<Arc<Snapshot>>>;

/// Shared corpus service with a build-once snapshot cache.
pub struct Library {
    source: Arc<dyn CorpusSource>,
    weights: ScoreWeights,
    current: RwLock<SnapshotCell>,
    rebuild_lock: Mutex<()>,
}

impl Library {
    pub fn new(source: Arc<dyn CorpusSource>, weights: ScoreWeights) -> Self {
        Self {
            source,
            weights,
            current: RwLock::new(Arc::new(OnceCell::new())),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// A library reading `[data].path` with the configured weights.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(FsSource::new(&config.data.path)),
            config.search.weights(),
        )
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// The current snapshot, loading it on first use.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>> {
        let cell: SnapshotCell = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let snapshot = cell.get_or_try_init(|| self.load()).await?;
        Ok(Arc::clone(snapshot))
    }

    /// Reload from the source and atomically replace the cached snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn rebuild(&self) -> Result<SnapshotStats> {
        let _guard = self.rebuild_lock.lock().await;
        let snapshot = self.load().await?;
        let stats = snapshot.stats();

        let cell = Arc::new(OnceCell::new_with(Some(snapshot)));
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = cell;

        tracing::info!(
            chapters = stats.chapters,
            items = stats.items,
            indexed = stats.indexed_items,
            "snapshot rebuilt"
        );
        Ok(stats)
    }

    /// Chapter listing in numeric order.
    pub async fn chapters(&self) -> Result<Vec<ChapterSummary>> {
        Ok(self.snapshot().await?.corpus().summaries())
    }

    /// Search and group by chapter, returning owned items.
    pub async fn search_chapters(&self, query: &str) -> Result<Vec<ChapterMatches>> {
        let snapshot = self.snapshot().await?;
        let response = snapshot.search(query, &self.weights);
        Ok(response
            .results
            .into_iter()
            .map(|group| ChapterMatches {
                chapter_id: group.chapter_id.to_string(),
                items: group.items.into_iter().cloned().collect(),
            })
            .collect())
    }

    async fn load(&self) -> Result<Arc<Snapshot>> {
        let corpus = self
            .source
            .load()
            .await
            .with_context(|| format!("Failed to load corpus from {}", self.source.describe()))?;
        Ok(Arc::new(Snapshot::build(corpus)))
    }
}
