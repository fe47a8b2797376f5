//! Corpus source abstraction.
//!
//! The [`CorpusSource`] trait is the single seam between the search
//! pipeline and wherever chapter data lives (a JSON file, a split
//! directory, an in-memory fixture). Callers load once and build the
//! index from the returned [`Corpus`].
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::corpus::Corpus;

/// Abstract provider of the full chapter corpus.
///
/// All operations are async (via `async-trait`) so that filesystem and
/// network-backed sources can share one interface with in-memory ones.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`describe`](CorpusSource::describe) | Human-readable origin, for logs |
/// | [`load`](CorpusSource::load) | Read every chapter into a [`Corpus`] |
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// Where the corpus comes from, e.g. a path.
    fn describe(&self) -> String;

    /// Load the complete corpus.
    ///
    /// Each call reads the source afresh; caching is the caller's concern.
    async fn load(&self) -> Result<Corpus>;
}
