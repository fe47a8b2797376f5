//! In-memory [`CorpusSource`] for tests and embedded data.
//!
//! Holds a [`Corpus`] behind `std::sync::RwLock`; [`replace`](InMemorySource::replace)
//! swaps the data so that a subsequent rebuild picks it up.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::corpus::Corpus;

use super::CorpusSource;

/// In-memory source returning a clone of its corpus on every load.
#[derive(Debug, Default)]
pub struct InMemorySource {
    corpus: RwLock<Corpus>,
}

impl InMemorySource {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus: RwLock::new(corpus),
        }
    }

    /// Replace the held corpus.
    pub fn replace(&self, corpus: Corpus) -> Result<()> {
        let mut guard = self
            .corpus
            .write()
            .map_err(|_| anyhow!("in-memory corpus lock poisoned"))?;
        *guard = corpus;
        Ok(())
    }
}

#[async_trait]
impl CorpusSource for InMemorySource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn load(&self) -> Result<Corpus> {
        let guard = self
            .corpus
            .read()
            .map_err(|_| anyhow!("in-memory corpus lock poisoned"))?;
        Ok(guard.clone())
    }
}
