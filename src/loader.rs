//! Filesystem corpus source.
//!
//! Reads either layout produced by the data export:
//!
//! - a single JSON file holding every chapter under `lists`;
//! - a directory with an `index.json` manifest plus one `<id>.json` per
//!   chapter.
//!
//! A directory without `index.json` is scanned for `*.json` files instead,
//! using each file stem as the chapter id.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use khwater_core::corpus::{ChapterDocument, Corpus, CorpusDocument, CorpusManifest};
use khwater_core::models::Item;
use khwater_core::source::CorpusSource;

const MANIFEST_FILE: &str = "index.json";

/// Loads the corpus from a file or directory on every call.
#[derive(Debug, Clone)]
pub struct FsSource {
    path: PathBuf,
}

impl FsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusSource for FsSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Corpus> {
        let meta = tokio::fs::metadata(&self.path)
            .await
            .with_context(|| format!("Corpus path not found: {}", self.path.display()))?;

        let corpus = if meta.is_dir() {
            load_directory(&self.path).await?
        } else {
            load_document(&self.path).await?
        };

        tracing::info!(
            path = %self.path.display(),
            chapters = corpus.len(),
            items = corpus.item_count(),
            "corpus loaded"
        );
        Ok(corpus)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn load_document(path: &Path) -> Result<Corpus> {
    let doc: CorpusDocument = read_json(path).await?;
    if let Some(expected) = doc.total_lists {
        if expected != doc.lists.len() {
            tracing::warn!(
                path = %path.display(),
                expected,
                found = doc.lists.len(),
                "totalLists does not match the number of chapters"
            );
        }
    }
    Ok(doc.into_corpus())
}

async fn load_directory(dir: &Path) -> Result<Corpus> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !tokio::fs::try_exists(&manifest_path).await.unwrap_or(false) {
        tracing::warn!(
            dir = %dir.display(),
            "no {} found, scanning for chapter files",
            MANIFEST_FILE
        );
        return scan_directory(dir).await;
    }

    let manifest: CorpusManifest = read_json(&manifest_path).await?;
    let mut chapters: HashMap<String, Vec<Item>> = HashMap::with_capacity(manifest.chapters.len());

    for entry in &manifest.chapters {
        let chapter_path = dir.join(format!("{}.json", entry.id));
        let doc: ChapterDocument = read_json(&chapter_path)
            .await
            .with_context(|| format!("Chapter {} is listed in {} but unreadable", entry.id, MANIFEST_FILE))?;
        if let Some(expected) = entry.items {
            if expected != doc.items.len() {
                tracing::warn!(
                    chapter = %entry.id,
                    expected,
                    found = doc.items.len(),
                    "manifest item count does not match chapter file"
                );
            }
        }
        chapters.insert(entry.id.clone(), doc.items);
    }

    Ok(Corpus::new(chapters))
}

async fn scan_directory(dir: &Path) -> Result<Corpus> {
    let mut chapters: HashMap<String, Vec<Item>> = HashMap::new();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let doc: ChapterDocument = read_json(&path).await?;
        chapters.insert(id.to_string(), doc.items);
    }

    Ok(Corpus::new(chapters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(path: &Path, value: serde_json::Value) {
        std::fs::write(path, serde_json::to_vec(&value).unwrap()).unwrap();
    }

    fn chapter(text: &str) -> serde_json::Value {
        json!({"items": [{"texts": [text], "order": ["texts"]}]})
    }

    #[tokio::test]
    async fn test_loads_single_document() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("khwater-data.json");
        write(
            &file,
            json!({"version": "1", "totalLists": 2, "lists": {
                "10": [{"texts": ["x"], "order": ["texts"]}],
                "2": [],
            }}),
        );
        let corpus = FsSource::new(&file).load().await.unwrap();
        assert_eq!(corpus.chapter_ids(), ["2", "10"]);
        assert_eq!(corpus.item_count(), 1);
    }

    #[tokio::test]
    async fn test_loads_split_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("index.json"),
            json!({"totalChapters": 2, "chapters": [
                {"id": "1", "items": 1, "sizeKB": 0.1},
                {"id": "2", "items": 1},
            ]}),
        );
        write(&dir.path().join("1.json"), chapter("one"));
        write(&dir.path().join("2.json"), chapter("two"));
        // Not listed in the manifest, so ignored.
        write(&dir.path().join("3.json"), chapter("three"));

        let corpus = FsSource::new(dir.path()).load().await.unwrap();
        assert_eq!(corpus.chapter_ids(), ["1", "2"]);
    }

    #[tokio::test]
    async fn test_missing_listed_chapter_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("index.json"),
            json!({"chapters": [{"id": "1"}, {"id": "2"}]}),
        );
        write(&dir.path().join("1.json"), chapter("one"));

        let err = FsSource::new(dir.path()).load().await.unwrap_err();
        assert!(format!("{:#}", err).contains("Chapter 2"));
    }

    #[tokio::test]
    async fn test_scans_directory_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("7.json"), chapter("seven"));
        write(&dir.path().join("12.json"), chapter("twelve"));
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let corpus = FsSource::new(dir.path()).load().await.unwrap();
        assert_eq!(corpus.chapter_ids(), ["7", "12"]);
    }

    #[tokio::test]
    async fn test_missing_path_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsSource::new(dir.path().join("nope")).load().await.is_err());

        let file = dir.path().join("broken.json");
        std::fs::write(&file, "{not json").unwrap();
        let err = FsSource::new(&file).load().await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }
}
