//! `khwater search`: run a query against the corpus and print grouped results.

use anyhow::Result;

use khwater_core::highlight::Highlighter;

use crate::chapters::print_item;
use crate::config::Config;
use crate::library::Library;

/// Search and print results grouped by chapter.
///
/// With `json`, prints the same response body the HTTP API returns.
/// With `highlight`, wraps matched terms in `<mark>` tags.
pub async fn run_search(config: &Config, query: &str, highlight: bool, json: bool) -> Result<()> {
    let library = Library::from_config(config);
    let snapshot = library.snapshot().await?;
    let response = snapshot.search(query, library.weights());

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let highlighter = if highlight {
        Some(Highlighter::new(response.terms.as_slice())?)
    } else {
        None
    };

    println!(
        "{} items in {} chapters",
        response.total_items,
        response.results.len()
    );
    for group in &response.results {
        println!();
        println!("Chapter {} ({} items)", group.chapter_id, group.items.len());
        for item in &group.items {
            println!("  --");
            print_item(item, highlighter.as_ref());
        }
    }

    Ok(())
}
