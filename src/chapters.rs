//! Chapter listing and rendering for the CLI.

use anyhow::Result;
use std::borrow::Cow;

use khwater_core::corpus::ChapterSummary;
use khwater_core::highlight::Highlighter;
use khwater_core::models::Item;
use khwater_core::render::resolve;

use crate::config::Config;
use crate::library::Library;

/// `khwater chapters`: one line per chapter, in numeric order.
pub async fn run_chapters(config: &Config) -> Result<()> {
    let library = Library::from_config(config);
    let summaries = library.chapters().await?;

    if summaries.is_empty() {
        println!("No chapters.");
        return Ok(());
    }

    for summary in &summaries {
        print_summary(summary);
    }
    println!();
    println!(
        "{} chapters, {} items",
        summaries.len(),
        summaries.iter().map(|s| s.item_count).sum::<usize>()
    );
    Ok(())
}

/// `khwater chapter <id>`: every item of one chapter in reading order.
pub async fn run_chapter(config: &Config, id: &str) -> Result<()> {
    let library = Library::from_config(config);
    let snapshot = library.snapshot().await?;
    let items = snapshot.corpus().chapter(id)?;

    print_summary(&ChapterSummary::new(id, items));
    for (index, item) in items.iter().enumerate() {
        println!();
        println!("  [{}]", index);
        print_item(item, None);
    }
    Ok(())
}

fn print_summary(summary: &ChapterSummary) {
    println!(
        "{:>4}  {:>4} items  {}",
        summary.id, summary.item_count, summary.chapter_title
    );
}

/// Print an item's resolved blocks, one labelled line per value.
pub(crate) fn print_item(item: &Item, highlighter: Option<&Highlighter>) {
    for block in resolve(item) {
        for line in block.value.lines() {
            let line = match highlighter {
                Some(h) => h.apply(line),
                None => Cow::Borrowed(line),
            };
            println!("    {:<9} {}", block.kind.as_str(), line);
        }
    }
}
