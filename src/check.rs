//! Corpus health check.
//!
//! Summarizes the loaded corpus (chapter, item, and searchable item counts),
//! reports how many items use the detailed ordering scheme, and lists every
//! ordering defect the resolver would silently skip. Used by `khwater check`
//! after a data deploy.

use anyhow::{bail, Result};

use khwater_core::audit::{audit_corpus, AuditReport};

use crate::config::Config;
use crate::library::Library;

/// Run the audit and print a summary.
///
/// With `strict`, any ordering issue turns into an error so that the command
/// exits non-zero.
pub async fn run_check(config: &Config, json: bool, strict: bool) -> Result<()> {
    let library = Library::from_config(config);
    let snapshot = library.snapshot().await?;
    let report = audit_corpus(snapshot.corpus());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&library.source_description(), &report);
    }

    let issues = report.issue_count();
    if strict && issues > 0 {
        bail!(
            "{} ordering issues in {} items",
            issues,
            report.findings.len()
        );
    }
    Ok(())
}

fn print_report(source: &str, report: &AuditReport) {
    println!("Khwater corpus check");
    println!("====================");
    println!();
    println!("  Source:      {}", source);
    println!("  Chapters:    {}", report.chapters);
    println!("  Items:       {}", report.items);
    println!(
        "  Searchable:  {} / {}",
        report.searchable_items, report.items
    );
    println!(
        "  Ordering:    {} detailed, {} simple ({:.1}% migrated)",
        report.detailed_items,
        report.simple_items,
        report.migration_coverage()
    );
    println!();

    if report.findings.is_empty() {
        println!("No ordering issues.");
        return;
    }

    println!(
        "{} ordering issues in {} items:",
        report.issue_count(),
        report.findings.len()
    );
    for finding in &report.findings {
        println!();
        println!(
            "  chapter {} item {} ({:?})",
            finding.chapter_id, finding.item_index, finding.ordering
        );
        for issue in &finding.issues {
            println!("    {}", issue);
        }
    }
}
