use super::{dashboard, report, ui};
use crate::core::extract::{self, ImportOutcome};
use crate::core::{BudgetTracker, Ledger, StatementExtractor, WasteReport};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::PathBuf;
use tracing::{debug, info};

/// Outcome of importing one statement file.
#[derive(Debug)]
pub struct FileOutcome {
    pub file: String,
    pub outcome: ImportOutcome,
}

/// Extracts all files concurrently, then applies the results to a fresh
/// ledger in the order the files were given.
pub async fn scan_statements(
    files: &[PathBuf],
    extractor: &(dyn StatementExtractor + Send + Sync),
) -> (Ledger, Vec<FileOutcome>) {
    let pb = ui::new_progress_bar(files.len() as u64);
    pb.set_message("Analyzing statements...");

    let futures = files.iter().map(|path| {
        let pb_clone = pb.clone();
        async move {
            let result = match std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read statement file: {}", path.display()))
            {
                Ok(text) if text.trim().is_empty() => None,
                Ok(text) => Some(extractor.extract(&text).await),
                Err(e) => Some(Err(e)),
            };
            pb_clone.inc(1);
            (path.display().to_string(), result)
        }
    });
    let results = join_all(futures).await;
    pb.finish_and_clear();

    let mut ledger = Ledger::new();
    let outcomes = results
        .into_iter()
        .map(|(file, result)| {
            let outcome = match result {
                Some(result) => extract::apply_extraction(&mut ledger, result),
                None => ImportOutcome::NothingFound,
            };
            debug!(%file, ?outcome, "Applied statement");
            FileOutcome { file, outcome }
        })
        .collect();

    (ledger, outcomes)
}

pub async fn run(
    files: &[PathBuf],
    extractor: &(dyn StatementExtractor + Send + Sync),
    budget: &BudgetTracker,
    symbol: &str,
) -> Result<()> {
    info!(count = files.len(), "Scanning statements");
    let (ledger, outcomes) = scan_statements(files, extractor).await;

    for FileOutcome { file, outcome } in &outcomes {
        let style = if outcome.is_failure() {
            ui::StyleType::Error
        } else {
            ui::StyleType::Subtle
        };
        println!("{file}: {}", ui::style_text(&outcome.message(), style));
    }
    println!();

    println!(
        "{}",
        report::render_subscriptions(ledger.subscriptions(), symbol)
    );
    ui::print_separator();
    println!(
        "{}",
        report::render_waste_report(&WasteReport::from_subscriptions(ledger.iter()), symbol)
    );
    ui::print_separator();

    let stats = ledger.stats();
    println!("{}", dashboard::render(&stats, &budget.status(&stats), symbol));
    Ok(())
}
