//! Statement extraction abstractions and the boundary that feeds the ledger
//!
//! Extractors may fail in any way; [`apply_extraction`] turns every result
//! into an [`ImportOutcome`] so nothing from the extractor reaches the ledger
//! except well-formed candidates.

use crate::core::ledger::Ledger;
use crate::core::subscription::{NewSubscription, UsageFrequency};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const NOTHING_FOUND_MESSAGE: &str = "AI couldn't find any common subscriptions in that text. Try pasting a different section of your statement.";
pub const FAILURE_MESSAGE: &str =
    "An error occurred while analyzing. Please check your internet connection and try again.";

/// A subscription spotted in statement text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedCandidate {
    pub name: String,
    pub price: f64,
    pub category: String,
}

impl From<ExtractedCandidate> for NewSubscription {
    /// Imported subscriptions start out as used weekly until the user says otherwise.
    fn from(candidate: ExtractedCandidate) -> Self {
        NewSubscription::new(
            candidate.name.trim(),
            candidate.price,
            candidate.category.trim(),
            UsageFrequency::Weekly,
        )
    }
}

#[async_trait]
pub trait StatementExtractor: Send + Sync {
    /// Finds recurring subscriptions in raw statement text. A single attempt,
    /// no retries.
    async fn extract(&self, text: &str) -> Result<Vec<ExtractedCandidate>>;
}

/// What happened to an import attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Added(usize),
    NothingFound,
    Failed(String),
}

impl ImportOutcome {
    pub fn message(&self) -> String {
        match self {
            ImportOutcome::Added(1) => "Added 1 subscription.".to_string(),
            ImportOutcome::Added(n) => format!("Added {n} subscriptions."),
            ImportOutcome::NothingFound => NOTHING_FOUND_MESSAGE.to_string(),
            ImportOutcome::Failed(_) => FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ImportOutcome::Failed(_))
    }
}

/// Extracts subscriptions from `text` and appends them to the ledger.
/// Blank text is not sent to the extractor.
pub async fn import_statement(
    ledger: &mut Ledger,
    extractor: &(dyn StatementExtractor + Send + Sync),
    text: &str,
) -> ImportOutcome {
    if text.trim().is_empty() {
        debug!("Blank statement text, skipping extraction");
        return ImportOutcome::NothingFound;
    }
    let result = extractor.extract(text).await;
    apply_extraction(ledger, result)
}

/// Applies the result of an extraction to the ledger.
pub fn apply_extraction(
    ledger: &mut Ledger,
    result: Result<Vec<ExtractedCandidate>>,
) -> ImportOutcome {
    let candidates = match result {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Statement extraction failed");
            return ImportOutcome::Failed(format!("{e:#}"));
        }
    };

    let received = candidates.len();
    let accepted: Vec<NewSubscription> = candidates
        .into_iter()
        .map(NewSubscription::from)
        .filter(|candidate| {
            let keep = candidate.is_well_formed();
            if !keep {
                debug!(?candidate, "Dropping malformed candidate");
            }
            keep
        })
        .collect();
    debug!(received, accepted = accepted.len(), "Extraction finished");

    if accepted.is_empty() {
        return ImportOutcome::NothingFound;
    }
    ImportOutcome::Added(ledger.bulk_add(accepted))
}
