//! Core business logic abstractions

pub mod budget;
pub mod config;
pub mod extract;
pub mod ledger;
pub mod log;
pub mod stats;
pub mod store;
pub mod subscription;

// Re-export main types for cleaner imports
pub use budget::{BudgetStatus, BudgetTracker};
pub use extract::{ExtractedCandidate, ImportOutcome, StatementExtractor};
pub use ledger::Ledger;
pub use stats::{AppStats, WasteReport};
pub use store::{KeyValueCollection, Store};
pub use subscription::{NewSubscription, Subscription, UsageFrequency};
