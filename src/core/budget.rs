//! Monthly budget threshold, persisted through an injected key-value collection.
use crate::core::stats::AppStats;
use crate::core::store::KeyValueCollection;
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_BUDGET: f64 = 100.0;
pub const BUDGET_COLLECTION: &str = "settings";
pub const BUDGET_KEY: &str = "subaudit_budget";

/// How the current monthly spend compares to the budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetStatus {
    pub budget: f64,
    pub spent: f64,
    pub over_budget: bool,
    /// Share of the budget used, capped at 100.
    pub percent_used: f64,
}

pub struct BudgetTracker {
    store: Arc<dyn KeyValueCollection>,
    budget: f64,
}

impl BudgetTracker {
    /// Reads the saved budget, or uses [`DEFAULT_BUDGET`] if none was saved.
    pub fn load(store: Arc<dyn KeyValueCollection>) -> Self {
        let budget = store
            .get(BUDGET_KEY.as_bytes())
            .and_then(|raw| {
                let text = String::from_utf8_lossy(&raw).to_string();
                match text.trim().parse::<f64>() {
                    Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
                    _ => {
                        warn!(value = %text, "Ignoring invalid saved budget");
                        None
                    }
                }
            })
            .unwrap_or(DEFAULT_BUDGET);
        debug!(budget, "Loaded budget");

        Self { store, budget }
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Saves a new budget. Negative or non-finite values are rejected.
    pub fn set_budget(&mut self, budget: f64) -> Result<()> {
        if !budget.is_finite() || budget < 0.0 {
            bail!("Budget must be a non-negative amount, got {}", budget);
        }

        self.store
            .put(BUDGET_KEY.as_bytes(), budget.to_string().as_bytes())
            .context("Failed to save budget")?;
        self.budget = budget;
        debug!(budget, "Saved budget");
        Ok(())
    }

    pub fn is_over_budget(&self, total_monthly: f64) -> bool {
        total_monthly > self.budget
    }

    pub fn percent_used(&self, total_monthly: f64) -> f64 {
        if self.budget > 0.0 {
            (total_monthly / self.budget * 100.0).min(100.0)
        } else if total_monthly > 0.0 {
            100.0
        } else {
            0.0
        }
    }

    pub fn status(&self, stats: &AppStats) -> BudgetStatus {
        BudgetStatus {
            budget: self.budget,
            spent: stats.total_monthly,
            over_budget: self.is_over_budget(stats.total_monthly),
            percent_used: self.percent_used(stats.total_monthly),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCollection;

    #[test]
    fn test_defaults_when_nothing_saved() {
        let tracker = BudgetTracker::load(Arc::new(MemoryCollection::new()));
        assert_eq!(tracker.budget(), 100.0);
    }

    #[test]
    fn test_loads_saved_budget() {
        let store = Arc::new(MemoryCollection::new());
        store.put(BUDGET_KEY.as_bytes(), b"42.5").unwrap();

        let tracker = BudgetTracker::load(store);
        assert_eq!(tracker.budget(), 42.5);
    }

    #[test]
    fn test_invalid_saved_budget_falls_back_to_default() {
        let store = Arc::new(MemoryCollection::new());
        store.put(BUDGET_KEY.as_bytes(), b"lots").unwrap();
        assert_eq!(BudgetTracker::load(store.clone()).budget(), 100.0);

        store.put(BUDGET_KEY.as_bytes(), b"-5").unwrap();
        assert_eq!(BudgetTracker::load(store).budget(), 100.0);
    }

    #[test]
    fn test_set_budget_persists() {
        let store = Arc::new(MemoryCollection::new());
        let mut tracker = BudgetTracker::load(store.clone());

        tracker.set_budget(60.0).unwrap();
        assert_eq!(tracker.budget(), 60.0);
        assert_eq!(store.get(BUDGET_KEY.as_bytes()), Some(b"60".to_vec()));

        let reloaded = BudgetTracker::load(store);
        assert_eq!(reloaded.budget(), 60.0);
    }

    #[test]
    fn test_set_budget_rejects_invalid_values() {
        let store = Arc::new(MemoryCollection::new());
        let mut tracker = BudgetTracker::load(store.clone());

        assert!(tracker.set_budget(-1.0).is_err());
        assert!(tracker.set_budget(f64::NAN).is_err());
        assert_eq!(tracker.budget(), 100.0);
        assert!(store.get(BUDGET_KEY.as_bytes()).is_none());
    }

    #[test]
    fn test_over_budget_and_percentage() {
        let mut tracker = BudgetTracker::load(Arc::new(MemoryCollection::new()));
        tracker.set_budget(50.0).unwrap();

        assert!(!tracker.is_over_budget(50.0));
        assert!(tracker.is_over_budget(50.01));
        assert!((tracker.percent_used(38.49) - 76.98).abs() < 0.001);
        assert_eq!(tracker.percent_used(75.0), 100.0);
    }

    #[test]
    fn test_zero_budget() {
        let mut tracker = BudgetTracker::load(Arc::new(MemoryCollection::new()));
        tracker.set_budget(0.0).unwrap();

        assert_eq!(tracker.percent_used(0.0), 0.0);
        assert_eq!(tracker.percent_used(9.99), 100.0);
        assert!(tracker.is_over_budget(9.99));
        assert!(!tracker.is_over_budget(0.0));
    }

    #[test]
    fn test_status() {
        let tracker = BudgetTracker::load(Arc::new(MemoryCollection::new()));
        let stats = AppStats {
            total_monthly: 120.0,
            estimated_waste: 20.0,
            potential_annual_savings: 240.0,
        };

        let status = tracker.status(&stats);
        assert_eq!(status.budget, 100.0);
        assert_eq!(status.spent, 120.0);
        assert!(status.over_budget);
        assert_eq!(status.percent_used, 100.0);
    }
}
