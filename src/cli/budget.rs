use super::{dashboard, ui};
use crate::core::{AppStats, BudgetTracker};
use anyhow::Result;

/// Shows the stored budget, or stores `value` first when given.
pub fn run(tracker: &mut BudgetTracker, value: Option<f64>, symbol: &str) -> Result<()> {
    if let Some(value) = value {
        tracker.set_budget(value)?;
        println!(
            "{}",
            ui::style_text(
                &format!("Budget set to {}", ui::format_money(value, symbol)),
                ui::StyleType::TotalValue
            )
        );
    }

    // Nothing is tracked outside a session, so spend is measured against an empty ledger
    let status = tracker.status(&AppStats::from_subscriptions(&[]));
    println!("{}", dashboard::render_budget(&status, symbol));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCollection;
    use std::sync::Arc;

    #[test]
    fn test_set_and_show_budget() {
        let store = Arc::new(MemoryCollection::new());
        let mut tracker = BudgetTracker::load(store.clone());

        run(&mut tracker, Some(250.0), "$").unwrap();
        assert_eq!(tracker.budget(), 250.0);
        assert_eq!(BudgetTracker::load(store).budget(), 250.0);

        run(&mut tracker, None, "$").unwrap();
        assert_eq!(tracker.budget(), 250.0);
    }

    #[test]
    fn test_invalid_budget_is_rejected() {
        let mut tracker = BudgetTracker::load(Arc::new(MemoryCollection::new()));
        assert!(run(&mut tracker, Some(-1.0), "$").is_err());
        assert_eq!(tracker.budget(), 100.0);
    }
}
