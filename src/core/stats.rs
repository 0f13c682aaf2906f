//! Aggregate figures derived from the ledger.
//!
//! Nothing here is stored: every snapshot is computed from the full set of
//! subscriptions it is given.
use crate::core::subscription::Subscription;

/// Waste figure shown before anything has been tracked.
pub const EMPTY_LEDGER_WASTE: f64 = 17.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppStats {
    pub total_monthly: f64,
    pub estimated_waste: f64,
    pub potential_annual_savings: f64,
}

impl AppStats {
    pub fn from_subscriptions(subscriptions: &[Subscription]) -> Self {
        let total_monthly: f64 = subscriptions.iter().map(|s| s.price()).sum();
        let waste: f64 = subscriptions
            .iter()
            .filter(|s| s.is_waste())
            .map(|s| s.price())
            .sum();

        // An empty ledger shows a sample waste figure instead of zero.
        let estimated_waste = if waste == 0.0 && subscriptions.is_empty() {
            EMPTY_LEDGER_WASTE
        } else {
            waste
        };

        Self {
            total_monthly,
            estimated_waste,
            potential_annual_savings: estimated_waste * 12.0,
        }
    }
}

/// One line of the waste report.
#[derive(Debug, Clone, PartialEq)]
pub struct WasteItem {
    pub id: String,
    pub name: String,
    pub monthly: f64,
    pub annual: f64,
}

/// Breakdown of the subscriptions flagged as waste, with what cancelling all
/// of them would save.
#[derive(Debug, Clone, PartialEq)]
pub struct WasteReport {
    pub items: Vec<WasteItem>,
    pub total_monthly: f64,
    pub total_annual: f64,
}

impl WasteReport {
    pub fn from_subscriptions<'a, I>(subscriptions: I) -> Self
    where
        I: IntoIterator<Item = &'a Subscription>,
    {
        let items: Vec<WasteItem> = subscriptions
            .into_iter()
            .filter(|s| s.is_waste())
            .map(|s| WasteItem {
                id: s.id().to_string(),
                name: s.name().to_string(),
                monthly: s.price(),
                annual: s.annual_cost(),
            })
            .collect();
        let total_monthly: f64 = items.iter().map(|i| i.monthly).sum();

        Self {
            items,
            total_monthly,
            total_annual: total_monthly * 12.0,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.items.is_empty()
    }
}
