//! Subscription records and the usage classification that drives waste detection

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// How often the user actually gets value out of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageFrequency {
    Daily,
    Weekly,
    Monthly,
    Rarely,
    Never,
}

impl UsageFrequency {
    pub const ALL: [UsageFrequency; 5] = [
        UsageFrequency::Daily,
        UsageFrequency::Weekly,
        UsageFrequency::Monthly,
        UsageFrequency::Rarely,
        UsageFrequency::Never,
    ];

    /// A subscription used rarely or never is considered waste.
    pub fn is_waste(&self) -> bool {
        matches!(self, UsageFrequency::Rarely | UsageFrequency::Never)
    }
}

impl Display for UsageFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                UsageFrequency::Daily => "Daily",
                UsageFrequency::Weekly => "Weekly",
                UsageFrequency::Monthly => "Monthly",
                UsageFrequency::Rarely => "Rarely",
                UsageFrequency::Never => "Never",
            }
        )
    }
}

impl FromStr for UsageFrequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "d" => Ok(UsageFrequency::Daily),
            "weekly" | "w" => Ok(UsageFrequency::Weekly),
            "monthly" | "m" => Ok(UsageFrequency::Monthly),
            "rarely" | "r" => Ok(UsageFrequency::Rarely),
            "never" | "n" => Ok(UsageFrequency::Never),
            _ => Err(anyhow::anyhow!("Invalid usage frequency: {}", s)),
        }
    }
}

/// A subscription the caller wants to track. The ledger assigns its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub frequency: UsageFrequency,
}

impl NewSubscription {
    pub fn new(
        name: impl Into<String>,
        price: f64,
        category: impl Into<String>,
        frequency: UsageFrequency,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            category: category.into(),
            frequency,
        }
    }

    /// Non-empty name and a finite, non-negative monthly price.
    pub fn is_well_formed(&self) -> bool {
        !self.name.trim().is_empty() && self.price.is_finite() && self.price >= 0.0
    }
}

/// A tracked subscription.
///
/// The id is fixed at creation and the frequency only changes through the
/// ledger. Waste is derived from the frequency on every read, so it can never
/// disagree with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    id: String,
    name: String,
    price: f64,
    category: String,
    frequency: UsageFrequency,
}

impl Subscription {
    pub(crate) fn from_new(id: String, candidate: NewSubscription) -> Self {
        Self {
            id,
            name: candidate.name,
            price: candidate.price,
            category: candidate.category,
            frequency: candidate.frequency,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Monthly cost.
    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn annual_cost(&self) -> f64 {
        self.price * 12.0
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn frequency(&self) -> UsageFrequency {
        self.frequency
    }

    pub fn is_waste(&self) -> bool {
        self.frequency.is_waste()
    }

    pub(crate) fn set_frequency(&mut self, frequency: UsageFrequency) {
        self.frequency = frequency;
    }
}
