//! The in-memory, ordered collection of tracked subscriptions.
use crate::core::stats::AppStats;
use crate::core::subscription::{NewSubscription, Subscription, UsageFrequency};
use chrono::Utc;
use tracing::debug;

/// Ordered subscriptions for the lifetime of the process.
///
/// Insertion order is kept for display. Every mutation leaves each entry's
/// waste flag consistent with its frequency, and [`Ledger::stats`] always
/// derives a fresh snapshot from the full collection.
#[derive(Debug, Default)]
pub struct Ledger {
    subscriptions: Vec<Subscription>,
    next_seq: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscription and returns its freshly assigned id.
    pub fn add(&mut self, candidate: NewSubscription) -> String {
        let id = self.next_id();
        debug!(
            id = %id,
            name = %candidate.name,
            price = candidate.price,
            frequency = %candidate.frequency,
            "Adding subscription"
        );
        self.subscriptions
            .push(Subscription::from_new(id.clone(), candidate));
        id
    }

    /// Appends every candidate in order, keeping existing entries.
    /// Returns how many were added.
    pub fn bulk_add<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = NewSubscription>,
    {
        let before = self.subscriptions.len();
        for candidate in candidates {
            self.add(candidate);
        }
        self.subscriptions.len() - before
    }

    /// Removes the subscription with `id`. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id() != id);
        let removed = self.subscriptions.len() != before;
        if removed {
            debug!(id, "Removed subscription");
        } else {
            debug!(id, "No subscription to remove");
        }
        removed
    }

    /// Changes how often a subscription is used. Unknown ids are ignored.
    pub fn update_frequency(&mut self, id: &str, frequency: UsageFrequency) -> bool {
        match self.subscriptions.iter_mut().find(|s| s.id() == id) {
            Some(subscription) => {
                subscription.set_frequency(frequency);
                debug!(id, %frequency, waste = subscription.is_waste(), "Updated frequency");
                true
            }
            None => {
                debug!(id, "No subscription to update");
                false
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.id() == id)
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.iter()
    }

    /// Subscriptions flagged as waste, in ledger order.
    pub fn waste(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.iter().filter(|s| s.is_waste())
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn stats(&self) -> AppStats {
        AppStats::from_subscriptions(&self.subscriptions)
    }

    fn next_id(&mut self) -> String {
        self.next_seq += 1;
        format!("{:x}-{}", Utc::now().timestamp_millis(), self.next_seq)
    }
}
