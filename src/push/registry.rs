use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::RegistryError;
use crate::types::push::Subscription;

/// In-memory set of active subscriptions keyed by endpoint.
///
/// All mutations go through one lock, so concurrent register/remove calls
/// resolve to a single consistent state.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: Mutex<HashMap<String, Subscription>>,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub subscription: Subscription,
    pub already_existed: bool,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `candidate` and inserts it unless its endpoint is already known.
    ///
    /// The returned subscription is the one submitted, which is what the
    /// follow-up delivery is addressed to.
    pub fn register(&self, candidate: Value) -> Result<Registration, RegistryError> {
        let subscription = Subscription::from_json(candidate)?;
        Ok(self.insert(subscription))
    }

    pub fn insert(&self, subscription: Subscription) -> Registration {
        let mut entries = self.entries.lock().expect("subscription registry lock");
        let already_existed = match entries.entry(subscription.endpoint.clone()) {
            Entry::Occupied(_) => true,
            Entry::Vacant(slot) => {
                slot.insert(subscription.clone());
                false
            }
        };
        Registration {
            subscription,
            already_existed,
        }
    }

    pub fn remove(&self, endpoint: &str) -> bool {
        self.entries
            .lock()
            .expect("subscription registry lock")
            .remove(endpoint)
            .is_some()
    }

    pub fn list(&self) -> Vec<Subscription> {
        self.entries
            .lock()
            .expect("subscription registry lock")
            .values()
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.entries
            .lock()
            .expect("subscription registry lock")
            .len()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, endpoint: &str) -> bool {
        self.entries
            .lock()
            .expect("subscription registry lock")
            .contains_key(endpoint)
    }
}
