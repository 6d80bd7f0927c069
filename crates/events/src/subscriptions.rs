use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, error};

use crate::{CacheEventKind, CacheEvents};

pub type Callback = Arc<dyn Fn(&CacheEvents) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Callbacks keyed by event kind. Callbacks only ever see events by shared reference.
#[derive(Default)]
pub struct SubscriptionRegistry {
    next_id: AtomicU64,
    subscribers: RwLock<HashMap<CacheEventKind, Vec<(SubscriptionId, Callback)>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, kind: CacheEventKind, callback: F) -> SubscriptionId
    where
        F: Fn(&CacheEvents) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut guard = self.subscribers.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.entry(kind).or_default().push((id, Arc::new(callback)));
        debug!(%kind, ?id, "subscribed");
        id
    }

    /// Returns false when the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut guard = self.subscribers.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut removed = false;
        for callbacks in guard.values_mut() {
            let before = callbacks.len();
            callbacks.retain(|(sub_id, _)| *sub_id != id);
            removed |= callbacks.len() != before;
        }
        guard.retain(|_, callbacks| !callbacks.is_empty());
        removed
    }

    pub fn subscriber_count(&self, kind: CacheEventKind) -> usize {
        let guard = self.subscribers.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.get(&kind).map(|c| c.len()).unwrap_or_default()
    }

    /// Calls every callback registered for the event's kind and returns how many ran to completion.
    /// A panicking callback is logged and does not stop the others.
    pub fn dispatch(&self, event: &CacheEvents) -> usize {
        let kind = event.kind();
        let callbacks: Vec<(SubscriptionId, Callback)> = {
            let guard = self.subscribers.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.get(&kind).cloned().unwrap_or_default()
        };

        let mut delivered = 0;
        for (id, callback) in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(event))) {
                Ok(()) => delivered += 1,
                Err(_) => error!(%kind, ?id, "subscriber callback panicked"),
            }
        }
        delivered
    }
}
