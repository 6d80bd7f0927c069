use std::collections::{BTreeSet, HashMap};

use alloy_primitives::Address;
use otc_types::{ContractConstants, Order, OrderEvent, OrderEventKind, OrderId, OrderStatus};
use tracing::{debug, trace};

use crate::{ApplyOutcome, IgnoreReason};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: usize,
    pub ignored: usize,
    pub by_kind: HashMap<OrderEventKind, usize>,
}

/// In-memory mirror of the contract's orders. Only `apply` and `apply_history` mutate it.
#[derive(Clone, Debug, Default)]
pub struct OrderCache {
    orders: HashMap<OrderId, Order>,
    constants: Option<ContractConstants>,
    last_synced_block: Option<u64>,
}

impl OrderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.last_synced_block = None;
    }

    pub fn constants(&self) -> Option<ContractConstants> {
        self.constants
    }

    pub fn set_constants(&mut self, constants: ContractConstants) {
        self.constants = Some(constants)
    }

    pub fn last_synced_block(&self) -> Option<u64> {
        self.last_synced_block
    }

    pub fn set_last_synced_block(&mut self, block_number: u64) {
        self.last_synced_block = Some(block_number)
    }

    pub fn get_order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    /// Snapshot of the cached orders sorted by id, optionally filtered by stored status.
    /// Expiry is not applied here; see `otc_types::derive_status`.
    pub fn get_orders(&self, status: Option<OrderStatus>) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.values().filter(|o| status.map_or(true, |s| o.status == s)).cloned().collect();
        orders.sort_by_key(|o| o.id);
        orders
    }

    pub fn orders_by_maker(&self, maker: Address) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.values().filter(|o| o.maker == maker).cloned().collect();
        orders.sort_by_key(|o| o.id);
        orders
    }

    /// Every token referenced by a cached order.
    pub fn tokens(&self) -> BTreeSet<Address> {
        self.orders.values().flat_map(|o| o.tokens()).collect()
    }

    /// Applies one event. Replay and live subscriptions both go through here.
    pub fn apply(&mut self, event: &OrderEvent) -> ApplyOutcome {
        let outcome = match event {
            OrderEvent::Created(order) => self.apply_created(order),
            OrderEvent::Filled { id, .. } => self.apply_status(*id, OrderStatus::Filled),
            OrderEvent::Canceled { id, .. } => self.apply_status(*id, OrderStatus::Canceled),
            OrderEvent::CleanedUp { id, .. } => self.apply_cleaned_up(*id),
            OrderEvent::Retry { old_id, new_id, tries, timestamp, .. } => self.apply_retry(*old_id, *new_id, *tries, *timestamp),
        };

        match &outcome {
            ApplyOutcome::Ignored { id, reason } => debug!(kind = %event.kind(), %id, %reason, "event ignored"),
            outcome => trace!(kind = %event.kind(), ?outcome, "event applied"),
        }
        outcome
    }

    /// Applies a batch of historical events grouped by kind in `OrderEventKind::REPLAY_ORDER`,
    /// keeping chain order within each kind.
    pub fn apply_history(&mut self, mut events: Vec<OrderEvent>) -> ReplayStats {
        events.sort_by_key(|e| e.kind());

        let mut stats = ReplayStats::default();
        for event in events.iter() {
            *stats.by_kind.entry(event.kind()).or_default() += 1;
            if self.apply(event).is_ignored() {
                stats.ignored += 1;
            } else {
                stats.applied += 1;
            }
        }
        stats
    }

    fn apply_created(&mut self, order: &Order) -> ApplyOutcome {
        match self.orders.get_mut(&order.id) {
            None => {
                self.orders.insert(order.id, order.clone());
                ApplyOutcome::Inserted(order.clone())
            }
            Some(existing) if existing == order => ApplyOutcome::Ignored { id: order.id, reason: IgnoreReason::Duplicate },
            Some(existing) => {
                // Keep what later events already established.
                let status = existing.status;
                let tries = existing.tries.max(order.tries);
                *existing = Order { status, tries, ..order.clone() };
                ApplyOutcome::Updated(order.id)
            }
        }
    }

    fn apply_status(&mut self, id: OrderId, status: OrderStatus) -> ApplyOutcome {
        let Some(order) = self.orders.get_mut(&id) else {
            return ApplyOutcome::Ignored { id, reason: IgnoreReason::UnknownOrder };
        };

        if order.status == status {
            ApplyOutcome::Ignored { id, reason: IgnoreReason::Duplicate }
        } else if !order.status.can_transition_to(status) {
            ApplyOutcome::Ignored { id, reason: IgnoreReason::StatusRegression { current: order.status, attempted: status } }
        } else {
            order.status = status;
            ApplyOutcome::StatusChanged { id, status }
        }
    }

    fn apply_cleaned_up(&mut self, id: OrderId) -> ApplyOutcome {
        match self.orders.remove(&id) {
            Some(_) => ApplyOutcome::Removed(id),
            None => ApplyOutcome::Ignored { id, reason: IgnoreReason::UnknownOrder },
        }
    }

    fn apply_retry(&mut self, old_id: OrderId, new_id: OrderId, tries: u64, timestamp: u64) -> ApplyOutcome {
        let Some(old) = self.orders.remove(&old_id) else {
            // The superseded record is gone already; make sure the new one carries the count.
            return match self.orders.get_mut(&new_id) {
                Some(new) if new.tries < tries => {
                    new.tries = tries;
                    ApplyOutcome::Updated(new_id)
                }
                _ => ApplyOutcome::Ignored { id: old_id, reason: IgnoreReason::UnknownOrder },
            };
        };

        let tries = tries.max(old.tries + 1);
        let replacement = match self.orders.remove(&new_id) {
            Some(created) => Order { tries: tries.max(created.tries), ..created },
            None => Order { id: new_id, tries, timestamp, status: OrderStatus::Active, ..old },
        };
        let tries = replacement.tries;
        self.orders.insert(new_id, replacement);

        ApplyOutcome::Replaced { old_id, new_id, tries }
    }
}

#[cfg(test)]
mod test {
    use alloy_primitives::U256;
    use otc_events::CacheEvents;

    use super::*;

    const MAKER: Address = Address::repeat_byte(0x11);

    fn created(id: u64, timestamp: u64) -> OrderEvent {
        OrderEvent::Created(Order {
            id: U256::from(id),
            maker: MAKER,
            taker: Address::ZERO,
            sell_token: Address::repeat_byte(0xaa),
            sell_amount: U256::from(1_000),
            buy_token: Address::repeat_byte(0xbb),
            buy_amount: U256::from(2_000),
            timestamp,
            status: OrderStatus::Active,
            tries: 0,
            order_creation_fee: U256::from(5),
        })
    }

    fn filled(id: u64) -> OrderEvent {
        OrderEvent::Filled { id: U256::from(id), taker: Address::repeat_byte(0x22), timestamp: 10 }
    }

    fn canceled(id: u64) -> OrderEvent {
        OrderEvent::Canceled { id: U256::from(id), timestamp: 11 }
    }

    fn cleaned_up(id: u64) -> OrderEvent {
        OrderEvent::CleanedUp { id: U256::from(id), timestamp: 12 }
    }

    fn retry(old_id: u64, new_id: u64, tries: u64) -> OrderEvent {
        OrderEvent::Retry { old_id: U256::from(old_id), new_id: U256::from(new_id), maker: MAKER, tries, timestamp: 500 }
    }

    #[test]
    fn test_filled_never_regresses() {
        let mut cache = OrderCache::new();
        cache.apply(&created(1, 0));
        assert_eq!(cache.apply(&filled(1)), ApplyOutcome::StatusChanged { id: U256::from(1), status: OrderStatus::Filled });

        let outcome = cache.apply(&canceled(1));
        assert_eq!(
            outcome,
            ApplyOutcome::Ignored {
                id: U256::from(1),
                reason: IgnoreReason::StatusRegression { current: OrderStatus::Filled, attempted: OrderStatus::Canceled }
            }
        );

        // A late duplicate Created must not reset the status either.
        assert_eq!(cache.apply(&created(1, 0)), ApplyOutcome::Ignored { id: U256::from(1), reason: IgnoreReason::Duplicate });
        assert_eq!(cache.get_order(&U256::from(1)).map(|o| o.status), Some(OrderStatus::Filled));
    }

    #[test]
    fn test_cancel_for_unknown_id_is_noop() {
        let mut cache = OrderCache::new();
        cache.apply(&created(1, 0));
        let outcome = cache.apply(&canceled(42));
        assert_eq!(outcome, ApplyOutcome::Ignored { id: U256::from(42), reason: IgnoreReason::UnknownOrder });
        assert_eq!(cache.len(), 1);
        assert!(outcome.cache_event().is_none());
    }

    #[test]
    fn test_history_size_matches_event_counts() {
        // Retries also emit Created for the new id.
        let events = vec![
            retry(2, 5, 1),
            cleaned_up(3),
            created(1, 100),
            created(2, 100),
            created(3, 100),
            created(4, 100),
            filled(1),
            created(5, 500),
            canceled(4),
        ];
        let created_count = 5;
        let cleaned_count = 1;
        let superseded_count = 1;

        let mut cache = OrderCache::new();
        let stats = cache.apply_history(events);

        assert_eq!(cache.len(), created_count - cleaned_count - superseded_count);
        assert_eq!(stats.ignored, 0);
        assert_eq!(stats.by_kind.get(&OrderEventKind::Created), Some(&5));
        assert!(cache.get_order(&U256::from(2)).is_none());
        assert_eq!(cache.get_order(&U256::from(5)).map(|o| o.tries), Some(1));
        assert_eq!(cache.get_order(&U256::from(4)).map(|o| o.status), Some(OrderStatus::Canceled));
    }

    #[test]
    fn test_history_orders_status_after_created() {
        // Filled arrives first in the batch but is applied after Created.
        let mut cache = OrderCache::new();
        let stats = cache.apply_history(vec![filled(1), created(1, 0)]);
        assert_eq!(stats.applied, 2);
        assert_eq!(cache.get_orders(None)[0].status, OrderStatus::Filled);
    }

    #[test]
    fn test_get_orders_filters_stored_status_only() {
        let mut cache = OrderCache::new();
        cache.apply_history(vec![created(1, 0), created(2, 0), created(3, 0), filled(2), canceled(3)]);

        let active = cache.get_orders(Some(OrderStatus::Active));
        assert_eq!(active.len(), 1);
        assert!(active.iter().all(|o| o.status == OrderStatus::Active));
        // Created at t=0 is long expired, but the stored status is still Active.
        assert_eq!(active[0].id, U256::from(1));
        assert_eq!(cache.get_orders(None).len(), 3);
        assert_eq!(cache.get_orders(Some(OrderStatus::Filled))[0].id, U256::from(2));
    }

    #[test]
    fn test_retry_replaces_atomically() {
        let mut cache = OrderCache::new();
        cache.apply(&created(7, 100));

        let outcome = cache.apply(&retry(7, 8, 0));
        assert_eq!(outcome, ApplyOutcome::Replaced { old_id: U256::from(7), new_id: U256::from(8), tries: 1 });
        assert!(cache.get_order(&U256::from(7)).is_none());

        let replacement = cache.get_order(&U256::from(8)).cloned().unwrap();
        assert_eq!(replacement.tries, 1);
        assert_eq!(replacement.timestamp, 500);
        assert_eq!(replacement.maker, MAKER);
        assert_eq!(cache.len(), 1);
        assert_eq!(
            outcome.cache_event(),
            Some(CacheEvents::OrderRetried { old_id: U256::from(7), new_id: U256::from(8), tries: 1 })
        );

        let second = cache.apply(&retry(8, 9, 2));
        assert_eq!(second, ApplyOutcome::Replaced { old_id: U256::from(8), new_id: U256::from(9), tries: 2 });
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_retry_for_unknown_ids_is_ignored() {
        let mut cache = OrderCache::new();
        assert!(cache.apply(&retry(1, 2, 1)).is_ignored());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cleaned_up_removes_and_reports() {
        let mut cache = OrderCache::new();
        cache.apply(&created(1, 0));
        let outcome = cache.apply(&cleaned_up(1));
        assert_eq!(outcome.cache_event(), Some(CacheEvents::OrderCleanedUp { id: U256::from(1) }));
        assert!(cache.is_empty());
        assert!(cache.apply(&cleaned_up(1)).is_ignored());
    }

    #[test]
    fn test_tokens_and_maker_views() {
        let mut cache = OrderCache::new();
        cache.apply_history(vec![created(1, 0), created(2, 0)]);
        assert_eq!(cache.tokens().len(), 2);
        assert_eq!(cache.orders_by_maker(MAKER).len(), 2);
        assert!(cache.orders_by_maker(Address::ZERO).is_empty());
    }
}
