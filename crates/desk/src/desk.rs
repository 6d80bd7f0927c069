use std::sync::Arc;

use alloy_primitives::Address;
use otc_actors::{Broadcaster, SharedState};
use otc_cache::OrderCache;
use otc_events::{MessageCacheEvent, SubscriptionRegistry};
use otc_types::{Order, OrderId, OrderStatus, PriceMap, SyncState};

/// Shared state and channels of one OTC contract mirror. Actors are wired from it with `on_desk`.
#[derive(Clone)]
pub struct OtcDesk {
    contract: Address,
    orders: SharedState<OrderCache>,
    sync_state: SharedState<SyncState>,
    prices: SharedState<PriceMap>,
    subscriptions: Arc<SubscriptionRegistry>,

    cache_events_channel: Broadcaster<MessageCacheEvent>,
}

impl OtcDesk {
    pub fn new(contract: Address) -> OtcDesk {
        OtcDesk {
            contract,
            orders: SharedState::new(OrderCache::new()),
            sync_state: SharedState::new(SyncState::default()),
            prices: SharedState::new(PriceMap::new()),
            subscriptions: Arc::new(SubscriptionRegistry::new()),
            cache_events_channel: Broadcaster::new(1000),
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn orders(&self) -> SharedState<OrderCache> {
        self.orders.clone()
    }

    pub fn sync_state(&self) -> SharedState<SyncState> {
        self.sync_state.clone()
    }

    pub fn prices(&self) -> SharedState<PriceMap> {
        self.prices.clone()
    }

    pub fn subscriptions(&self) -> Arc<SubscriptionRegistry> {
        self.subscriptions.clone()
    }

    pub fn cache_events_channel(&self) -> Broadcaster<MessageCacheEvent> {
        self.cache_events_channel.clone()
    }

    /// Snapshot of cached orders, optionally filtered by stored status.
    pub async fn get_orders(&self, status: Option<OrderStatus>) -> Vec<Order> {
        self.orders.read().await.get_orders(status)
    }

    pub async fn get_order(&self, id: &OrderId) -> Option<Order> {
        self.orders.read().await.get_order(id).cloned()
    }
}

#[cfg(test)]
mod test {
    use alloy_primitives::U256;
    use otc_events::CacheEvents;
    use otc_types::OrderEvent;

    use super::*;

    #[tokio::test]
    async fn test_handles_share_state() {
        let desk = OtcDesk::new(Address::repeat_byte(0xcc));
        let order = Order {
            id: U256::from(1),
            maker: Address::repeat_byte(1),
            taker: Address::ZERO,
            sell_token: Address::repeat_byte(2),
            sell_amount: U256::from(10),
            buy_token: Address::repeat_byte(3),
            buy_amount: U256::from(20),
            timestamp: 1000,
            status: OrderStatus::Active,
            tries: 0,
            order_creation_fee: U256::ZERO,
        };
        desk.orders().write().await.apply(&OrderEvent::Created(order.clone()));

        assert_eq!(desk.get_orders(None).await, vec![order.clone()]);
        assert_eq!(desk.get_order(&U256::from(1)).await, Some(order));
        assert!(desk.get_orders(Some(OrderStatus::Filled)).await.is_empty());

        let mut rx = desk.cache_events_channel().subscribe();
        let handle = desk.clone();
        handle.cache_events_channel().send(MessageCacheEvent::new(CacheEvents::OrdersSynced { count: 1 })).unwrap();
        assert_eq!(rx.recv().await.unwrap().inner(), &CacheEvents::OrdersSynced { count: 1 });
    }
}
