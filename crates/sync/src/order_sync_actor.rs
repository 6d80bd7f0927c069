use eyre::{eyre, Result};
use futures::StreamExt;
use otc_actors::{Accessor, Actor, ActorResult, Broadcaster, Producer, SharedState, WorkerResult};
use otc_actors_macros::{Accessor, Producer};
use otc_cache::OrderCache;
use otc_desk::OtcDesk;
use otc_errors::{classify_report, retry_always};
use otc_events::{CacheEvents, MessageCacheEvent};
use otc_node::{ChainClient, ChainConnector, OrderEventStream};
use otc_types::SyncState;
use tracing::{debug, error, info, warn};

use crate::history::publish;
use crate::{sync_all_orders, OrderSyncConfig};

async fn set_sync_state(sync_state: &SharedState<SyncState>, state: SyncState, cache_events_tx: &Broadcaster<MessageCacheEvent>) {
    info!(%state, "sync state");
    sync_state.update(state.clone()).await;
    publish(cache_events_tx, CacheEvents::SyncStateChanged { state }, "OrderSyncActor");
}

/// Connects, reads the contract constants, replays history and opens the live feed.
async fn initialize<K: ChainConnector>(
    connector: &K,
    config: &OrderSyncConfig,
    orders: &SharedState<OrderCache>,
    cache_events_tx: &Broadcaster<MessageCacheEvent>,
) -> Result<(K::Client, OrderEventStream)> {
    let client = connector.connect().await?;

    let constants = client.contract_constants().await?;
    debug!(order_expiry = constants.order_expiry, grace_period = constants.grace_period, "contract constants");
    orders.write().await.set_constants(constants);

    let latest_block = sync_all_orders(&client, orders, config, cache_events_tx).await?;
    let stream = client.subscribe_order_events(latest_block + 1).await?;
    Ok((client, stream))
}

pub async fn order_sync_worker<K: ChainConnector>(
    connector: K,
    config: OrderSyncConfig,
    orders: SharedState<OrderCache>,
    sync_state: SharedState<SyncState>,
    cache_events_tx: Broadcaster<MessageCacheEvent>,
) -> WorkerResult {
    loop {
        set_sync_state(&sync_state, SyncState::Syncing, &cache_events_tx).await;

        let initialized =
            retry_always(&config.init_retry, "initialize", || initialize(&connector, &config, &orders, &cache_events_tx)).await;

        let (_client, mut stream) = match initialized {
            Ok(initialized) => initialized,
            Err(e) => {
                let classified = classify_report(&e);
                let reason = format!("{}: {}", classified.user_message, classified.message);
                error!(category = %classified.category, "initialization failed permanently : {:#}", e);
                set_sync_state(&sync_state, SyncState::Disabled { reason: reason.clone() }, &cache_events_tx).await;
                publish(&cache_events_tx, CacheEvents::SyncFailed { reason }, "OrderSyncActor");
                return Err(e);
            }
        };

        set_sync_state(&sync_state, SyncState::Live, &cache_events_tx).await;

        while let Some(event) = stream.next().await {
            let outcome = orders.write().await.apply(&event);
            if let Some(cache_event) = outcome.cache_event() {
                publish(&cache_events_tx, cache_event, "OrderSyncActor");
            }
        }

        warn!("live order event stream ended, resynchronizing");
    }
}

/// Single writer of the order cache: replays history, then applies live events through the same `OrderCache::apply`.
#[derive(Accessor, Producer)]
pub struct OrderSyncActor<K> {
    connector: K,
    config: OrderSyncConfig,
    #[accessor]
    orders: Option<SharedState<OrderCache>>,
    #[accessor]
    sync_state: Option<SharedState<SyncState>>,
    #[producer]
    cache_events_tx: Option<Broadcaster<MessageCacheEvent>>,
}

impl<K> OrderSyncActor<K>
where
    K: ChainConnector + Clone + 'static,
{
    pub fn new(connector: K) -> Self {
        Self { connector, config: OrderSyncConfig::default(), orders: None, sync_state: None, cache_events_tx: None }
    }

    pub fn with_config(self, config: OrderSyncConfig) -> Self {
        Self { config, ..self }
    }

    pub fn on_desk(self, desk: &OtcDesk) -> Self {
        Self { orders: Some(desk.orders()), sync_state: Some(desk.sync_state()), cache_events_tx: Some(desk.cache_events_channel()), ..self }
    }
}

impl<K> Actor for OrderSyncActor<K>
where
    K: ChainConnector + Clone + 'static,
{
    fn start(&self) -> ActorResult {
        let task = tokio::task::spawn(order_sync_worker(
            self.connector.clone(),
            self.config.clone(),
            self.orders.clone().ok_or(eyre!("NO_ORDERS"))?,
            self.sync_state.clone().ok_or(eyre!("NO_SYNC_STATE"))?,
            self.cache_events_tx.clone().ok_or(eyre!("NO_CACHE_EVENTS_TX"))?,
        ));
        Ok(vec![task])
    }

    fn name(&self) -> &'static str {
        "OrderSyncActor"
    }
}
