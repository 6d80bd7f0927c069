use eyre::Result;
use otc_actors::{Broadcaster, SharedState};
use otc_cache::OrderCache;
use otc_events::{CacheEvents, MessageCacheEvent};
use otc_node::{block_ranges, ChainClient};
use otc_types::{OrderEvent, OrderEventKind};
use tracing::{debug, error, info, trace};

use crate::OrderSyncConfig;

pub(crate) fn publish(cache_events_tx: &Broadcaster<MessageCacheEvent>, event: CacheEvents, source: &str) {
    if cache_events_tx.send(MessageCacheEvent::new_with_source(event, source)).is_err() {
        trace!(%source, "no cache event subscribers");
    }
}

/// Every order event in the block span, fetched kind by kind for each chunk.
pub async fn fetch_history<C: ChainClient + ?Sized>(client: &C, from_block: u64, to_block: u64, max_range: u64) -> Result<Vec<OrderEvent>> {
    let mut events = Vec::new();
    for (start, end) in block_ranges(from_block, to_block, max_range) {
        for kind in OrderEventKind::REPLAY_ORDER {
            let chunk = client.order_events(kind, start, end).await?;
            debug!(%kind, start, end, events = chunk.len(), "history chunk");
            events.extend(chunk);
        }
    }
    Ok(events)
}

/// Rebuilds the cache from the configured history window and returns the last replayed block.
/// A failed fetch leaves the cache empty and publishes `OrdersSynced { count: 0 }`.
pub async fn sync_all_orders<C: ChainClient + ?Sized>(
    client: &C,
    orders: &SharedState<OrderCache>,
    config: &OrderSyncConfig,
    cache_events_tx: &Broadcaster<MessageCacheEvent>,
) -> Result<u64> {
    let fetched = async {
        let latest_block = client.block_number().await?;
        let from_block = latest_block.saturating_sub(config.history_window_blocks());
        let events = fetch_history(client, from_block, latest_block, config.max_block_range).await?;
        Ok::<_, eyre::Report>((from_block, latest_block, events))
    }
    .await;

    match fetched {
        Ok((from_block, latest_block, events)) => {
            let count = {
                let mut guard = orders.write().await;
                guard.clear();
                let stats = guard.apply_history(events);
                guard.set_last_synced_block(latest_block);
                info!(from_block, latest_block, applied = stats.applied, ignored = stats.ignored, orders = guard.len(), "history replayed");
                guard.len()
            };
            publish(cache_events_tx, CacheEvents::OrdersSynced { count }, "sync_all_orders");
            Ok(latest_block)
        }
        Err(e) => {
            error!("sync_all_orders failed, clearing cache : {:#}", e);
            orders.write().await.clear();
            publish(cache_events_tx, CacheEvents::OrdersSynced { count: 0 }, "sync_all_orders");
            Err(e)
        }
    }
}
