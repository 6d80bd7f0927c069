use std::collections::HashMap;
use std::time::Duration;

use alloy_primitives::Address;
use eyre::{eyre, Result};
use otc_actors::{Accessor, Actor, ActorResult, Broadcaster, Producer, SharedState, WorkerResult};
use otc_actors_macros::{Accessor, Producer};
use otc_cache::OrderCache;
use otc_desk::OtcDesk;
use otc_events::{CacheEvents, MessageCacheEvent};
use otc_node::ChainClient;
use otc_types::{unix_now, PriceMap};
use tracing::{debug, info, warn};

use crate::PriceSource;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceConfig {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub interval: Duration,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self { batch_size: 30, batch_delay: Duration::from_millis(1500), interval: Duration::from_secs(300) }
    }
}

/// Queries `tokens` in chunks of `batch_size`, sleeping `batch_delay` between chunks.
/// A failed chunk is logged and its tokens are left unpriced.
pub async fn fetch_prices_batched<S: PriceSource + ?Sized>(
    source: &S,
    tokens: &[Address],
    batch_size: usize,
    batch_delay: Duration,
) -> HashMap<Address, f64> {
    let mut prices = HashMap::new();
    for (idx, chunk) in tokens.chunks(batch_size.max(1)).enumerate() {
        if idx > 0 {
            tokio::time::sleep(batch_delay).await;
        }
        match source.fetch_usd_prices(chunk).await {
            Ok(quotes) => prices.extend(quotes),
            Err(e) => warn!(batch = idx, tokens = chunk.len(), "price batch failed : {:#}", e),
        }
    }
    prices
}

async fn refresh_decimals<C: ChainClient + ?Sized>(client: &C, tokens: &[Address], prices: &SharedState<PriceMap>) {
    let missing: Vec<Address> = {
        let guard = prices.read().await;
        tokens.iter().filter(|t| guard.decimals(t).is_none()).copied().collect()
    };
    for token in missing {
        match client.token_decimals(token).await {
            Ok(decimals) => prices.write().await.set_decimals(token, decimals),
            Err(e) => warn!(%token, "decimals : {:#}", e),
        }
    }
}

pub async fn price_worker<C, S>(
    client: C,
    source: S,
    config: PriceConfig,
    once: bool,
    orders: SharedState<OrderCache>,
    prices: SharedState<PriceMap>,
    cache_events_tx: Broadcaster<MessageCacheEvent>,
) -> WorkerResult
where
    C: ChainClient,
    S: PriceSource,
{
    loop {
        let referenced = orders.read().await.tokens();
        let pruned = prices.write().await.retain_tokens(|token| referenced.contains(token));
        if pruned > 0 {
            debug!(pruned, "dropped prices of unreferenced tokens");
        }
        let tokens: Vec<Address> = referenced.into_iter().collect();

        if tokens.is_empty() {
            debug!("no tokens to price");
        } else {
            refresh_decimals(&client, &tokens, &prices).await;

            let quotes = fetch_prices_batched(&source, &tokens, config.batch_size, config.batch_delay).await;
            let quoted = quotes.len();
            {
                let mut guard = prices.write().await;
                for (token, usd) in quotes {
                    guard.set_price(token, usd);
                }
                guard.set_updated_at(unix_now());
            }
            info!(tokens = tokens.len(), quoted, "prices updated");

            if cache_events_tx.send(MessageCacheEvent::new_with_source(CacheEvents::PricesUpdated { tokens: quoted }, "PriceActor")).is_err() {
                debug!("PricesUpdated has no receivers");
            }
        }

        if once {
            break;
        }
        tokio::time::sleep(config.interval).await;
    }
    Ok("PriceWorker finished".to_string())
}

/// Periodically prices every token referenced by cached orders.
#[derive(Accessor, Producer)]
pub struct PriceActor<C, S> {
    client: C,
    source: S,
    config: PriceConfig,
    only_once: bool,
    #[accessor]
    orders: Option<SharedState<OrderCache>>,
    #[accessor]
    prices: Option<SharedState<PriceMap>>,
    #[producer]
    cache_events_tx: Option<Broadcaster<MessageCacheEvent>>,
}

impl<C, S> PriceActor<C, S>
where
    C: ChainClient + Clone + 'static,
    S: PriceSource + Clone + 'static,
{
    pub fn new(client: C, source: S) -> Self {
        Self { client, source, config: PriceConfig::default(), only_once: false, orders: None, prices: None, cache_events_tx: None }
    }

    pub fn with_config(self, config: PriceConfig) -> Self {
        Self { config, ..self }
    }

    pub fn only_once(self) -> Self {
        Self { only_once: true, ..self }
    }

    pub fn on_desk(self, desk: &OtcDesk) -> Self {
        Self { orders: Some(desk.orders()), prices: Some(desk.prices()), cache_events_tx: Some(desk.cache_events_channel()), ..self }
    }
}

impl<C, S> Actor for PriceActor<C, S>
where
    C: ChainClient + Clone + 'static,
    S: PriceSource + Clone + 'static,
{
    fn start(&self) -> ActorResult {
        let task = tokio::task::spawn(price_worker(
            self.client.clone(),
            self.source.clone(),
            self.config.clone(),
            self.only_once,
            self.orders.clone().ok_or(eyre!("NO_ORDERS"))?,
            self.prices.clone().ok_or(eyre!("NO_PRICES"))?,
            self.cache_events_tx.clone().ok_or(eyre!("NO_CACHE_EVENTS_TX"))?,
        ));
        Ok(vec![task])
    }

    fn name(&self) -> &'static str {
        "PriceActor"
    }
}
