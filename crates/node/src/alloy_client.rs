use std::marker::PhantomData;
use std::time::Duration;

use alloy_network::Ethereum;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{Filter, Log};
use alloy_transport::{Transport, TransportError};
use async_trait::async_trait;
use eyre::{eyre, Result};
use futures::{stream, Stream, StreamExt};
use otc_abi::{IOtcSwap, IERC20};
use otc_errors::CodedError;
use otc_types::{ContractConstants, OrderEvent, OrderEventKind};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, warn};

use crate::chain_client::{ChainClient, OrderEventStream};
use crate::decode::{decode_order_log, event_signature};
use crate::{block_ranges, RateLimiter};

/// Keeps the JSON-RPC error code so the classifier can see it.
fn rpc_error(error: TransportError) -> eyre::Report {
    match error.as_error_resp() {
        Some(payload) => eyre::Report::new(CodedError::new(payload.code, payload.message.to_string())),
        None => eyre::Report::new(error),
    }
}

fn contract_error(error: alloy_contract::Error) -> eyre::Report {
    match error {
        alloy_contract::Error::TransportError(e) => rpc_error(e),
        other => eyre!(other),
    }
}

fn decode_or_skip(log: &Log) -> Option<OrderEvent> {
    match decode_order_log(log) {
        Ok(event) => Some(event),
        Err(error) => {
            warn!(block_number = ?log.block_number, %error, "skipping undecodable log");
            None
        }
    }
}

fn decode_logs(logs: &[Log]) -> Vec<OrderEvent> {
    logs.iter().filter_map(decode_or_skip).collect()
}

/// Decodes the backfilled gap logs followed by the live subscription into one event stream.
fn backfilled_stream<S>(backfill: Vec<Log>, live: S) -> OrderEventStream
where
    S: Stream<Item = Log> + Send + 'static,
{
    stream::iter(backfill).chain(live).filter_map(|log| async move { decode_or_skip(&log) }).boxed()
}

/// `ChainClient` over an alloy provider. Every call goes through the shared `RateLimiter`.
#[derive(Clone)]
pub struct AlloyChainClient<P, T> {
    provider: P,
    contract: Address,
    limiter: RateLimiter,
    pubsub: bool,
    poll_interval: Duration,
    max_block_range: u64,
    max_poll_failures: u32,
    _t: PhantomData<T>,
}

impl<P, T> AlloyChainClient<P, T>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Send + Sync + Clone + 'static,
{
    pub fn new(provider: P, contract: Address, limiter: RateLimiter) -> Self {
        Self {
            provider,
            contract,
            limiter,
            pubsub: false,
            poll_interval: Duration::from_secs(12),
            max_block_range: 10_000,
            max_poll_failures: 5,
            _t: PhantomData,
        }
    }

    /// Live events through `eth_subscribe` instead of polling.
    pub fn with_pubsub(self, pubsub: bool) -> Self {
        Self { pubsub, ..self }
    }

    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Self { poll_interval, ..self }
    }

    /// Widest block span requested by a single `eth_getLogs`.
    pub fn with_max_block_range(self, max_block_range: u64) -> Self {
        Self { max_block_range, ..self }
    }

    /// Consecutive failed polls after which the live stream ends.
    pub fn with_max_poll_failures(self, max_poll_failures: u32) -> Self {
        Self { max_poll_failures, ..self }
    }

    fn all_events_filter(&self) -> Filter {
        let signatures: Vec<_> = OrderEventKind::REPLAY_ORDER.into_iter().map(event_signature).collect();
        Filter::new().address(self.contract).event_signature(signatures)
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>> {
        self.limiter.run("eth_getLogs", || async { self.provider.get_logs(filter).await.map_err(rpc_error) }).await
    }

    /// Logs of every order event kind in `from_block..=to_block`, in chain order.
    async fn all_logs(&self, from_block: u64, to_block: u64) -> Result<Vec<Log>> {
        let mut logs = Vec::new();
        for (start, end) in block_ranges(from_block, to_block, self.max_block_range) {
            logs.extend(self.get_logs(&self.all_events_filter().from_block(start).to_block(end)).await?);
        }
        Ok(logs)
    }

    /// Subscribes first, then fetches what was mined between `from_block` and the subscription.
    /// Logs in both parts are re-applied as duplicates.
    async fn subscribe_pubsub(&self, from_block: u64) -> Result<OrderEventStream> {
        let subscription = self.provider.subscribe_logs(&self.all_events_filter()).await.map_err(rpc_error)?;
        let latest = self.block_number().await?;
        let backfill = self.all_logs(from_block, latest).await?;
        debug!(from_block, latest, logs = backfill.len(), "backfilled logs ahead of subscription");
        Ok(backfilled_stream(backfill, subscription.into_stream()))
    }

    /// Polls `eth_getLogs` every `poll_interval`. The stream ends after `max_poll_failures`
    /// consecutive failures so the caller can reconnect elsewhere.
    fn subscribe_polling(&self, from_block: u64) -> OrderEventStream {
        let (tx, rx) = mpsc::channel(1000);
        let client = self.clone();
        let max_failures = self.max_poll_failures.max(1);

        tokio::task::spawn(async move {
            let mut next_block = from_block;
            let mut failures = 0u32;
            loop {
                tokio::time::sleep(client.poll_interval).await;
                if tx.is_closed() {
                    debug!("live event receiver dropped, stopping poller");
                    break;
                }

                let polled = async {
                    let latest = client.block_number().await?;
                    let logs = client.all_logs(next_block, latest).await?;
                    Ok::<_, eyre::Report>((latest, logs))
                }
                .await;

                match polled {
                    Ok((latest, logs)) => {
                        failures = 0;
                        for event in decode_logs(&logs) {
                            if tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        next_block = next_block.max(latest.saturating_add(1));
                    }
                    Err(error) => {
                        failures += 1;
                        error!(from_block = next_block, failures, "poll failed : {:#}", error);
                        if failures >= max_failures {
                            warn!(failures, "node unreachable, ending live event stream");
                            return;
                        }
                    }
                }
            }
        });

        ReceiverStream::new(rx).boxed()
    }
}

#[async_trait]
impl<P, T> ChainClient for AlloyChainClient<P, T>
where
    T: Transport + Clone,
    P: Provider<T, Ethereum> + Send + Sync + Clone + 'static,
{
    fn contract_address(&self) -> Address {
        self.contract
    }

    async fn block_number(&self) -> Result<u64> {
        self.limiter.run("eth_blockNumber", || async { self.provider.get_block_number().await.map_err(rpc_error) }).await
    }

    async fn contract_constants(&self) -> Result<ContractConstants> {
        let contract = IOtcSwap::new(self.contract, self.provider.clone());
        let order_expiry = self.limiter.run("ORDER_EXPIRY", || async { contract.ORDER_EXPIRY().call().await.map_err(contract_error) }).await?._0;
        let grace_period = self.limiter.run("GRACE_PERIOD", || async { contract.GRACE_PERIOD().call().await.map_err(contract_error) }).await?._0;
        Ok(ContractConstants::new(order_expiry.saturating_to(), grace_period.saturating_to()))
    }

    async fn order_events(&self, kind: OrderEventKind, from_block: u64, to_block: u64) -> Result<Vec<OrderEvent>> {
        let filter = Filter::new().address(self.contract).event_signature(event_signature(kind)).from_block(from_block).to_block(to_block);
        let logs = self.get_logs(&filter).await?;
        debug!(%kind, from_block, to_block, logs = logs.len(), "fetched logs");
        Ok(decode_logs(&logs))
    }

    async fn subscribe_order_events(&self, from_block: u64) -> Result<OrderEventStream> {
        if self.pubsub {
            self.subscribe_pubsub(from_block).await
        } else {
            Ok(self.subscribe_polling(from_block))
        }
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        let erc20 = IERC20::new(token, self.provider.clone());
        Ok(self.limiter.run("decimals", || async { erc20.decimals().call().await.map_err(contract_error) }).await?._0)
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        let erc20 = IERC20::new(token, self.provider.clone());
        Ok(self.limiter.run("balanceOf", || async { erc20.balanceOf(owner).call().await.map_err(contract_error) }).await?._0)
    }

    async fn token_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        let erc20 = IERC20::new(token, self.provider.clone());
        Ok(self.limiter.run("allowance", || async { erc20.allowance(owner, spender).call().await.map_err(contract_error) }).await?._0)
    }
}
