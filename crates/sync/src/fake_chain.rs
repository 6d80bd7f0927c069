use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use eyre::{eyre, Result};
use futures::StreamExt;
use otc_node::{ChainClient, ChainConnector, OrderEventStream};
use otc_types::{ContractConstants, Order, OrderEvent, OrderEventKind, OrderStatus};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub(crate) fn maker(seed: u64) -> Address {
    Address::with_last_byte(seed as u8)
}

pub(crate) fn created(id: u64, maker_seed: u64) -> OrderEvent {
    OrderEvent::Created(Order {
        id: U256::from(id),
        maker: maker(maker_seed),
        taker: Address::ZERO,
        sell_token: Address::repeat_byte(0xaa),
        sell_amount: U256::from(1_000),
        buy_token: Address::repeat_byte(0xbb),
        buy_amount: U256::from(3_000),
        timestamp: 1_000 + id,
        status: OrderStatus::Active,
        tries: 0,
        order_creation_fee: U256::ZERO,
    })
}

#[derive(Default)]
struct FakeState {
    latest_block: u64,
    logs: Vec<(u64, OrderEvent)>,
    log_queries: usize,
    fail_log_queries: bool,
    failing_connects: usize,
    connects: usize,
    mined_on_subscribe: Vec<(u64, OrderEvent)>,
    live: Vec<mpsc::UnboundedSender<OrderEvent>>,
}

/// In-memory contract: a block-numbered event log plus a live feed.
#[derive(Clone, Default)]
pub(crate) struct FakeChain {
    state: Arc<Mutex<FakeState>>,
}

impl FakeChain {
    pub(crate) fn new(latest_block: u64) -> Self {
        let chain = Self::default();
        chain.state.lock().unwrap().latest_block = latest_block;
        chain
    }

    pub(crate) fn push(&self, block: u64, event: OrderEvent) {
        self.state.lock().unwrap().logs.push((block, event));
    }

    pub(crate) fn log_queries(&self) -> usize {
        self.state.lock().unwrap().log_queries
    }

    pub(crate) fn fail_log_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_log_queries = fail;
    }

    pub(crate) fn fail_next_connects(&self, count: usize) {
        self.state.lock().unwrap().failing_connects = count;
    }

    pub(crate) fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub(crate) fn live_subscribers(&self) -> usize {
        self.state.lock().unwrap().live.iter().filter(|tx| !tx.is_closed()).count()
    }

    /// Mines `event` at `block` while the next live subscription is being opened,
    /// after the history replay has read the latest block.
    pub(crate) fn mine_on_subscribe(&self, block: u64, event: OrderEvent) {
        self.state.lock().unwrap().mined_on_subscribe.push((block, event));
    }

    /// Delivers an event to every open live subscription.
    pub(crate) fn emit(&self, event: OrderEvent) {
        self.state.lock().unwrap().live.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Ends every live subscription.
    pub(crate) fn drop_live(&self) {
        self.state.lock().unwrap().live.clear();
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    fn contract_address(&self) -> Address {
        Address::repeat_byte(0xcc)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().latest_block)
    }

    async fn contract_constants(&self) -> Result<ContractConstants> {
        Ok(ContractConstants::new(600, 300))
    }

    async fn order_events(&self, kind: OrderEventKind, from_block: u64, to_block: u64) -> Result<Vec<OrderEvent>> {
        let mut state = self.state.lock().unwrap();
        state.log_queries += 1;
        if state.fail_log_queries {
            return Err(eyre!("connection reset by peer"));
        }
        Ok(state
            .logs
            .iter()
            .filter(|(block, event)| *block >= from_block && *block <= to_block && event.kind() == kind)
            .map(|(_, event)| event.clone())
            .collect())
    }

    async fn subscribe_order_events(&self, from_block: u64) -> Result<OrderEventStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().unwrap();

        let mined = std::mem::take(&mut state.mined_on_subscribe);
        for (block, event) in mined {
            state.latest_block = state.latest_block.max(block);
            state.logs.push((block, event));
        }

        // Backfill everything from `from_block` up to the head, like the node client does.
        let latest_block = state.latest_block;
        let mut backfill: Vec<_> = state.logs.iter().filter(|(block, _)| *block >= from_block && *block <= latest_block).cloned().collect();
        backfill.sort_by_key(|(block, _)| *block);
        for (_, event) in backfill {
            let _ = tx.send(event);
        }

        state.live.push(tx);
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    async fn token_decimals(&self, _token: Address) -> Result<u8> {
        Ok(18)
    }

    async fn token_balance(&self, _token: Address, _owner: Address) -> Result<U256> {
        Ok(U256::ZERO)
    }

    async fn token_allowance(&self, _token: Address, _owner: Address, _spender: Address) -> Result<U256> {
        Ok(U256::ZERO)
    }
}

#[async_trait]
impl ChainConnector for FakeChain {
    type Client = FakeChain;

    async fn connect(&self) -> Result<FakeChain> {
        let mut state = self.state.lock().unwrap();
        state.connects += 1;
        if state.failing_connects > 0 {
            state.failing_connects -= 1;
            return Err(eyre!("NO_ENDPOINT_AVAILABLE"));
        }
        Ok(self.clone())
    }
}
