use std::sync::Arc;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use eyre::Result;
use futures::stream::BoxStream;
use otc_types::{ContractConstants, OrderEvent, OrderEventKind};

pub type OrderEventStream = BoxStream<'static, OrderEvent>;

/// Everything the synchronizer needs from the chain. Implemented over alloy for production and
/// by in-memory fakes in tests.
#[async_trait]
pub trait ChainClient: Send + Sync {
    fn contract_address(&self) -> Address;

    async fn block_number(&self) -> Result<u64>;

    /// `ORDER_EXPIRY` and `GRACE_PERIOD`.
    async fn contract_constants(&self) -> Result<ContractConstants>;

    /// Events of one kind in `from_block..=to_block`, in chain order.
    async fn order_events(&self, kind: OrderEventKind, from_block: u64, to_block: u64) -> Result<Vec<OrderEvent>>;

    /// Live events of every kind starting at `from_block`.
    async fn subscribe_order_events(&self, from_block: u64) -> Result<OrderEventStream>;

    async fn token_decimals(&self, token: Address) -> Result<u8>;

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256>;

    async fn token_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;
}

/// Produces a connected `ChainClient`. Called again on every initialization attempt.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    type Client: ChainClient + Clone + 'static;

    async fn connect(&self) -> Result<Self::Client>;
}

#[async_trait]
impl<C: ChainClient + ?Sized> ChainClient for Arc<C> {
    fn contract_address(&self) -> Address {
        (**self).contract_address()
    }

    async fn block_number(&self) -> Result<u64> {
        (**self).block_number().await
    }

    async fn contract_constants(&self) -> Result<ContractConstants> {
        (**self).contract_constants().await
    }

    async fn order_events(&self, kind: OrderEventKind, from_block: u64, to_block: u64) -> Result<Vec<OrderEvent>> {
        (**self).order_events(kind, from_block, to_block).await
    }

    async fn subscribe_order_events(&self, from_block: u64) -> Result<OrderEventStream> {
        (**self).subscribe_order_events(from_block).await
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        (**self).token_decimals(token).await
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        (**self).token_balance(token, owner).await
    }

    async fn token_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        (**self).token_allowance(token, owner, spender).await
    }
}
