use alloy_primitives::{Address, U256};
use eyre::Result;
use otc_types::Order;

use crate::ChainClient;

/// Whether a taker holds and has approved enough of the order's buy token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FillReadiness {
    pub balance: U256,
    pub allowance: U256,
    pub required: U256,
}

impl FillReadiness {
    /// Reads the taker's buy-token balance and the allowance granted to the OTC contract.
    pub async fn check<C: ChainClient + ?Sized>(client: &C, order: &Order, account: Address) -> Result<Self> {
        let spender = client.contract_address();
        let balance = client.token_balance(order.buy_token, account).await?;
        let allowance = client.token_allowance(order.buy_token, account, spender).await?;
        Ok(Self { balance, allowance, required: order.buy_amount })
    }

    pub fn has_balance(&self) -> bool {
        self.balance >= self.required
    }

    pub fn has_allowance(&self) -> bool {
        self.allowance >= self.required
    }

    pub fn is_ready(&self) -> bool {
        self.has_balance() && self.has_allowance()
    }

    /// Amount still to approve before filling, zero when the allowance already covers it.
    pub fn missing_allowance(&self) -> U256 {
        self.required.saturating_sub(self.allowance)
    }
}
