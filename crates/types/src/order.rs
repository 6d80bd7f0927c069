use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub type OrderId = U256;

/// Status as recorded by contract events. Expiry is derived, never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr)]
pub enum OrderStatus {
    #[default]
    Active,
    Filled,
    Canceled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Active)
    }

    /// Status only moves forward: `Active -> Filled | Canceled`. Re-applying the same status is allowed.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        *self == next || !self.is_terminal()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub maker: Address,
    pub taker: Address,
    pub sell_token: Address,
    pub sell_amount: U256,
    pub buy_token: Address,
    pub buy_amount: U256,
    pub timestamp: u64,
    pub status: OrderStatus,
    pub tries: u64,
    pub order_creation_fee: U256,
}

impl Order {
    /// A zero taker means anyone may fill.
    pub fn is_open_to_anyone(&self) -> bool {
        self.taker.is_zero()
    }

    pub fn is_taker_allowed(&self, account: Address) -> bool {
        self.is_open_to_anyone() || self.taker == account
    }

    pub fn tokens(&self) -> [Address; 2] {
        [self.sell_token, self.buy_token]
    }
}
