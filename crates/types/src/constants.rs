use serde::{Deserialize, Serialize};

/// Durations read once from the contract, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConstants {
    pub order_expiry: u64,
    pub grace_period: u64,
}

impl ContractConstants {
    pub fn new(order_expiry: u64, grace_period: u64) -> Self {
        Self { order_expiry, grace_period }
    }
}
