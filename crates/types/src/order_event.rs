use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::{Order, OrderId};

/// The five contract events, in the order a history replay applies them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize)]
pub enum OrderEventKind {
    Created,
    Filled,
    Canceled,
    CleanedUp,
    Retry,
}

impl OrderEventKind {
    pub const REPLAY_ORDER: [OrderEventKind; 5] =
        [OrderEventKind::Created, OrderEventKind::Filled, OrderEventKind::Canceled, OrderEventKind::CleanedUp, OrderEventKind::Retry];
}

/// A decoded contract event. Created carries the full record, the rest reference an existing id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    Created(Order),
    Filled { id: OrderId, taker: Address, timestamp: u64 },
    Canceled { id: OrderId, timestamp: u64 },
    CleanedUp { id: OrderId, timestamp: u64 },
    Retry { old_id: OrderId, new_id: OrderId, maker: Address, tries: u64, timestamp: u64 },
}

impl OrderEvent {
    pub fn kind(&self) -> OrderEventKind {
        match self {
            OrderEvent::Created(_) => OrderEventKind::Created,
            OrderEvent::Filled { .. } => OrderEventKind::Filled,
            OrderEvent::Canceled { .. } => OrderEventKind::Canceled,
            OrderEvent::CleanedUp { .. } => OrderEventKind::CleanedUp,
            OrderEvent::Retry { .. } => OrderEventKind::Retry,
        }
    }

    /// The id the event acts on. For a retry this is the superseded id.
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderEvent::Created(order) => order.id,
            OrderEvent::Filled { id, .. } | OrderEvent::Canceled { id, .. } | OrderEvent::CleanedUp { id, .. } => *id,
            OrderEvent::Retry { old_id, .. } => *old_id,
        }
    }
}

#[cfg(test)]
mod test {
    use alloy_primitives::U256;

    use super::*;

    #[test]
    fn test_replay_order_is_sorted() {
        let mut sorted = OrderEventKind::REPLAY_ORDER;
        sorted.sort();
        assert_eq!(sorted, OrderEventKind::REPLAY_ORDER);
    }

    #[test]
    fn test_retry_targets_old_id() {
        let event = OrderEvent::Retry { old_id: U256::from(1), new_id: U256::from(2), maker: Address::ZERO, tries: 1, timestamp: 0 };
        assert_eq!(event.kind(), OrderEventKind::Retry);
        assert_eq!(event.order_id(), U256::from(1));
    }
}
