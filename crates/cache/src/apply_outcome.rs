use otc_events::CacheEvents;
use otc_types::{Order, OrderId, OrderStatus};
use strum_macros::Display;

#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum IgnoreReason {
    UnknownOrder,
    Duplicate,
    StatusRegression { current: OrderStatus, attempted: OrderStatus },
}

/// What a single event did to the cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Inserted(Order),
    Updated(OrderId),
    StatusChanged { id: OrderId, status: OrderStatus },
    Removed(OrderId),
    Replaced { old_id: OrderId, new_id: OrderId, tries: u64 },
    Ignored { id: OrderId, reason: IgnoreReason },
}

impl ApplyOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, ApplyOutcome::Ignored { .. })
    }

    /// The notification readers should see, if the cache changed.
    pub fn cache_event(&self) -> Option<CacheEvents> {
        match self {
            ApplyOutcome::Inserted(order) => Some(CacheEvents::OrderCreated { id: order.id, maker: order.maker }),
            ApplyOutcome::StatusChanged { id, status: OrderStatus::Filled } => Some(CacheEvents::OrderFilled { id: *id }),
            ApplyOutcome::StatusChanged { id, status: OrderStatus::Canceled } => Some(CacheEvents::OrderCanceled { id: *id }),
            ApplyOutcome::Removed(id) => Some(CacheEvents::OrderCleanedUp { id: *id }),
            ApplyOutcome::Replaced { old_id, new_id, tries } => {
                Some(CacheEvents::OrderRetried { old_id: *old_id, new_id: *new_id, tries: *tries })
            }
            ApplyOutcome::StatusChanged { status: OrderStatus::Active, .. } | ApplyOutcome::Updated(_) | ApplyOutcome::Ignored { .. } => None,
        }
    }
}
