use alloy_primitives::Address;
use otc_types::{OrderId, SyncState};
use strum_macros::{Display, EnumDiscriminants, EnumIter};

use crate::Message;

/// Notifications published after the cache or the synchronizer changed.
#[derive(Clone, Debug, PartialEq, Eq, EnumDiscriminants)]
#[strum_discriminants(name(CacheEventKind), derive(Hash, Display, EnumIter))]
pub enum CacheEvents {
    /// A full history replay finished; `count` is zero when it failed.
    OrdersSynced { count: usize },
    OrderCreated { id: OrderId, maker: Address },
    OrderFilled { id: OrderId },
    OrderCanceled { id: OrderId },
    OrderCleanedUp { id: OrderId },
    OrderRetried { old_id: OrderId, new_id: OrderId, tries: u64 },
    SyncStateChanged { state: SyncState },
    SyncFailed { reason: String },
    PricesUpdated { tokens: usize },
}

impl CacheEvents {
    pub fn kind(&self) -> CacheEventKind {
        self.into()
    }
}

pub type MessageCacheEvent = Message<CacheEvents>;

#[cfg(test)]
mod test {
    use alloy_primitives::U256;

    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(CacheEvents::OrderFilled { id: U256::from(1) }.kind(), CacheEventKind::OrderFilled);
        assert_eq!(CacheEvents::OrdersSynced { count: 0 }.kind().to_string(), "OrdersSynced");
    }
}
