pub use constants::ContractConstants;
pub use derived::{can_cancel_order, can_cleanup_order, can_fill_order, derive_status, expires_at, time_until_expiry, unix_now, DerivedStatus};
pub use order::{Order, OrderId, OrderStatus};
pub use order_event::{OrderEvent, OrderEventKind};
pub use price::{PriceMap, TokenPrice};
pub use sync_state::SyncState;

mod constants;
mod derived;
mod order;
mod order_event;
mod price;
mod sync_state;
