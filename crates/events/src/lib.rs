pub use cache_events::{CacheEventKind, CacheEvents, MessageCacheEvent};
pub use message::Message;
pub use subscriptions::{Callback, SubscriptionId, SubscriptionRegistry};

mod cache_events;
mod message;
mod subscriptions;
