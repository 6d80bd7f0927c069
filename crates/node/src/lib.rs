pub use alloy_client::AlloyChainClient;
pub use block_ranges::block_ranges;
pub use calldata::{encode_approve, encode_cancel_order, encode_cleanup_orders, encode_fill_order};
pub use chain_client::{ChainClient, ChainConnector, OrderEventStream};
pub use decode::{decode_order_log, event_signature, DecodeError};
pub use endpoints::{connect_with_fallback, ConnectedEndpoint, Endpoint, EndpointConnector};
pub use fill_readiness::FillReadiness;
pub use rate_limiter::{RateLimiter, RateLimiterConfig};

mod alloy_client;
mod block_ranges;
mod calldata;
mod chain_client;
mod decode;
mod endpoints;
mod fill_readiness;
mod rate_limiter;
