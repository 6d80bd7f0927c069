pub use deal::{deal_metric, DealMetric};
pub use price_actor::{fetch_prices_batched, PriceActor, PriceConfig};
pub use price_source::{HttpPriceSource, PriceSource};

mod deal;
mod price_actor;
mod price_source;
