use alloy_primitives::utils::format_units;
use alloy_primitives::U256;
use otc_types::{Order, PriceMap};

const DEFAULT_DECIMALS: u8 = 18;

/// Display metric for an order: USD value received by the maker over USD value given.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DealMetric {
    pub sell_usd: f64,
    pub buy_usd: f64,
    /// `None` when the sell side is worth nothing.
    pub ratio: Option<f64>,
    /// A price or decimals value was missing and a fallback was used.
    pub estimated: bool,
}

fn to_units(amount: U256, decimals: u8) -> f64 {
    format_units(amount, decimals).ok().and_then(|s| s.parse::<f64>().ok()).unwrap_or_default()
}

fn usd_value(amount: U256, token: &alloy_primitives::Address, prices: &PriceMap) -> (f64, bool) {
    let price = prices.price(token);
    let (decimals, decimals_missing) = match prices.decimals(token) {
        Some(decimals) => (decimals, false),
        None => (DEFAULT_DECIMALS, true),
    };
    (to_units(amount, decimals) * price.usd, price.estimated || decimals_missing)
}

pub fn deal_metric(order: &Order, prices: &PriceMap) -> DealMetric {
    let (sell_usd, sell_estimated) = usd_value(order.sell_amount, &order.sell_token, prices);
    let (buy_usd, buy_estimated) = usd_value(order.buy_amount, &order.buy_token, prices);
    let ratio = (sell_usd > 0.0).then(|| buy_usd / sell_usd);
    DealMetric { sell_usd, buy_usd, ratio, estimated: sell_estimated || buy_estimated }
}
