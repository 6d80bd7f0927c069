use std::collections::HashMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenPrice {
    pub usd: f64,
    /// Set when no quote was available and `usd` is the unit fallback.
    pub estimated: bool,
}

impl TokenPrice {
    pub const FALLBACK: TokenPrice = TokenPrice { usd: 1.0, estimated: true };

    pub fn quoted(usd: f64) -> Self {
        Self { usd, estimated: false }
    }
}

/// USD quotes and ERC20 decimals of the tokens referenced by cached orders.
/// `Address` compares case-insensitively, so keys are effectively lowercased.
#[derive(Clone, Debug, Default)]
pub struct PriceMap {
    prices: HashMap<Address, f64>,
    decimals: HashMap<Address, u8>,
    updated_at: Option<u64>,
}

impl PriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn set_price(&mut self, token: Address, usd: f64) {
        self.prices.insert(token, usd);
    }

    /// Quoted price, or `TokenPrice::FALLBACK` when the token has none.
    pub fn price(&self, token: &Address) -> TokenPrice {
        match self.prices.get(token) {
            Some(usd) if usd.is_finite() && *usd > 0.0 => TokenPrice::quoted(*usd),
            _ => TokenPrice::FALLBACK,
        }
    }

    pub fn has_price(&self, token: &Address) -> bool {
        self.prices.contains_key(token)
    }

    pub fn set_decimals(&mut self, token: Address, decimals: u8) {
        self.decimals.insert(token, decimals);
    }

    pub fn decimals(&self, token: &Address) -> Option<u8> {
        self.decimals.get(token).copied()
    }

    /// Drops quotes and decimals of tokens for which `keep` is false. Returns how many tokens went.
    pub fn retain_tokens(&mut self, keep: impl Fn(&Address) -> bool) -> usize {
        let before = self.prices.len() + self.decimals.len();
        self.prices.retain(|token, _| keep(token));
        self.decimals.retain(|token, _| keep(token));
        before - self.prices.len() - self.decimals.len()
    }

    pub fn updated_at(&self) -> Option<u64> {
        self.updated_at
    }

    pub fn set_updated_at(&mut self, timestamp: u64) {
        self.updated_at = Some(timestamp)
    }
}
