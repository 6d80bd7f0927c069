use std::collections::HashMap;
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use eyre::{eyre, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// USD quotes for the tokens the source knows. Unknown tokens are simply absent.
    async fn fetch_usd_prices(&self, tokens: &[Address]) -> Result<HashMap<Address, f64>>;
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    usd: Option<f64>,
}

/// CoinGecko-compatible `simple/token_price/{platform}` endpoint.
#[derive(Clone)]
pub struct HttpPriceSource {
    client: Client,
    base_url: Url,
    platform: String,
}

impl HttpPriceSource {
    pub fn new(base_url: Url, platform: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self { client, base_url, platform: platform.to_string() })
    }

    fn request_url(&self, tokens: &[Address]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| eyre!("PRICE_URL_CANNOT_BE_BASE"))?
            .pop_if_empty()
            .extend(["simple", "token_price", self.platform.as_str()]);

        let addresses = tokens.iter().map(|t| t.to_string().to_lowercase()).collect::<Vec<_>>().join(",");
        url.query_pairs_mut().append_pair("contract_addresses", &addresses).append_pair("vs_currencies", "usd");
        Ok(url)
    }
}

fn parse_quotes(quotes: HashMap<String, UsdQuote>) -> HashMap<Address, f64> {
    quotes
        .into_iter()
        .filter_map(|(address, quote)| match (address.parse::<Address>(), quote.usd) {
            (Ok(address), Some(usd)) => Some((address, usd)),
            _ => {
                trace!(%address, "unusable quote");
                None
            }
        })
        .collect()
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch_usd_prices(&self, tokens: &[Address]) -> Result<HashMap<Address, f64>> {
        if tokens.is_empty() {
            return Ok(HashMap::new());
        }
        let url = self.request_url(tokens)?;
        debug!(%url, tokens = tokens.len(), "fetching prices");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("price api returned {}: {}", status, body));
        }
        let quotes: HashMap<String, UsdQuote> = response.json().await?;
        Ok(parse_quotes(quotes))
    }
}
