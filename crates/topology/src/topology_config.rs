use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;

use alloy_primitives::Address;
use eyre::Result;
use otc_errors::RetryPolicy;
use otc_node::{Endpoint, RateLimiterConfig};
use otc_price::PriceConfig;
use otc_sync::OrderSyncConfig;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfigParams {
    pub url: String,
    pub priority: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ClientConfig {
    String(String),
    Params(ClientConfigParams),
}

impl ClientConfig {
    pub fn url(&self) -> String {
        match &self {
            Self::String(s) => s.clone(),
            ClientConfig::Params(p) => p.url.clone(),
        }
    }

    pub fn priority(&self) -> Option<u32> {
        match &self {
            Self::String(_) => None,
            ClientConfig::Params(p) => p.priority,
        }
    }
}

fn default_history_days() -> u64 {
    20
}

fn default_block_time_secs() -> u64 {
    12
}

fn default_max_block_range() -> u64 {
    10_000
}

#[derive(Clone, Debug, Deserialize)]
pub struct ContractConfig {
    pub address: Address,
    #[serde(default = "default_history_days")]
    pub history_days: u64,
    #[serde(default = "default_block_time_secs")]
    pub block_time_secs: u64,
    #[serde(default = "default_max_block_range")]
    pub max_block_range: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    pub max_concurrent: usize,
    pub min_spacing_ms: u64,
    pub cooldown_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self { max_concurrent: 4, min_spacing_ms: 250, cooldown_ms: 2000, request_timeout_ms: 15000 }
    }
}

impl From<&LimiterConfig> for RateLimiterConfig {
    fn from(value: &LimiterConfig) -> Self {
        RateLimiterConfig {
            max_concurrent: value.max_concurrent,
            min_spacing: Duration::from_millis(value.min_spacing_ms),
            cooldown: Duration::from_millis(value.cooldown_ms),
            request_timeout: Duration::from_millis(value.request_timeout_ms),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub max_init_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub connect_timeout_ms: u64,
    /// Live log polling interval for HTTP endpoints.
    pub poll_interval_ms: u64,
    /// Consecutive failed polls before the synchronizer reconnects.
    pub max_poll_failures: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { max_init_attempts: 5, base_delay_ms: 1000, max_delay_ms: 30000, connect_timeout_ms: 10000, poll_interval_ms: 12000, max_poll_failures: 5 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PriceSourceConfig {
    pub enabled: bool,
    pub url: String,
    pub platform: String,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub interval_secs: u64,
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://api.coingecko.com/api/v3".to_string(),
            platform: "ethereum".to_string(),
            batch_size: 30,
            batch_delay_ms: 1500,
            interval_secs: 300,
        }
    }
}

impl From<&PriceSourceConfig> for PriceConfig {
    fn from(value: &PriceSourceConfig) -> Self {
        PriceConfig {
            batch_size: value.batch_size,
            batch_delay: Duration::from_millis(value.batch_delay_ms),
            interval: Duration::from_secs(value.interval_secs),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TopologyConfig {
    pub clients: BTreeMap<String, ClientConfig>,
    pub contract: ContractConfig,
    #[serde(default)]
    pub limiter: LimiterConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub price: PriceSourceConfig,
}

impl TopologyConfig {
    pub fn load_from_file(file_name: String) -> Result<TopologyConfig> {
        let contents = fs::read_to_string(file_name)?;
        let config: TopologyConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Clients without an explicit priority are tried after the prioritized ones, in name order.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        let unprioritized_base = self.clients.values().filter_map(|c| c.priority()).max().map_or(0, |p| p.saturating_add(1));
        self.clients
            .iter()
            .enumerate()
            .map(|(idx, (name, client))| {
                let priority = client.priority().unwrap_or(unprioritized_base.saturating_add(idx as u32));
                Endpoint::new(name, &client.url(), priority)
            })
            .collect()
    }

    pub fn order_sync_config(&self) -> OrderSyncConfig {
        OrderSyncConfig {
            history_days: self.contract.history_days,
            block_time_secs: self.contract.block_time_secs,
            max_block_range: self.contract.max_block_range,
            init_retry: RetryPolicy::new(
                self.sync.max_init_attempts,
                Duration::from_millis(self.sync.base_delay_ms),
                Duration::from_millis(self.sync.max_delay_ms),
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const FULL: &str = r#"
[clients]
primary = { url = "wss://rpc.example/ws", priority = 0 }
backup = "https://rpc.example"

[contract]
address = "0x00000000000000000000000000000000000000cc"
history_days = 10
block_time_secs = 2
max_block_range = 5000

[limiter]
max_concurrent = 2
min_spacing_ms = 100

[sync]
max_init_attempts = 3
max_poll_failures = 2

[price]
enabled = false
batch_size = 10
"#;

    #[test]
    fn test_parse_full() -> Result<()> {
        let config: TopologyConfig = toml::from_str(FULL)?;

        assert_eq!(config.contract.address, Address::with_last_byte(0xcc));
        assert_eq!(config.limiter.max_concurrent, 2);
        assert_eq!(config.limiter.cooldown_ms, 2000);
        assert!(!config.price.enabled);
        assert_eq!(config.price.batch_size, 10);
        assert_eq!(config.price.platform, "ethereum");

        let sync = config.order_sync_config();
        assert_eq!(sync.history_window_blocks(), 10 * 86_400 / 2);
        assert_eq!(sync.max_block_range, 5000);
        assert_eq!(sync.init_retry.max_attempts, 3);
        assert_eq!(config.sync.max_poll_failures, 2);
        assert_eq!(config.sync.poll_interval_ms, 12000);

        let limiter = RateLimiterConfig::from(&config.limiter);
        assert_eq!(limiter.min_spacing, Duration::from_millis(100));
        Ok(())
    }

    #[test]
    fn test_endpoints_ordering() -> Result<()> {
        let config: TopologyConfig = toml::from_str(FULL)?;
        let mut endpoints = config.endpoints();
        endpoints.sort_by_key(|e| e.priority);

        assert_eq!(endpoints[0].name, "primary");
        assert!(endpoints[0].is_pubsub());
        assert_eq!(endpoints[1].name, "backup");
        assert_eq!(endpoints[1].url, "https://rpc.example");
        assert!(endpoints[1].priority > 0);
        Ok(())
    }

    #[test]
    fn test_minimal_config_uses_defaults() -> Result<()> {
        let config: TopologyConfig = toml::from_str(
            r#"
[clients]
local = "ws://127.0.0.1:8545"

[contract]
address = "0x00000000000000000000000000000000000000cc"
"#,
        )?;
        assert_eq!(config.contract.history_days, 20);
        assert_eq!(config.sync.max_init_attempts, 5);
        assert_eq!(config.sync.max_poll_failures, 5);
        assert!(config.price.enabled);
        assert_eq!(config.order_sync_config(), OrderSyncConfig::default());
        Ok(())
    }

    #[test]
    fn test_missing_contract_is_rejected() {
        assert!(toml::from_str::<TopologyConfig>("[clients]\nlocal = \"ws://127.0.0.1:8545\"\n").is_err());
    }
}
