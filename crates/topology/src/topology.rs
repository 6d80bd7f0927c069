use std::time::Duration;

use eyre::Result;
use otc_actors::{Actor, ActorsManager};
use otc_desk::OtcDesk;
use otc_node::{ChainConnector, EndpointConnector, RateLimiter, RateLimiterConfig};
use otc_price::{HttpPriceSource, PriceActor};
use otc_sync::{NotifierActor, OrderSyncActor};
use tracing::{error, info, warn};

use crate::topology_config::TopologyConfig;

/// Builds the desk and the actors around it from a `TopologyConfig`.
pub struct Topology {
    config: TopologyConfig,
    desk: OtcDesk,
    connector: EndpointConnector,
}

impl Topology {
    pub fn from_config(config: TopologyConfig) -> Result<Topology> {
        let endpoints = config.endpoints();
        if endpoints.is_empty() {
            return Err(eyre::eyre!("NO_CLIENTS_CONFIGURED"));
        }

        let limiter = RateLimiter::new(RateLimiterConfig::from(&config.limiter));
        let connector = EndpointConnector::new(endpoints, config.contract.address, limiter)
            .with_connect_timeout(Duration::from_millis(config.sync.connect_timeout_ms))
            .with_poll_interval(Duration::from_millis(config.sync.poll_interval_ms))
            .with_max_poll_failures(config.sync.max_poll_failures)
            .with_max_block_range(config.contract.max_block_range);

        let desk = OtcDesk::new(config.contract.address);
        Ok(Topology { config, desk, connector })
    }

    pub fn desk(&self) -> &OtcDesk {
        &self.desk
    }

    /// Starts the notifier, the synchronizer and, when enabled and a node is reachable, the price actor.
    pub async fn start(&self) -> Result<ActorsManager> {
        let mut manager = ActorsManager::new();

        info!("Starting notifier actor");
        manager.start(NotifierActor::on_desk(&self.desk))?;

        info!(contract = %self.desk.contract(), "Starting order sync actor");
        manager.start(OrderSyncActor::new(self.connector.clone()).with_config(self.config.order_sync_config()).on_desk(&self.desk))?;

        if self.config.price.enabled {
            match self.start_price_actor().await {
                Ok(price_actor) => manager.start(price_actor)?,
                Err(e) => warn!("Price actor not started : {:#}", e),
            }
        }

        Ok(manager)
    }

    async fn start_price_actor(&self) -> Result<impl Actor> {
        let source = HttpPriceSource::new(self.config.price.url.parse()?, &self.config.price.platform)?;
        let client = self.connector.connect().await.inspect_err(|e| error!("price actor client : {:#}", e))?;
        info!(platform = %self.config.price.platform, "Starting price actor");
        Ok(PriceActor::new(client, source).with_config((&self.config.price).into()).on_desk(&self.desk))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_requires_clients() -> Result<()> {
        let config: TopologyConfig = toml::from_str(
            r#"
[clients]

[contract]
address = "0x00000000000000000000000000000000000000cc"
"#,
        )?;
        assert!(Topology::from_config(config).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_desk_wiring() -> Result<()> {
        let config: TopologyConfig = toml::from_str(
            r#"
[clients]
local = "http://127.0.0.1:1"

[contract]
address = "0x00000000000000000000000000000000000000cc"

[price]
enabled = false
"#,
        )?;
        let topology = Topology::from_config(config)?;
        assert_eq!(topology.desk().contract(), alloy_primitives::Address::with_last_byte(0xcc));
        assert!(topology.desk().get_orders(None).await.is_empty());
        Ok(())
    }
}
