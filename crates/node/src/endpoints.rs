use std::time::Duration;

use alloy_primitives::Address;
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::{ClientBuilder, WsConnect};
use alloy_transport::BoxTransport;
use async_trait::async_trait;
use eyre::{eyre, Result};
use tracing::{info, warn};
use url::Url;

use crate::{AlloyChainClient, ChainConnector, RateLimiter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    /// Lower is tried first.
    pub priority: u32,
}

impl Endpoint {
    pub fn new(name: &str, url: &str, priority: u32) -> Self {
        Self { name: name.to_string(), url: url.to_string(), priority }
    }

    pub fn is_pubsub(&self) -> bool {
        self.url.starts_with("ws://") || self.url.starts_with("wss://")
    }
}

#[derive(Clone)]
pub struct ConnectedEndpoint {
    pub endpoint: Endpoint,
    pub provider: RootProvider<BoxTransport>,
    pub block_number: u64,
}

async fn connect(endpoint: &Endpoint) -> Result<RootProvider<BoxTransport>> {
    let client = if endpoint.is_pubsub() {
        ClientBuilder::default().ws(WsConnect::new(endpoint.url.clone())).await?.boxed()
    } else {
        let url: Url = endpoint.url.parse()?;
        ClientBuilder::default().http(url).boxed()
    };
    Ok(RootProvider::new(client))
}

/// Tries endpoints in priority order and returns the first that answers `eth_blockNumber` within `connect_timeout`.
pub async fn connect_with_fallback(endpoints: &[Endpoint], connect_timeout: Duration) -> Result<ConnectedEndpoint> {
    let mut ordered: Vec<&Endpoint> = endpoints.iter().collect();
    ordered.sort_by_key(|e| e.priority);

    for endpoint in ordered {
        let attempt = async {
            let provider = connect(endpoint).await?;
            let block_number = provider.get_block_number().await?;
            Ok::<_, eyre::Report>((provider, block_number))
        };

        match tokio::time::timeout(connect_timeout, attempt).await {
            Ok(Ok((provider, block_number))) => {
                info!(name = %endpoint.name, url = %endpoint.url, block_number, "connected");
                return Ok(ConnectedEndpoint { endpoint: endpoint.clone(), provider, block_number });
            }
            Ok(Err(error)) => warn!(name = %endpoint.name, url = %endpoint.url, "endpoint failed : {:#}", error),
            Err(_) => warn!(name = %endpoint.name, url = %endpoint.url, "endpoint timed out"),
        }
    }

    Err(eyre!("NO_ENDPOINT_AVAILABLE: tried {} endpoints", endpoints.len()))
}

/// Connects to the first healthy endpoint and wraps it in a rate limited `AlloyChainClient`.
/// WebSocket endpoints receive live events by subscription, HTTP endpoints by polling.
#[derive(Clone)]
pub struct EndpointConnector {
    endpoints: Vec<Endpoint>,
    contract: Address,
    limiter: RateLimiter,
    connect_timeout: Duration,
    poll_interval: Duration,
    max_poll_failures: u32,
    max_block_range: u64,
}

impl EndpointConnector {
    pub fn new(endpoints: Vec<Endpoint>, contract: Address, limiter: RateLimiter) -> Self {
        Self {
            endpoints,
            contract,
            limiter,
            connect_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(12),
            max_poll_failures: 5,
            max_block_range: 10_000,
        }
    }

    pub fn with_connect_timeout(self, connect_timeout: Duration) -> Self {
        Self { connect_timeout, ..self }
    }

    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Self { poll_interval, ..self }
    }

    pub fn with_max_poll_failures(self, max_poll_failures: u32) -> Self {
        Self { max_poll_failures, ..self }
    }

    pub fn with_max_block_range(self, max_block_range: u64) -> Self {
        Self { max_block_range, ..self }
    }
}

#[async_trait]
impl ChainConnector for EndpointConnector {
    type Client = AlloyChainClient<RootProvider<BoxTransport>, BoxTransport>;

    async fn connect(&self) -> Result<Self::Client> {
        let connected = connect_with_fallback(&self.endpoints, self.connect_timeout).await?;
        Ok(AlloyChainClient::new(connected.provider, self.contract, self.limiter.clone())
            .with_pubsub(connected.endpoint.is_pubsub())
            .with_poll_interval(self.poll_interval)
            .with_max_poll_failures(self.max_poll_failures)
            .with_max_block_range(self.max_block_range))
    }
}
