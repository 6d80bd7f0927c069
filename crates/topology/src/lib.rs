pub use topology::Topology;
pub use topology_config::{
    ClientConfig, ClientConfigParams, ContractConfig, LimiterConfig, PriceSourceConfig, SyncConfig, TopologyConfig,
};

mod topology;
mod topology_config;
