use std::collections::BTreeMap;
use std::time::Duration;

use clap::Parser;
use eyre::Result;
use otc_desk::OtcDesk;
use otc_events::{CacheEventKind, CacheEvents};
use otc_price::deal_metric;
use otc_topology::{Topology, TopologyConfig};
use otc_types::{can_cleanup_order, derive_status, unix_now, DerivedStatus};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(about = "Mirrors an OTC swap contract's orders into memory")]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Seconds between order book summaries.
    #[arg(long, default_value_t = 60)]
    summary_interval: u64,
}

async fn log_summary(desk: &OtcDesk) {
    let state = desk.sync_state().read().await.clone();
    let orders = desk.orders();
    let orders = orders.read().await;
    let Some(constants) = orders.constants() else {
        info!(%state, "waiting for contract constants");
        return;
    };

    let now = unix_now();
    let prices = desk.prices();
    let prices = prices.read().await;
    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
    let mut cleanable = 0usize;
    let mut best_deal: Option<(f64, bool)> = None;

    for order in orders.get_orders(None) {
        let status = derive_status(&order, now, &constants);
        *by_status.entry(status.to_string()).or_default() += 1;
        if can_cleanup_order(&order, now, &constants) {
            cleanable += 1;
        }
        if status == DerivedStatus::Active {
            let metric = deal_metric(&order, &prices);
            if let Some(ratio) = metric.ratio {
                if best_deal.map_or(true, |(best, _)| ratio > best) {
                    best_deal = Some((ratio, metric.estimated));
                }
            }
        }
    }

    info!(%state, orders = orders.len(), ?by_status, cleanable, ?best_deal, last_synced_block = ?orders.last_synced_block(), "order book");
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,tokio_tungstenite=off,tungstenite=off,alloy_rpc_client=off,alloy_transport_http=off,hyper_util=off,reqwest=off"),
    )
    .format_timestamp_millis()
    .init();

    let args = Args::parse();

    let topology_config = TopologyConfig::load_from_file(args.config.clone())?;
    let topology = Topology::from_config(topology_config)?;
    let desk = topology.desk().clone();

    desk.subscriptions().subscribe(CacheEventKind::SyncFailed, |event| {
        if let CacheEvents::SyncFailed { reason } = event {
            error!(%reason, "synchronizer disabled, serving read-only cache");
        }
    });
    desk.subscriptions().subscribe(CacheEventKind::OrdersSynced, |event| {
        if let CacheEvents::OrdersSynced { count } = event {
            info!(count, "orders synced");
        }
    });

    let manager = topology.start().await?;
    info!(workers = manager.len(), "topology started");

    let summary_desk = desk.clone();
    let summary_interval = Duration::from_secs(args.summary_interval.max(1));
    tokio::task::spawn(async move {
        let mut interval = tokio::time::interval(summary_interval);
        loop {
            interval.tick().await;
            log_summary(&summary_desk).await;
        }
    });

    tokio::select! {
        _ = manager.wait() => {
            warn!("all workers finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received, exiting");
        }
    }

    Ok(())
}
