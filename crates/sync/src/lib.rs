pub use config::OrderSyncConfig;
pub use history::{fetch_history, sync_all_orders};
pub use notifier_actor::NotifierActor;
pub use order_sync_actor::OrderSyncActor;

mod config;
mod history;
mod notifier_actor;
mod order_sync_actor;

#[cfg(test)]
mod fake_chain;
