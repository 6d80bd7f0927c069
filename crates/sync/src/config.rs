use std::time::Duration;

use otc_errors::RetryPolicy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderSyncConfig {
    /// Length of the replayed history.
    pub history_days: u64,
    pub block_time_secs: u64,
    /// Largest block span requested in one `eth_getLogs` call.
    pub max_block_range: u64,
    /// Applies to the whole connect, replay and subscribe sequence.
    pub init_retry: RetryPolicy,
}

impl Default for OrderSyncConfig {
    fn default() -> Self {
        Self {
            history_days: 20,
            block_time_secs: 12,
            max_block_range: 10_000,
            init_retry: RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(30)),
        }
    }
}

impl OrderSyncConfig {
    /// Number of blocks covering `history_days`.
    pub fn history_window_blocks(&self) -> u64 {
        self.history_days.saturating_mul(86_400) / self.block_time_secs.max(1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_window_is_twenty_days_of_blocks() {
        assert_eq!(OrderSyncConfig::default().history_window_blocks(), 144_000);
    }

    #[test]
    fn test_zero_block_time_does_not_divide_by_zero() {
        let config = OrderSyncConfig { history_days: 1, block_time_secs: 0, ..Default::default() };
        assert_eq!(config.history_window_blocks(), 86_400);
    }
}
