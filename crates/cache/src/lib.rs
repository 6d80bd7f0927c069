pub use apply_outcome::{ApplyOutcome, IgnoreReason};
pub use order_cache::{OrderCache, ReplayStats};

mod apply_outcome;
mod order_cache;
