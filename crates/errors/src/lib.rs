pub use category::{ErrorCategory, Severity};
pub use classifier::{classify, classify_report, ClassifiedError, CodedError};
pub use retry::{retry_always, retry_with_backoff, RetryPolicy};

mod category;
mod classifier;
mod retry;
