use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ErrorCategory {
    Network,
    Blockchain,
    Contract,
    Wallet,
    Validation,
    Permission,
    RateLimit,
    Unknown,
}

impl ErrorCategory {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Blockchain | ErrorCategory::RateLimit)
    }

    pub fn severity(&self) -> Severity {
        match self {
            ErrorCategory::Validation | ErrorCategory::RateLimit => Severity::Low,
            ErrorCategory::Network | ErrorCategory::Wallet | ErrorCategory::Permission | ErrorCategory::Unknown => Severity::Medium,
            ErrorCategory::Blockchain | ErrorCategory::Contract => Severity::High,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connection problem. Please check your connection and try again.",
            ErrorCategory::Blockchain => "The blockchain node returned an error. Please try again shortly.",
            ErrorCategory::Contract => "The contract rejected this operation.",
            ErrorCategory::Wallet => "Wallet error. Please check your wallet and try again.",
            ErrorCategory::Validation => "Invalid input. Please check the values and try again.",
            ErrorCategory::Permission => "You are not allowed to perform this action.",
            ErrorCategory::RateLimit => "Too many requests. Please wait a moment and try again.",
            ErrorCategory::Unknown => "An unexpected error occurred.",
        }
    }
}
