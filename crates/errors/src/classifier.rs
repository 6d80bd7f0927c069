use thiserror::Error;

use crate::{ErrorCategory, Severity};

/// An error that carries a provider or wallet error code.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("error code {code}: {message}")]
pub struct CodedError {
    pub code: i64,
    pub message: String,
}

impl CodedError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub code: Option<i64>,
    pub message: String,
    pub retryable: bool,
    pub severity: Severity,
    pub user_message: &'static str,
}

struct Override {
    category: ErrorCategory,
    retryable: Option<bool>,
    severity: Option<Severity>,
    user_message: Option<&'static str>,
}

const fn plain(category: ErrorCategory) -> Override {
    Override { category, retryable: None, severity: None, user_message: None }
}

const INSUFFICIENT_FUNDS: Override = Override {
    category: ErrorCategory::Wallet,
    retryable: Some(false),
    severity: Some(Severity::Medium),
    user_message: Some("Insufficient funds to cover the amount and network fee."),
};

const USER_REJECTED: Override = Override {
    category: ErrorCategory::Wallet,
    retryable: Some(false),
    severity: Some(Severity::Low),
    user_message: Some("The transaction was rejected in the wallet."),
};

const NONCE_TOO_LOW: Override = Override {
    category: ErrorCategory::Blockchain,
    retryable: Some(true),
    severity: Some(Severity::Medium),
    user_message: Some("A previous transaction is still pending. Please try again."),
};

const REVERTED: Override = Override {
    category: ErrorCategory::Contract,
    retryable: Some(false),
    severity: Some(Severity::High),
    user_message: Some("The transaction would fail: the contract reverted it."),
};

const INTERNAL: Override =
    Override { category: ErrorCategory::Blockchain, retryable: Some(true), severity: Some(Severity::Critical), user_message: None };

/// Exact code matches win over message patterns.
const CODE_RULES: &[(i64, Override)] = &[
    (4001, USER_REJECTED),
    (4100, plain(ErrorCategory::Permission)),
    (4200, plain(ErrorCategory::Wallet)),
    (4900, plain(ErrorCategory::Wallet)),
    (4901, plain(ErrorCategory::Wallet)),
    (429, plain(ErrorCategory::RateLimit)),
    (-32005, plain(ErrorCategory::RateLimit)),
    (-32602, plain(ErrorCategory::Validation)),
    (-32603, INTERNAL),
    (3, REVERTED),
];

/// Checked in order against the lowercased message.
const MESSAGE_RULES: &[(&str, Override)] = &[
    ("insufficient funds", INSUFFICIENT_FUNDS),
    ("user rejected", USER_REJECTED),
    ("user denied", USER_REJECTED),
    ("rate limit", plain(ErrorCategory::RateLimit)),
    ("too many requests", plain(ErrorCategory::RateLimit)),
    ("http error 429", plain(ErrorCategory::RateLimit)),
    ("status 429", plain(ErrorCategory::RateLimit)),
    ("nonce too low", NONCE_TOO_LOW),
    ("execution reverted", REVERTED),
    ("revert", REVERTED),
    ("unauthorized", plain(ErrorCategory::Permission)),
    ("forbidden", plain(ErrorCategory::Permission)),
    ("not allowed", plain(ErrorCategory::Permission)),
    ("timed out", plain(ErrorCategory::Network)),
    ("timeout", plain(ErrorCategory::Network)),
    ("connection", plain(ErrorCategory::Network)),
    ("network", plain(ErrorCategory::Network)),
    ("dns", plain(ErrorCategory::Network)),
    ("socket", plain(ErrorCategory::Network)),
    ("invalid", plain(ErrorCategory::Validation)),
    ("header not found", plain(ErrorCategory::Blockchain)),
    ("block range", plain(ErrorCategory::Blockchain)),
    ("gas", plain(ErrorCategory::Blockchain)),
    ("wallet", plain(ErrorCategory::Wallet)),
];

fn resolve(code: Option<i64>, message: &str, rule: &Override) -> ClassifiedError {
    ClassifiedError {
        category: rule.category,
        code,
        message: message.to_string(),
        retryable: rule.retryable.unwrap_or(rule.category.is_retryable()),
        severity: rule.severity.unwrap_or(rule.category.severity()),
        user_message: rule.user_message.unwrap_or(rule.category.user_message()),
    }
}

pub fn classify(code: Option<i64>, message: &str) -> ClassifiedError {
    if let Some(code) = code {
        if let Some((_, rule)) = CODE_RULES.iter().find(|(c, _)| *c == code) {
            return resolve(Some(code), message, rule);
        }
    }

    let lowercase = message.to_lowercase();
    match MESSAGE_RULES.iter().find(|(pattern, _)| lowercase.contains(pattern)) {
        Some((_, rule)) => resolve(code, message, rule),
        None => resolve(code, message, &plain(ErrorCategory::Unknown)),
    }
}

/// Uses the first `CodedError` in the chain for its code and the full chain for the message.
pub fn classify_report(report: &eyre::Report) -> ClassifiedError {
    let code = report.chain().find_map(|e| e.downcast_ref::<CodedError>()).map(|e| e.code);
    classify(code, &format!("{report:#}"))
}
