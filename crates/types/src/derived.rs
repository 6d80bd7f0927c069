use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::{ContractConstants, Order, OrderStatus};

/// Status shown to readers: the stored status combined with the wall clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum DerivedStatus {
    Active,
    Expired,
    Filled,
    Canceled,
}

pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

pub fn expires_at(order: &Order, constants: &ContractConstants) -> u64 {
    order.timestamp.saturating_add(constants.order_expiry)
}

fn grace_ends_at(order: &Order, constants: &ContractConstants) -> u64 {
    expires_at(order, constants).saturating_add(constants.grace_period)
}

pub fn derive_status(order: &Order, now: u64, constants: &ContractConstants) -> DerivedStatus {
    match order.status {
        OrderStatus::Filled => DerivedStatus::Filled,
        OrderStatus::Canceled => DerivedStatus::Canceled,
        OrderStatus::Active if now > expires_at(order, constants) => DerivedStatus::Expired,
        OrderStatus::Active => DerivedStatus::Active,
    }
}

/// Active, unexpired, not the maker's own order, and either open or addressed to `account`.
pub fn can_fill_order(order: &Order, account: Address, now: u64, constants: &ContractConstants) -> bool {
    derive_status(order, now, constants) == DerivedStatus::Active && order.maker != account && order.is_taker_allowed(account)
}

/// The maker may cancel until the grace period after expiry runs out.
pub fn can_cancel_order(order: &Order, account: Address, now: u64, constants: &ContractConstants) -> bool {
    order.status == OrderStatus::Active && order.maker == account && now <= grace_ends_at(order, constants)
}

/// Anyone may clean up an active order once its grace period is over.
pub fn can_cleanup_order(order: &Order, now: u64, constants: &ContractConstants) -> bool {
    order.status == OrderStatus::Active && now > grace_ends_at(order, constants)
}

/// Seconds left before expiry, `None` once expired or no longer active.
pub fn time_until_expiry(order: &Order, now: u64, constants: &ContractConstants) -> Option<u64> {
    match derive_status(order, now, constants) {
        DerivedStatus::Active => Some(expires_at(order, constants) - now),
        _ => None,
    }
}
