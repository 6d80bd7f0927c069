use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use otc_abi::{IOtcSwap, IERC20};

pub fn encode_fill_order(order_id: U256) -> Bytes {
    IOtcSwap::fillOrderCall { orderId: order_id }.abi_encode().into()
}

pub fn encode_cancel_order(order_id: U256) -> Bytes {
    IOtcSwap::cancelOrderCall { orderId: order_id }.abi_encode().into()
}

/// Sweeps every order past expiry plus grace period.
pub fn encode_cleanup_orders() -> Bytes {
    IOtcSwap::cleanUpOrdersCall {}.abi_encode().into()
}

/// ERC20 approval a taker sends before filling.
pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}
