pub use erc20::IERC20;
pub use otc::IOtcSwap;

mod erc20;
mod otc;
