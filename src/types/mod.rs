//! Shared primitive types.
mod call;
pub use call::*;

mod erc20;
pub use erc20::*;

mod multicall;
pub use multicall::*;

mod transfer;
pub use transfer::*;
