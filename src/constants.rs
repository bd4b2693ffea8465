//! Multicall constants.

/// Percentage added on top of the gas estimate to absorb state drift between estimation and
/// execution.
pub const GAS_LIMIT_MARGIN_PERCENT: u64 = 20;

/// Default RPC endpoint used when no configuration is present.
pub const DEFAULT_RPC_ENDPOINT: &str = "http://localhost:8545";

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "multicall.yaml";
