//! The per-call record threaded through encoding and submission.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A single call in a multicall batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDescriptor {
    /// The call target.
    pub target: Address,
    /// The calldata bytes. Empty for plain value transfers.
    #[serde(default)]
    pub call_data: Bytes,
    /// Amount of native value to send to the target.
    #[serde(default)]
    pub value: U256,
}

impl CallDescriptor {
    /// Creates a call without attached value.
    pub fn new(target: Address, call_data: impl Into<Bytes>) -> Self {
        Self { target, call_data: call_data.into(), value: U256::ZERO }
    }

    /// Creates a plain value transfer to `to`.
    pub fn native_transfer(to: Address, amount: U256) -> Self {
        Self { target: to, call_data: Bytes::new(), value: amount }
    }

    /// Sets the attached value.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// The decoded per-call return data of a batch, in call order.
pub type MulticallResult = Vec<Bytes>;
