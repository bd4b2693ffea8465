use alloy::primitives::U512;
use thiserror::Error;

/// Errors raised while building calldata locally.
///
/// These never involve the network and are not retryable.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The input is not a 20 byte hex address.
    #[error("invalid address `{input}`")]
    InvalidAddress {
        /// The rejected input.
        input: String,
    },
    /// The input is not an unsigned 256 bit integer.
    #[error("invalid amount `{input}`: expected an unsigned 256 bit integer")]
    InvalidAmount {
        /// The rejected input.
        input: String,
    },
    /// A transfer descriptor could not be parsed.
    #[error("invalid transfer `{input}`: expected `[asset:]to:amount`")]
    InvalidTransfer {
        /// The rejected input.
        input: String,
    },
    /// The summed call values do not fit the transaction value field.
    #[error("aggregate value {total} exceeds the 256 bit transaction value")]
    ValueOverflow {
        /// The aggregate value.
        total: U512,
    },
    /// The function signature could not be parsed.
    #[error("invalid function signature `{signature}`: {reason}")]
    Signature {
        /// The rejected signature.
        signature: String,
        /// Why parsing failed.
        reason: String,
    },
    /// The number of parameters does not match the signature.
    #[error("{function} expects {expected} parameters, got {got}")]
    ArityMismatch {
        /// The function signature.
        function: String,
        /// Declared parameter count.
        expected: usize,
        /// Provided parameter count.
        got: usize,
    },
    /// A parameter does not match its declared type.
    #[error("parameter {index} of {function} is not a valid `{expected}`")]
    TypeMismatch {
        /// The function signature.
        function: String,
        /// Position of the parameter.
        index: usize,
        /// The declared solidity type.
        expected: String,
    },
    /// The aggregator interface does not have the expected shape.
    #[error("unsupported aggregator interface: {0}")]
    InvalidInterface(String),
    /// An error from the dynamic ABI encoder.
    #[error(transparent)]
    Abi(#[from] alloy::dyn_abi::Error),
}

impl EncodingError {
    /// Creates a new [`EncodingError::InvalidAddress`].
    pub fn invalid_address(input: impl Into<String>) -> Self {
        Self::InvalidAddress { input: input.into() }
    }

    /// Creates a new [`EncodingError::InvalidAmount`].
    pub fn invalid_amount(input: impl Into<String>) -> Self {
        Self::InvalidAmount { input: input.into() }
    }
}
