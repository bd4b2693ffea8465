//! Multicall error types.
use thiserror::Error;

mod encoding;
pub use encoding::EncodingError;

/// A boxed error surfaced by the transport layer.
pub type TransportFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The overarching error type returned by the batching surface.
#[derive(Debug, Error)]
pub enum MulticallError {
    /// Calldata could not be built.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// Gas estimation failed, usually because the batch would revert.
    #[error("gas estimation failed: {0}")]
    GasEstimation(#[source] TransportFailure),
    /// The transaction could not be submitted.
    #[error("failed to submit transaction: {0}")]
    Submission(#[source] TransportFailure),
    /// The transaction was submitted but never confirmed successfully.
    #[error("failed to confirm transaction: {0}")]
    Confirmation(#[source] TransportFailure),
    /// The aggregator did not emit its result event.
    ///
    /// This points at a mismatch between the configured interface and the deployed contract.
    #[error("no `{event}` event emitted by aggregator")]
    ResultNotFound {
        /// Name of the expected event.
        event: String,
    },
    /// The result event payload could not be decoded.
    #[error("failed to decode aggregator result: {0}")]
    Decoding(#[from] alloy::dyn_abi::Error),
}

impl MulticallError {
    /// Wraps a transport error raised during gas estimation.
    pub fn gas_estimation(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::GasEstimation(Box::new(err))
    }

    /// Wraps a transport error raised while sending.
    pub fn submission(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Submission(Box::new(err))
    }

    /// Wraps a transport error raised while awaiting the receipt.
    pub fn confirmation(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Confirmation(Box::new(err))
    }

    /// Whether this error happened before anything was sent to the network.
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }
}
