use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// Metrics for batches sent through a [`BatchDispatch`](crate::transactions::BatchDispatch).
#[derive(Metrics)]
#[metrics(scope = "multicall")]
pub struct DispatchMetrics {
    /// Number of submitted batches.
    pub submitted: Counter,
    /// Number of batches whose result was decoded.
    pub confirmed: Counter,
    /// Number of batches that failed at any stage.
    pub failed: Counter,
    /// Number of calls per batch.
    pub calls: Histogram,
    /// Gas limit of submitted batches.
    pub gas_limit: Histogram,
}
