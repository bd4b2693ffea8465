//! Submission of batches to the aggregator.

mod dispatcher;
pub use dispatcher::*;
mod metrics;
pub use metrics::DispatchMetrics;
mod transport;
pub use transport::*;
