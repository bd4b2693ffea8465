use super::{
    metrics::DispatchMetrics,
    transport::{BatchTransaction, MulticallTransport},
};
use crate::{
    batch::transaction_value,
    codec::{decode_result_event, encode_batch_call},
    error::{EncodingError, MulticallError},
    types::{AggregatorAbi, CallDescriptor, MulticallResult},
};
use alloy::primitives::{Address, Log};
use tracing::{debug, instrument, trace};

/// Applies a percentage margin to a gas estimate, rounding down.
///
/// Computed in 128 bits and saturated to `u64`.
pub const fn gas_limit_with_margin(estimate: u64, margin_percent: u64) -> u64 {
    let limit = estimate as u128 * (100 + margin_percent as u128) / 100;
    if limit > u64::MAX as u128 { u64::MAX } else { limit as u64 }
}

/// Stage of a [`BatchDispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    /// Estimating gas for the batch.
    Estimating,
    /// Sending the batch with the padded gas limit.
    Submitting,
    /// Waiting for the batch to be included.
    AwaitingConfirmation,
    /// Looking up and decoding the result event.
    Decoding,
    /// The result is available.
    Done,
}

/// Dispatch state, carrying what the next stage needs.
#[derive(Debug)]
enum DispatchState<P> {
    Estimating,
    Submitting { gas_estimate: u64 },
    AwaitingConfirmation { pending: P },
    Decoding { logs: Vec<Log> },
    Done(MulticallResult),
}

impl<P> DispatchState<P> {
    const fn stage(&self) -> DispatchStage {
        match self {
            Self::Estimating => DispatchStage::Estimating,
            Self::Submitting { .. } => DispatchStage::Submitting,
            Self::AwaitingConfirmation { .. } => DispatchStage::AwaitingConfirmation,
            Self::Decoding { .. } => DispatchStage::Decoding,
            Self::Done(_) => DispatchStage::Done,
        }
    }
}

/// A single multicall transaction, driven from estimation to decoded result.
///
/// Every stage runs exactly once and in order. A failing stage ends the dispatch with the error
/// kind of that stage.
#[derive(Debug)]
pub struct BatchDispatch<'a, T> {
    transport: &'a T,
    abi: &'a AggregatorAbi,
    metrics: &'a DispatchMetrics,
    tx: BatchTransaction,
    calls: usize,
    gas_margin_percent: u64,
}

impl<'a, T: MulticallTransport> BatchDispatch<'a, T> {
    /// Encodes `calls` into a transaction to `aggregator`.
    pub fn new(
        transport: &'a T,
        abi: &'a AggregatorAbi,
        metrics: &'a DispatchMetrics,
        aggregator: Address,
        calls: &[CallDescriptor],
        gas_margin_percent: u64,
    ) -> Result<Self, EncodingError> {
        let tx = BatchTransaction {
            to: aggregator,
            input: encode_batch_call(abi, calls),
            value: transaction_value(calls)?,
        };
        Ok(Self { transport, abi, metrics, tx, calls: calls.len(), gas_margin_percent })
    }

    /// The transaction that will be sent.
    pub const fn transaction(&self) -> &BatchTransaction {
        &self.tx
    }

    /// Runs the dispatch to completion.
    #[instrument(
        skip_all,
        fields(aggregator = %self.tx.to, calls = self.calls, value = %self.tx.value)
    )]
    pub async fn run(self) -> Result<MulticallResult, MulticallError> {
        self.metrics.calls.record(self.calls as f64);

        let mut state = DispatchState::Estimating;
        loop {
            let from = state.stage();
            state = match self.advance(state).await {
                Ok(DispatchState::Done(result)) => {
                    self.metrics.confirmed.increment(1);
                    debug!(results = result.len(), "Decoded batch result");
                    return Ok(result);
                }
                Ok(next) => next,
                Err(err) => {
                    self.metrics.failed.increment(1);
                    return Err(err);
                }
            };
            trace!(?from, to = ?state.stage(), "Dispatch advanced");
        }
    }

    async fn advance(
        &self,
        state: DispatchState<T::Pending>,
    ) -> Result<DispatchState<T::Pending>, MulticallError> {
        match state {
            DispatchState::Estimating => {
                let gas_estimate = self
                    .transport
                    .estimate_gas(&self.tx)
                    .await
                    .map_err(MulticallError::gas_estimation)?;
                Ok(DispatchState::Submitting { gas_estimate })
            }
            DispatchState::Submitting { gas_estimate } => {
                let gas_limit = gas_limit_with_margin(gas_estimate, self.gas_margin_percent);
                let pending = self
                    .transport
                    .send_transaction(&self.tx, gas_limit)
                    .await
                    .map_err(MulticallError::submission)?;

                self.metrics.submitted.increment(1);
                self.metrics.gas_limit.record(gas_limit as f64);
                debug!(gas_estimate, gas_limit, "Submitted batch");

                Ok(DispatchState::AwaitingConfirmation { pending })
            }
            DispatchState::AwaitingConfirmation { pending } => {
                let logs =
                    self.transport.wait(pending).await.map_err(MulticallError::confirmation)?;
                Ok(DispatchState::Decoding { logs })
            }
            DispatchState::Decoding { logs } => self.decode(&logs).map(DispatchState::Done),
            DispatchState::Done(result) => Ok(DispatchState::Done(result)),
        }
    }

    /// Decodes the first result event emitted by the aggregator.
    fn decode(&self, logs: &[Log]) -> Result<MulticallResult, MulticallError> {
        let topic = self.abi.result_topic();
        let log = logs
            .iter()
            .find(|log| log.address == self.tx.to && log.data.topics().first() == Some(&topic))
            .ok_or_else(|| MulticallError::ResultNotFound {
                event: self.abi.result_event_name().to_string(),
            })?;

        Ok(decode_result_event(self.abi, &log.data.data)?)
    }
}
