use alloy::{
    network::{Ethereum, ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, Log, TxHash, U256},
    providers::{PendingTransactionBuilder, PendingTransactionError, Provider},
    rpc::types::TransactionRequest,
    transports::{RpcError, TransportErrorKind},
};

/// A batch transaction to the aggregator, before a gas limit is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTransaction {
    /// The aggregator address.
    pub to: Address,
    /// Selector and encoded batch argument.
    pub input: Bytes,
    /// Aggregate value of all calls.
    pub value: U256,
}

impl BatchTransaction {
    /// The request sent for this batch with the given gas limit.
    pub fn into_request(self, gas_limit: u64) -> TransactionRequest {
        let request: TransactionRequest = self.into();
        request.with_gas_limit(gas_limit)
    }
}

impl From<BatchTransaction> for TransactionRequest {
    fn from(tx: BatchTransaction) -> Self {
        Self::default().with_to(tx.to).with_input(tx.input).with_value(tx.value)
    }
}

/// The transport operations a batch dispatch relies on.
///
/// Timeouts and cancellation are owned by the implementation.
pub trait MulticallTransport: Send + Sync {
    /// Handle to a sent, not yet confirmed transaction.
    type Pending: Send;
    /// Error surfaced by the transport.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Estimates the gas used by `tx`.
    fn estimate_gas(
        &self,
        tx: &BatchTransaction,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;

    /// Signs and sends `tx` with the given gas limit.
    fn send_transaction(
        &self,
        tx: &BatchTransaction,
        gas_limit: u64,
    ) -> impl Future<Output = Result<Self::Pending, Self::Error>> + Send;

    /// Waits for inclusion and returns the emitted logs.
    fn wait(&self, pending: Self::Pending)
    -> impl Future<Output = Result<Vec<Log>, Self::Error>> + Send;
}

/// Errors that may occur while talking to a [`Provider`].
#[derive(Debug, thiserror::Error)]
pub enum ProviderTransportError {
    /// The transaction was included but reverted.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// RPC error.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),

    /// Other errors.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl From<PendingTransactionError> for ProviderTransportError {
    fn from(value: PendingTransactionError) -> Self {
        match value {
            PendingTransactionError::TransportError(err) => Self::Rpc(err),
            err => Self::Other(Box::new(err)),
        }
    }
}

/// [`MulticallTransport`] backed by an alloy [`Provider`] with a signing wallet.
#[derive(Debug, Clone)]
pub struct ProviderTransport<P> {
    provider: P,
}

impl<P> ProviderTransport<P> {
    /// Wraps `provider`.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider> MulticallTransport for ProviderTransport<P> {
    type Pending = PendingTransactionBuilder<Ethereum>;
    type Error = ProviderTransportError;

    async fn estimate_gas(&self, tx: &BatchTransaction) -> Result<u64, Self::Error> {
        Ok(self.provider.estimate_gas(tx.clone().into()).await?)
    }

    async fn send_transaction(
        &self,
        tx: &BatchTransaction,
        gas_limit: u64,
    ) -> Result<Self::Pending, Self::Error> {
        Ok(self.provider.send_transaction(tx.clone().into_request(gas_limit)).await?)
    }

    async fn wait(&self, pending: Self::Pending) -> Result<Vec<Log>, Self::Error> {
        let receipt = pending.get_receipt().await?;
        if !ReceiptResponse::status(&receipt) {
            return Err(ProviderTransportError::Reverted(receipt.transaction_hash));
        }
        Ok(receipt.inner.logs().iter().map(|log| log.inner.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, bytes};

    #[test]
    fn request_from_batch() {
        let tx = BatchTransaction {
            to: address!("0xa88774b174fde5709df7e90d85ff973595bc7538"),
            input: bytes!("0x12345678"),
            value: U256::from(3),
        };
        let request = tx.clone().into_request(25_200);

        assert_eq!(request.to, Some(tx.to.into()));
        assert_eq!(request.input.input(), Some(&tx.input));
        assert_eq!(request.value, Some(tx.value));
        assert_eq!(request.gas, Some(25_200));

        // estimation leaves the gas limit to the node
        let estimate: TransactionRequest = tx.into();
        assert_eq!(estimate.gas, None);
        assert_eq!(estimate.to, request.to);
    }
}
