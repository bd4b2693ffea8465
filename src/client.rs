//! # Multicall client
//!
//! Public batching surface. Every method lowers its input into [`CallDescriptor`]s and sends them
//! through a single [`BatchDispatch`].

use crate::{
    batch, codec,
    config::MulticallConfig,
    constants::GAS_LIMIT_MARGIN_PERCENT,
    error::{EncodingError, MulticallError},
    transactions::{
        BatchDispatch, BatchTransaction, DispatchMetrics, MulticallTransport, ProviderTransport,
    },
    types::{AggregatorAbi, CallDescriptor, MulticallResult, Transfer},
};
use alloy::{
    dyn_abi::DynSolValue,
    network::EthereumWallet,
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use std::sync::Arc;
use tracing::instrument;
use url::Url;

/// Batches calls through a deployed aggregator.
#[derive(Debug, Clone)]
pub struct MulticallClient<T> {
    transport: T,
    aggregator: Address,
    abi: AggregatorAbi,
    gas_margin_percent: u64,
    metrics: Arc<DispatchMetrics>,
}

impl<T> MulticallClient<T> {
    /// Create a new client for the `v1` aggregator at `aggregator`.
    pub fn new(transport: T, aggregator: Address) -> Self {
        Self {
            transport,
            aggregator,
            abi: AggregatorAbi::v1(),
            gas_margin_percent: GAS_LIMIT_MARGIN_PERCENT,
            metrics: Arc::new(DispatchMetrics::default()),
        }
    }

    /// Use a different aggregator interface.
    pub fn with_abi(mut self, abi: AggregatorAbi) -> Self {
        self.abi = abi;
        self
    }

    /// Use a different gas margin.
    pub fn with_gas_margin_percent(mut self, percent: u64) -> Self {
        self.gas_margin_percent = percent;
        self
    }

    /// The aggregator address.
    pub const fn aggregator(&self) -> Address {
        self.aggregator
    }

    /// The aggregator interface.
    pub const fn abi(&self) -> &AggregatorAbi {
        &self.abi
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds the aggregator transaction for `calls` without sending it.
    pub fn prepare(&self, calls: &[CallDescriptor]) -> Result<BatchTransaction, EncodingError> {
        Ok(BatchTransaction {
            to: self.aggregator,
            input: codec::encode_batch_call(&self.abi, calls),
            value: batch::transaction_value(calls)?,
        })
    }
}

impl<T: MulticallTransport> MulticallClient<T> {
    /// Sends `calls` in a single transaction and returns the per-call results.
    #[instrument(skip_all, fields(calls = calls.len()))]
    pub async fn batch_calls(
        &self,
        calls: &[CallDescriptor],
    ) -> Result<MulticallResult, MulticallError> {
        BatchDispatch::new(
            &self.transport,
            &self.abi,
            &self.metrics,
            self.aggregator,
            calls,
            self.gas_margin_percent,
        )?
        .run()
        .await
    }

    /// Batches transfers of a single ERC-20 `token`.
    pub async fn batch_erc20_transfers(
        &self,
        token: Address,
        transfers: &[Transfer],
    ) -> Result<MulticallResult, MulticallError> {
        self.batch_calls(&batch::from_token_transfers(token, transfers)).await
    }

    /// Batches native currency transfers.
    pub async fn batch_native_transfers(
        &self,
        transfers: &[Transfer],
    ) -> Result<MulticallResult, MulticallError> {
        self.batch_calls(&batch::from_native_transfers(transfers)).await
    }

    /// Batches transfers of mixed assets.
    pub async fn batch_mixed_transfers(
        &self,
        transfers: &[Transfer],
    ) -> Result<MulticallResult, MulticallError> {
        self.batch_calls(&batch::from_mixed_transfers(transfers)).await
    }

    /// Batches calls to `signature` on `contract`, one per parameter list.
    ///
    /// Missing trailing `values` default to zero.
    pub async fn custom_batch_call(
        &self,
        contract: Address,
        signature: &str,
        params_list: &[Vec<DynSolValue>],
        values: &[U256],
    ) -> Result<MulticallResult, MulticallError> {
        let calls = batch::from_custom_calls(contract, signature, params_list, values)?;
        self.batch_calls(&calls).await
    }

    /// Like [`Self::custom_batch_call`], coercing string parameters to the declared types.
    pub async fn custom_batch_call_str<S: AsRef<str> + Sync>(
        &self,
        contract: Address,
        signature: &str,
        params_list: &[Vec<S>],
        values: &[U256],
    ) -> Result<MulticallResult, MulticallError> {
        let calls = batch::from_custom_calls_str(contract, signature, params_list, values)?;
        self.batch_calls(&calls).await
    }

    /// Estimates gas for an arbitrary transaction, without margin.
    pub async fn estimate_gas(&self, tx: &BatchTransaction) -> Result<u64, MulticallError> {
        self.transport.estimate_gas(tx).await.map_err(MulticallError::gas_estimation)
    }
}

impl MulticallClient<ProviderTransport<DynProvider>> {
    /// Connects to `endpoint`, signing batches with `signer`.
    pub fn connect(endpoint: Url, signer: PrivateKeySigner, aggregator: Address) -> Self {
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(endpoint)
            .erased();
        Self::new(ProviderTransport::new(provider), aggregator)
    }

    /// Connects using `config`.
    pub fn from_config(
        config: &MulticallConfig,
        signer: PrivateKeySigner,
    ) -> Result<Self, EncodingError> {
        Ok(Self::connect(config.endpoint.clone(), signer, config.aggregator)
            .with_abi(config.aggregator_abi()?)
            .with_gas_margin_percent(config.gas_margin_percent))
    }
}
