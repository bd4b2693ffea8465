//! Multicall configuration.
use crate::{
    constants::{DEFAULT_RPC_ENDPOINT, GAS_LIMIT_MARGIN_PERCENT},
    error::EncodingError,
    types::{AggregatorAbi, V1_EVENT_SIGNATURE, V1_FUNCTION_SIGNATURE},
};
use alloy::primitives::Address;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Multicall configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticallConfig {
    /// The RPC endpoint of the chain to send batches to.
    pub endpoint: Url,
    /// The address of the deployed aggregator.
    pub aggregator: Address,
    /// The aggregator interface.
    #[serde(default)]
    pub interface: InterfaceConfig,
    /// Percentage added on top of gas estimates.
    #[serde(default = "default_gas_margin_percent")]
    pub gas_margin_percent: u64,
}

const fn default_gas_margin_percent() -> u64 {
    GAS_LIMIT_MARGIN_PERCENT
}

impl MulticallConfig {
    /// Sets the RPC endpoint.
    pub fn with_endpoint(mut self, endpoint: Option<Url>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        self
    }

    /// Sets the aggregator address.
    pub fn with_aggregator(mut self, aggregator: Option<Address>) -> Self {
        if let Some(aggregator) = aggregator {
            self.aggregator = aggregator;
        }
        self
    }

    /// Sets the gas margin.
    pub fn with_gas_margin_percent(mut self, percent: Option<u64>) -> Self {
        if let Some(percent) = percent {
            self.gas_margin_percent = percent;
        }
        self
    }

    /// Sets the aggregator interface.
    pub fn with_interface(mut self, interface: InterfaceConfig) -> Self {
        self.interface = interface;
        self
    }

    /// Builds the configured [`AggregatorAbi`].
    pub fn aggregator_abi(&self) -> Result<AggregatorAbi, EncodingError> {
        self.interface.build()
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for MulticallConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_RPC_ENDPOINT).expect("default endpoint is a valid url"),
            aggregator: Address::ZERO,
            interface: InterfaceConfig::default(),
            gas_margin_percent: GAS_LIMIT_MARGIN_PERCENT,
        }
    }
}

/// Human readable aggregator interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    /// Version label.
    pub version: String,
    /// The batch function signature.
    pub function: String,
    /// The result event signature.
    pub event: String,
}

impl InterfaceConfig {
    /// Parses and validates the interface.
    pub fn build(&self) -> Result<AggregatorAbi, EncodingError> {
        AggregatorAbi::new(self.version.clone(), &self.function, &self.event)
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            function: V1_FUNCTION_SIGNATURE.to_string(),
            event: V1_EVENT_SIGNATURE.to_string(),
        }
    }
}
