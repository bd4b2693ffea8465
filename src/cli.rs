//! # Multicall CLI
use crate::{
    batch,
    client::MulticallClient,
    codec::{coerce_param_list, encode_batch_call, parse_function},
    config::MulticallConfig,
    constants::DEFAULT_CONFIG_FILE,
    types::{CallDescriptor, MulticallResult, Transfer},
};
use alloy::{
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
};
use clap::{Parser, Subcommand};
use eyre::{OptionExt, bail};
use std::{path::PathBuf, str::FromStr};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use url::Url;

/// Batches calls into a single multicall transaction.
#[derive(Debug, Parser)]
#[command(author, about = "Multicall", long_about = None)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, a default one will be written to this path.
    #[arg(
        long,
        value_name = "CONFIG",
        env = "MULTICALL_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,
    /// The RPC endpoint of the chain to send batches to.
    ///
    /// Must be a valid HTTP or HTTPS URL pointing to an Ethereum JSON-RPC endpoint.
    #[arg(long = "endpoint", value_name = "RPC_ENDPOINT")]
    pub endpoint: Option<Url>,
    /// The address of the aggregator contract.
    #[arg(long = "aggregator", value_name = "ADDRESS")]
    pub aggregator: Option<Address>,
    /// Percentage added on top of gas estimates.
    #[arg(long = "gas-margin", value_name = "PERCENT")]
    pub gas_margin_percent: Option<u64>,
    /// The secret key to sign batches with.
    #[arg(long, value_name = "SECRET_KEY", env = "MULTICALL_SK", hide_env_values = true)]
    pub secret_key: Option<String>,
    /// The batch to send.
    #[command(subcommand)]
    pub command: Command,
}

/// Batch kinds.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Transfer a single ERC-20 token to many recipients.
    Erc20 {
        /// The token address.
        #[arg(long, value_name = "ADDRESS")]
        token: Address,
        /// A transfer, `to:amount`.
        #[arg(
            long = "transfer",
            value_name = "TO:AMOUNT",
            required = true,
            value_parser = Transfer::parse_recipient
        )]
        transfers: Vec<Transfer>,
    },
    /// Transfer the native currency to many recipients.
    Native {
        /// A transfer, `to:amount`.
        #[arg(
            long = "transfer",
            value_name = "TO:AMOUNT",
            required = true,
            value_parser = Transfer::parse_recipient
        )]
        transfers: Vec<Transfer>,
    },
    /// Transfer native currency and tokens.
    Mixed {
        /// A transfer, `asset:to:amount` where asset is `native` or a token address.
        #[arg(long = "transfer", value_name = "ASSET:TO:AMOUNT", required = true)]
        transfers: Vec<Transfer>,
    },
    /// Call one function on a contract many times.
    Custom {
        /// The contract address.
        #[arg(long, value_name = "ADDRESS")]
        contract: Address,
        /// The function signature, e.g. `approve(address,uint256)`.
        #[arg(long, value_name = "SIGNATURE")]
        signature: String,
        /// Comma separated arguments of one call.
        #[arg(long = "call", value_name = "ARGS", required = true)]
        calls: Vec<String>,
        /// Value attached to the call at the same position. Missing values are zero.
        #[arg(long = "value", value_name = "WEI")]
        values: Vec<U256>,
    },
    /// Print the aggregator transaction for a mixed batch without sending it.
    Encode {
        /// A transfer, `[asset:]to:amount`.
        #[arg(long = "transfer", value_name = "ASSET:TO:AMOUNT")]
        transfers: Vec<Transfer>,
    },
}

impl Args {
    /// Run the command.
    pub async fn run(self) -> eyre::Result<()> {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .init();

        let config = self.load_config()?;
        let abi = config.aggregator_abi()?;

        let calls = match self.command {
            Command::Encode { transfers } => {
                let calls = batch::from_mixed_transfers(&transfers);
                println!("to: {}", config.aggregator);
                println!("value: {}", batch::transaction_value(&calls)?);
                println!("input: {}", encode_batch_call(&abi, &calls));
                return Ok(());
            }
            Command::Erc20 { token, transfers } => batch::from_token_transfers(token, &transfers),
            Command::Native { transfers } => batch::from_native_transfers(&transfers),
            Command::Mixed { transfers } => batch::from_mixed_transfers(&transfers),
            Command::Custom { contract, signature, calls, values } => {
                custom_calls(contract, &signature, &calls, &values)?
            }
        };

        if config.aggregator.is_zero() {
            bail!("no aggregator configured, set --aggregator or `aggregator` in the config file");
        }
        let secret_key = self
            .secret_key
            .ok_or_eyre("missing secret key, set --secret-key or MULTICALL_SK")?;
        let signer = PrivateKeySigner::from_str(&secret_key)?;
        info!(signer = %signer.address(), aggregator = %config.aggregator, "Sending batch");

        let client = MulticallClient::from_config(&config, signer)?;
        let results = client.batch_calls(&calls).await?;
        print_results(&results);

        Ok(())
    }

    /// Loads the configuration file, writing a default one if missing, and applies overrides.
    fn load_config(&self) -> eyre::Result<MulticallConfig> {
        let config = if !self.config.exists() {
            let config = MulticallConfig::default();
            config.save_to_file(&self.config)?;
            info!(path = %self.config.display(), "Wrote default configuration");
            config
        } else {
            MulticallConfig::load_from_file(&self.config)?
        };

        Ok(config
            .with_endpoint(self.endpoint.clone())
            .with_aggregator(self.aggregator)
            .with_gas_margin_percent(self.gas_margin_percent))
    }
}

fn custom_calls(
    contract: Address,
    signature: &str,
    calls: &[String],
    values: &[U256],
) -> eyre::Result<Vec<CallDescriptor>> {
    let function = parse_function(signature)?;
    let params = calls
        .iter()
        .map(|args| coerce_param_list(&function, args))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(batch::from_custom_calls(contract, signature, &params, values)?)
}

fn print_results(results: &MulticallResult) {
    if results.is_empty() {
        println!("no return data");
    }
    for (index, data) in results.iter().enumerate() {
        println!("{index}: {data}");
    }
}
