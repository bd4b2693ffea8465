//! Caller facing transfer shorthand.

use crate::{
    codec::{parse_address, parse_amount},
    error::EncodingError,
};
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

/// The asset moved by a [`Transfer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum TransferAsset {
    /// The chain's native currency, attached as call value.
    Native,
    /// An ERC-20 token at the given address.
    Token(Address),
}

impl fmt::Display for TransferAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Token(token) => write!(f, "{token}"),
        }
    }
}

impl FromStr for TransferAsset {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("native") || s.eq_ignore_ascii_case("eth") {
            return Ok(Self::Native);
        }
        parse_address(s).map(Self::Token)
    }
}

/// A transfer of `amount` units of `asset` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// The recipient.
    pub to: Address,
    /// The amount in the asset's smallest unit.
    pub amount: U256,
    /// The transferred asset. Defaults to the native currency.
    #[serde(default = "native_asset", alias = "token")]
    pub asset: TransferAsset,
}

const fn native_asset() -> TransferAsset {
    TransferAsset::Native
}

impl Transfer {
    /// Creates a native currency transfer.
    pub const fn native(to: Address, amount: U256) -> Self {
        Self { to, amount, asset: TransferAsset::Native }
    }

    /// Creates an ERC-20 transfer of `token`.
    pub const fn token(token: Address, to: Address, amount: U256) -> Self {
        Self { to, amount, asset: TransferAsset::Token(token) }
    }

    /// Parses `to:amount` only, for batches whose asset is fixed by the caller.
    pub fn parse_recipient(s: &str) -> Result<Self, EncodingError> {
        match s.split(':').collect::<Vec<_>>().as_slice() {
            [to, amount] => Ok(Self::native(parse_address(to)?, parse_amount(amount)?)),
            _ => Err(EncodingError::InvalidTransfer { input: s.to_string() }),
        }
    }
}

/// Parses `to:amount` (native) or `asset:to:amount`, where `asset` is `native` or a token address.
impl FromStr for Transfer {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (asset, to, amount) = match parts.as_slice() {
            [to, amount] => (TransferAsset::Native, to, amount),
            [asset, to, amount] => (asset.parse()?, to, amount),
            _ => return Err(EncodingError::InvalidTransfer { input: s.to_string() }),
        };
        Ok(Self { to: parse_address(to)?, amount: parse_amount(amount)?, asset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn parse_transfers() {
        let to = address!("0x1111111111111111111111111111111111111111");
        let token = address!("0x2222222222222222222222222222222222222222");

        let native: Transfer = "0x1111111111111111111111111111111111111111:100".parse().unwrap();
        assert_eq!(native, Transfer::native(to, U256::from(100)));

        let explicit: Transfer =
            "ETH:0x1111111111111111111111111111111111111111:0x64".parse().unwrap();
        assert_eq!(explicit, Transfer::native(to, U256::from(100)));

        let erc20: Transfer = "0x2222222222222222222222222222222222222222:0x1111111111111111111111111111111111111111:7"
            .parse()
            .unwrap();
        assert_eq!(erc20, Transfer::token(token, to, U256::from(7)));
    }

    #[test]
    fn reject_malformed_transfers() {
        assert!(matches!(
            "100".parse::<Transfer>(),
            Err(EncodingError::InvalidTransfer { .. })
        ));
        assert!(matches!(
            "0x1234:100".parse::<Transfer>(),
            Err(EncodingError::InvalidAddress { .. })
        ));
        assert!(matches!(
            "0x1111111111111111111111111111111111111111:-1".parse::<Transfer>(),
            Err(EncodingError::InvalidAmount { .. })
        ));

        let recipient =
            Transfer::parse_recipient("0x1111111111111111111111111111111111111111:5").unwrap();
        assert_eq!(recipient.amount, U256::from(5));
        assert!(matches!(
            Transfer::parse_recipient("native:0x1111111111111111111111111111111111111111:5"),
            Err(EncodingError::InvalidTransfer { .. })
        ));
    }

    #[test]
    fn asset_serde() {
        let json = r#"{"to":"0x1111111111111111111111111111111111111111","amount":"0x1","token":"native"}"#;
        let transfer: Transfer = serde_json::from_str(json).unwrap();
        assert_eq!(transfer.asset, TransferAsset::Native);

        let token = TransferAsset::Token(address!("0x2222222222222222222222222222222222222222"));
        let encoded = serde_json::to_string(&token).unwrap();
        assert_eq!(serde_json::from_str::<TransferAsset>(&encoded).unwrap(), token);
    }
}
