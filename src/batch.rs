//! Lowering of transfers and custom calls into [`CallDescriptor`]s.

use crate::{
    codec::{coerce_params, encode_call, encode_transfer, parse_function},
    error::EncodingError,
    types::{CallDescriptor, Transfer, TransferAsset},
};
use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes, U256, U512},
};

/// One `transfer` call on `token` per transfer. The transfers' own asset is ignored.
pub fn from_token_transfers(token: Address, transfers: &[Transfer]) -> Vec<CallDescriptor> {
    transfers.iter().map(|transfer| token_transfer(token, transfer)).collect()
}

/// One plain value transfer per transfer. The transfers' own asset is ignored.
pub fn from_native_transfers(transfers: &[Transfer]) -> Vec<CallDescriptor> {
    transfers.iter().map(native_transfer).collect()
}

/// Routes each transfer by its asset.
pub fn from_mixed_transfers(transfers: &[Transfer]) -> Vec<CallDescriptor> {
    transfers
        .iter()
        .map(|transfer| match transfer.asset {
            TransferAsset::Native => native_transfer(transfer),
            TransferAsset::Token(token) => token_transfer(token, transfer),
        })
        .collect()
}

fn token_transfer(token: Address, transfer: &Transfer) -> CallDescriptor {
    CallDescriptor::new(token, encode_transfer(transfer.to, transfer.amount))
}

fn native_transfer(transfer: &Transfer) -> CallDescriptor {
    CallDescriptor::native_transfer(transfer.to, transfer.amount)
}

/// One call to `signature` on `contract` per parameter list.
///
/// `values[i]` is attached to the `i`th call; calls past the end of `values` carry no value.
pub fn from_custom_calls(
    contract: Address,
    signature: &str,
    params_list: &[Vec<DynSolValue>],
    values: &[U256],
) -> Result<Vec<CallDescriptor>, EncodingError> {
    let function = parse_function(signature)?;
    let call_data = params_list
        .iter()
        .map(|params| encode_call(&function, params))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(with_values(contract, call_data, values))
}

/// Like [`from_custom_calls`], coercing string parameters to the declared types.
pub fn from_custom_calls_str<S: AsRef<str>>(
    contract: Address,
    signature: &str,
    params_list: &[Vec<S>],
    values: &[U256],
) -> Result<Vec<CallDescriptor>, EncodingError> {
    let function = parse_function(signature)?;
    let call_data = params_list
        .iter()
        .map(|params| encode_call(&function, &coerce_params(&function, params)?))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(with_values(contract, call_data, values))
}

fn with_values(contract: Address, call_data: Vec<Bytes>, values: &[U256]) -> Vec<CallDescriptor> {
    call_data
        .into_iter()
        .enumerate()
        .map(|(index, data)| {
            CallDescriptor::new(contract, data)
                .with_value(values.get(index).copied().unwrap_or_default())
        })
        .collect()
}

/// Sums the values of `calls` without wrapping at 256 bits.
pub fn aggregate_value(calls: &[CallDescriptor]) -> U512 {
    calls.iter().fold(U512::ZERO, |total, call| total + U512::from(call.value))
}

/// The aggregate value as a transaction value.
///
/// Fails with [`EncodingError::ValueOverflow`] when the sum does not fit 256 bits.
pub fn transaction_value(calls: &[CallDescriptor]) -> Result<U256, EncodingError> {
    let total = aggregate_value(calls);
    U256::checked_from_uint(total).ok_or(EncodingError::ValueOverflow { total })
}
