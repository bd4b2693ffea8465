//! ABI encoding and decoding for multicall batches.
//!
//! Batch layout is dictated by the [`AggregatorAbi`]: the batch argument is a single
//! `(address,bytes)[]` and the result payload is a single `bytes[]`.

use crate::{
    error::EncodingError,
    types::{AggregatorAbi, CallDescriptor, IERC20, MulticallResult},
};
use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::Function,
    primitives::{Address, Bytes, U256},
    sol_types::SolCall,
};
use std::str::FromStr;

/// Parses a hex encoded 20 byte address.
pub fn parse_address(input: &str) -> Result<Address, EncodingError> {
    Address::from_str(input.trim()).map_err(|_| EncodingError::invalid_address(input))
}

/// Parses an unsigned 256 bit integer, decimal or `0x` prefixed hex.
pub fn parse_amount(input: &str) -> Result<U256, EncodingError> {
    U256::from_str(input.trim()).map_err(|_| EncodingError::invalid_amount(input))
}

/// Encodes an ERC-20 `transfer(address,uint256)` call.
pub fn encode_transfer(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

/// Parses a human readable function signature such as `approve(address,uint256)`.
///
/// The `function` keyword, parameter names and modifiers are optional.
pub fn parse_function(signature: &str) -> Result<Function, EncodingError> {
    Function::parse(signature).map_err(|err| EncodingError::Signature {
        signature: signature.to_string(),
        reason: err.to_string(),
    })
}

/// Encodes a call to `signature` with the given parameters, selector included.
pub fn encode_function_call(
    signature: &str,
    params: &[DynSolValue],
) -> Result<Bytes, EncodingError> {
    encode_call(&parse_function(signature)?, params)
}

/// Encodes a call to `signature`, coercing each string parameter to its declared type.
pub fn encode_function_call_str<S: AsRef<str>>(
    signature: &str,
    params: &[S],
) -> Result<Bytes, EncodingError> {
    let function = parse_function(signature)?;
    let values = coerce_params(&function, params)?;
    encode_call(&function, &values)
}

/// Encodes a call to an already parsed function.
///
/// Checks arity and the type of every parameter before encoding.
pub fn encode_call(function: &Function, params: &[DynSolValue]) -> Result<Bytes, EncodingError> {
    let types = input_types(function, params.len())?;
    for (index, (ty, value)) in types.iter().zip(params).enumerate() {
        if !ty.matches(value) || !fits(value) {
            return Err(EncodingError::TypeMismatch {
                function: function.signature(),
                index,
                expected: ty.sol_type_name().into_owned(),
            });
        }
    }
    Ok(function.abi_encode_input(params)?.into())
}

/// Coerces string parameters to the input types of `function`.
pub fn coerce_params<S: AsRef<str>>(
    function: &Function,
    params: &[S],
) -> Result<Vec<DynSolValue>, EncodingError> {
    input_types(function, params.len())?
        .iter()
        .zip(params)
        .enumerate()
        .map(|(index, (ty, param))| {
            ty.coerce_str(param.as_ref()).map_err(|_| EncodingError::TypeMismatch {
                function: function.signature(),
                index,
                expected: ty.sol_type_name().into_owned(),
            })
        })
        .collect()
}

/// Coerces a comma separated argument list, e.g. `0x1111…,100`, to the inputs of `function`.
///
/// Nested tuples and arrays use solidity literal syntax: `(1,2)`, `[0x01,0x02]`.
pub fn coerce_param_list(
    function: &Function,
    args: &str,
) -> Result<Vec<DynSolValue>, EncodingError> {
    let types = input_types(function, function.inputs.len())?;
    let args = args.trim();
    if types.is_empty() {
        if args.is_empty() {
            return Ok(Vec::new());
        }
        return Err(EncodingError::ArityMismatch {
            function: function.signature(),
            expected: 0,
            got: args.split(',').count(),
        });
    }

    let tuple = DynSolType::Tuple(types);
    match tuple.coerce_str(&format!("({args})")) {
        Ok(DynSolValue::Tuple(values)) => Ok(values),
        _ => Err(EncodingError::TypeMismatch {
            function: function.signature(),
            index: 0,
            expected: tuple.sol_type_name().into_owned(),
        }),
    }
}

/// Whether every integer in `value` fits its declared bit width.
fn fits(value: &DynSolValue) -> bool {
    match value {
        DynSolValue::Uint(value, size) => value.bit_len() <= *size,
        DynSolValue::Int(value, size) => value.bits() as usize <= *size,
        DynSolValue::Array(values)
        | DynSolValue::FixedArray(values)
        | DynSolValue::Tuple(values) => values.iter().all(fits),
        _ => true,
    }
}

fn input_types(function: &Function, got: usize) -> Result<Vec<DynSolType>, EncodingError> {
    if function.inputs.len() != got {
        return Err(EncodingError::ArityMismatch {
            function: function.signature(),
            expected: function.inputs.len(),
            got,
        });
    }
    Ok(function.inputs.iter().map(|param| param.resolve()).collect::<Result<_, _>>()?)
}

/// Encodes `calls` as the single `(address,bytes)[]` batch argument.
///
/// Per-call values are not part of the encoding; they travel as the transaction value.
pub fn encode_batch_parameter(abi: &AggregatorAbi, calls: &[CallDescriptor]) -> Bytes {
    let calls = DynSolValue::Array(
        calls
            .iter()
            .map(|call| {
                DynSolValue::Tuple(vec![
                    DynSolValue::Address(call.target),
                    DynSolValue::Bytes(call.call_data.to_vec()),
                ])
            })
            .collect(),
    );
    debug_assert!(abi.parameter_type().matches(&calls));

    DynSolValue::Tuple(vec![calls]).abi_encode_params().into()
}

/// Encodes the full aggregator calldata: selector followed by the batch argument.
pub fn encode_batch_call(abi: &AggregatorAbi, calls: &[CallDescriptor]) -> Bytes {
    let parameter = encode_batch_parameter(abi, calls);
    let mut input = Vec::with_capacity(4 + parameter.len());
    input.extend_from_slice(abi.selector().as_slice());
    input.extend_from_slice(&parameter);
    input.into()
}

/// Decodes a batch argument back into `(target, callData)` descriptors with zero value.
pub fn decode_batch_parameter(
    abi: &AggregatorAbi,
    data: &[u8],
) -> Result<Vec<CallDescriptor>, alloy::dyn_abi::Error> {
    let DynSolValue::Array(calls) = decode_single(abi.parameter_type(), data)? else {
        return Err(shape_error(abi.parameter_type()));
    };

    calls
        .into_iter()
        .map(|call| match call {
            DynSolValue::Tuple(fields) => match fields.as_slice() {
                [DynSolValue::Address(target), DynSolValue::Bytes(call_data)] => {
                    Ok(CallDescriptor::new(*target, call_data.clone()))
                }
                _ => Err(shape_error(abi.parameter_type())),
            },
            _ => Err(shape_error(abi.parameter_type())),
        })
        .collect()
}

/// Decodes the aggregator's `bytes[]` result payload.
///
/// An empty payload (`0x`) means the aggregator produced no return data and decodes to an
/// empty result without touching the ABI decoder.
pub fn decode_batch_result(
    abi: &AggregatorAbi,
    raw: &[u8],
) -> Result<MulticallResult, alloy::dyn_abi::Error> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let DynSolValue::Array(items) = decode_single(abi.result_type(), raw)? else {
        return Err(shape_error(abi.result_type()));
    };
    items
        .into_iter()
        .map(|item| match item {
            DynSolValue::Bytes(data) => Ok(data.into()),
            _ => Err(shape_error(abi.result_type())),
        })
        .collect()
}

/// Decodes the data section of the aggregator's result event.
pub fn decode_result_event(
    abi: &AggregatorAbi,
    log_data: &[u8],
) -> Result<MulticallResult, alloy::dyn_abi::Error> {
    let DynSolValue::Bytes(payload) = decode_single(&DynSolType::Bytes, log_data)? else {
        return Err(shape_error(&DynSolType::Bytes));
    };
    decode_batch_result(abi, &payload)
}

/// Decodes `data` as `abi.decode(data, (ty))`.
fn decode_single(ty: &DynSolType, data: &[u8]) -> Result<DynSolValue, alloy::dyn_abi::Error> {
    match DynSolType::Tuple(vec![ty.clone()]).abi_decode_params(data)? {
        DynSolValue::Tuple(values) => values.into_iter().next().ok_or_else(|| shape_error(ty)),
        _ => Err(shape_error(ty)),
    }
}

fn shape_error(expected: &DynSolType) -> alloy::dyn_abi::Error {
    alloy::sol_types::Error::custom(format!(
        "decoded value does not match `{}`",
        expected.sol_type_name()
    ))
    .into()
}
