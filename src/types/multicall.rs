//! Aggregator contract interface.
//!
//! The aggregator accepts an array of `(address target, bytes callData)` tuples, executes them
//! in order and emits the ABI-encoded `bytes[]` of return data in a single event. Native value
//! attached to the outer transaction is redistributed to sub-calls by the contract itself; this
//! crate only sums and attaches it.

use crate::error::EncodingError;
use alloy::{
    dyn_abi::{DynSolType, Specifier},
    json_abi::{Event, Function},
    primitives::{B256, Selector},
    sol,
    sol_types::JsonAbiExt,
};

sol! {
    /// The `v1` aggregator deployment.
    #[sol(abi)]
    #[derive(Debug, PartialEq, Eq)]
    interface IMulticall {
        /// A single call in a batch.
        struct Call {
            /// Target contract address.
            address target;
            /// Encoded function call data.
            bytes callData;
        }

        /// Emitted once per batch with the ABI-encoded `bytes[]` of results, or empty data when
        /// nothing was returned.
        event MulticallResult(bytes returnData);

        /// Execute multiple calls in a single transaction.
        function multicall(Call[] calldata calls) external payable;
    }
}

/// Human readable signature of the `v1` batch function.
pub const V1_FUNCTION_SIGNATURE: &str =
    "function multicall((address,bytes)[] calls) payable";

/// Human readable signature of the `v1` result event.
pub const V1_EVENT_SIGNATURE: &str = "event MulticallResult(bytes returnData)";

/// A versioned aggregator ABI.
///
/// Constructed once and shape-checked, then handed to the codec and the dispatcher so that a
/// different deployment can be targeted without touching the batching logic.
#[derive(Debug, Clone)]
pub struct AggregatorAbi {
    version: String,
    function: Function,
    result_event: Event,
    parameter_type: DynSolType,
    result_type: DynSolType,
}

impl AggregatorAbi {
    /// Parses and validates an aggregator interface.
    ///
    /// The function must take exactly one `(address,bytes)[]` argument and the event must carry
    /// exactly one non-indexed `bytes` field.
    pub fn new(
        version: impl Into<String>,
        function_signature: &str,
        event_signature: &str,
    ) -> Result<Self, EncodingError> {
        let function = Function::parse(function_signature).map_err(|err| {
            EncodingError::Signature {
                signature: function_signature.to_string(),
                reason: err.to_string(),
            }
        })?;
        let result_event = Event::parse(event_signature).map_err(|err| {
            EncodingError::Signature {
                signature: event_signature.to_string(),
                reason: err.to_string(),
            }
        })?;
        Self::from_parts(version, function, result_event)
    }

    /// Validates an already parsed function and result event.
    pub fn from_parts(
        version: impl Into<String>,
        function: Function,
        result_event: Event,
    ) -> Result<Self, EncodingError> {
        let parameter_type = match function.inputs.as_slice() {
            [param] => param.resolve()?,
            inputs => {
                return Err(EncodingError::InvalidInterface(format!(
                    "{} takes {} arguments, expected 1",
                    function.name,
                    inputs.len()
                )));
            }
        };
        if parameter_type != Self::call_array_type() {
            return Err(EncodingError::InvalidInterface(format!(
                "{} takes `{}`, expected `(address,bytes)[]`",
                function.name,
                parameter_type.sol_type_name()
            )));
        }

        if result_event.anonymous {
            return Err(EncodingError::InvalidInterface(format!(
                "{} is anonymous and cannot be found by topic",
                result_event.name
            )));
        }

        let mut body = result_event.inputs.iter().filter(|param| !param.indexed);
        match (body.next(), body.next()) {
            (Some(param), None) if param.resolve()? == DynSolType::Bytes => {}
            _ => {
                return Err(EncodingError::InvalidInterface(format!(
                    "{} must carry exactly one non-indexed `bytes` field",
                    result_event.name
                )));
            }
        }

        Ok(Self {
            version: version.into(),
            function,
            result_event,
            parameter_type,
            result_type: Self::result_array_type(),
        })
    }

    /// The interface of the `v1` aggregator deployment, taken from the [`IMulticall`] bindings.
    pub fn v1() -> Self {
        Self {
            version: "v1".to_string(),
            function: IMulticall::multicallCall::abi(),
            result_event: IMulticall::MulticallResult::abi(),
            parameter_type: Self::call_array_type(),
            result_type: Self::result_array_type(),
        }
    }

    /// The interface version label.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The batch function.
    pub const fn function(&self) -> &Function {
        &self.function
    }

    /// The batch function selector.
    pub fn selector(&self) -> Selector {
        self.function.selector()
    }

    /// The result event.
    pub const fn result_event(&self) -> &Event {
        &self.result_event
    }

    /// The name of the result event.
    pub fn result_event_name(&self) -> &str {
        &self.result_event.name
    }

    /// The topic identifying the result event in logs.
    pub fn result_topic(&self) -> B256 {
        self.result_event.selector()
    }

    /// The type of the single batch argument, `(address,bytes)[]`.
    pub const fn parameter_type(&self) -> &DynSolType {
        &self.parameter_type
    }

    /// The type of the decoded result payload, `bytes[]`.
    pub const fn result_type(&self) -> &DynSolType {
        &self.result_type
    }

    fn result_array_type() -> DynSolType {
        DynSolType::Array(Box::new(DynSolType::Bytes))
    }

    fn call_array_type() -> DynSolType {
        DynSolType::Array(Box::new(DynSolType::Tuple(vec![
            DynSolType::Address,
            DynSolType::Bytes,
        ])))
    }
}

/// Two interfaces are equal when they encode and decode batches identically. Parameter names and
/// internal types are ignored.
impl PartialEq for AggregatorAbi {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.selector() == other.selector()
            && self.result_topic() == other.result_topic()
            && self.parameter_type == other.parameter_type
            && self.result_type == other.result_type
    }
}

impl Eq for AggregatorAbi {}

impl Default for AggregatorAbi {
    fn default() -> Self {
        Self::v1()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::{SolCall, SolEvent};

    #[test]
    fn v1_matches_sol_bindings() {
        let abi = AggregatorAbi::v1();
        assert_eq!(abi.version(), "v1");
        assert_eq!(abi.selector(), IMulticall::multicallCall::SELECTOR);
        assert_eq!(abi.result_topic(), IMulticall::MulticallResult::SIGNATURE_HASH);
        assert_eq!(abi.result_event_name(), "MulticallResult");
    }

    #[test]
    fn v1_signatures_parse_to_bindings() {
        let function = Function::parse(V1_FUNCTION_SIGNATURE).unwrap();
        assert_eq!(function.selector(), IMulticall::multicallCall::SELECTOR);
        assert_eq!(function.signature(), IMulticall::multicallCall::SIGNATURE);

        let event = Event::parse(V1_EVENT_SIGNATURE).unwrap();
        assert_eq!(event.selector(), IMulticall::MulticallResult::SIGNATURE_HASH);

        let parsed = AggregatorAbi::new("v1", V1_FUNCTION_SIGNATURE, V1_EVENT_SIGNATURE).unwrap();
        assert_eq!(parsed, AggregatorAbi::v1());

        let from_bindings = AggregatorAbi::from_parts(
            "v1",
            IMulticall::multicallCall::abi(),
            IMulticall::MulticallResult::abi(),
        )
        .unwrap();
        assert_eq!(from_bindings, AggregatorAbi::v1());
    }

    #[test]
    fn accepts_renamed_deployment() {
        let abi = AggregatorAbi::new(
            "batcher",
            "function batch((address,bytes)[] calls) payable",
            "event BatchResult(address indexed sender, bytes data)",
        )
        .unwrap();
        assert_ne!(abi.selector(), AggregatorAbi::v1().selector());
        assert_eq!(abi.parameter_type(), AggregatorAbi::v1().parameter_type());
    }

    #[test]
    fn rejects_mismatched_shapes() {
        // multicall3 style tuples carry an extra field
        let err = AggregatorAbi::new(
            "v3",
            "function aggregate3((address,bool,bytes)[] calls) payable",
            V1_EVENT_SIGNATURE,
        )
        .unwrap_err();
        assert!(matches!(err, EncodingError::InvalidInterface(_)));

        let err = AggregatorAbi::new(
            "v1",
            V1_FUNCTION_SIGNATURE,
            "event MulticallResult(bytes returnData, uint256 count)",
        )
        .unwrap_err();
        assert!(matches!(err, EncodingError::InvalidInterface(_)));

        let err = AggregatorAbi::new(
            "v1",
            V1_FUNCTION_SIGNATURE,
            "event MulticallResult(bytes returnData) anonymous",
        )
        .unwrap_err();
        assert!(matches!(err, EncodingError::InvalidInterface(_)));

        let err = AggregatorAbi::new("v1", "multicall(", V1_EVENT_SIGNATURE).unwrap_err();
        assert!(matches!(err, EncodingError::Signature { .. }));
    }
}
