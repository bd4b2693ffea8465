//! Batch dispatch against an in-memory transport.

use alloy::{
    primitives::{Address, Bytes, Log, U256, address, bytes},
    sol_types::{SolCall, SolEvent, SolValue},
};
use multicall::{
    MulticallClient,
    codec::{encode_batch_parameter, encode_transfer},
    error::{EncodingError, MulticallError},
    transactions::{BatchTransaction, MulticallTransport},
    types::{AggregatorAbi, CallDescriptor, IMulticall, Transfer},
};
use std::sync::Mutex;

const AGGREGATOR: Address = address!("0xa88774b174fde5709df7e90d85ff973595bc7538");
const TOKEN: Address = address!("0x000000000000000000000000000000000000dEaD");
const ALICE: Address = address!("0x1111111111111111111111111111111111111111");
const BOB: Address = address!("0x2222222222222222222222222222222222222222");

#[derive(Debug, thiserror::Error)]
#[error("mock transport failed while {0}")]
struct MockError(&'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailAt {
    Estimate,
    Send,
    Wait,
}

/// Records what was sent and replies with a fixed set of logs.
#[derive(Debug)]
struct MockTransport {
    gas_estimate: u64,
    logs: Vec<Log>,
    fail_at: Option<FailAt>,
    estimated: Mutex<Vec<BatchTransaction>>,
    sent: Mutex<Vec<(BatchTransaction, u64)>>,
}

impl MockTransport {
    fn new(logs: Vec<Log>) -> Self {
        Self {
            gas_estimate: 21_000,
            logs,
            fail_at: None,
            estimated: Mutex::default(),
            sent: Mutex::default(),
        }
    }

    fn failing(fail_at: FailAt) -> Self {
        Self { fail_at: Some(fail_at), ..Self::new(vec![result_log(AGGREGATOR, Bytes::new())]) }
    }

    fn sent(&self) -> Vec<(BatchTransaction, u64)> {
        self.sent.lock().unwrap().clone()
    }
}

impl MulticallTransport for MockTransport {
    type Pending = usize;
    type Error = MockError;

    async fn estimate_gas(&self, tx: &BatchTransaction) -> Result<u64, Self::Error> {
        if self.fail_at == Some(FailAt::Estimate) {
            return Err(MockError("estimating"));
        }
        self.estimated.lock().unwrap().push(tx.clone());
        Ok(self.gas_estimate)
    }

    async fn send_transaction(
        &self,
        tx: &BatchTransaction,
        gas_limit: u64,
    ) -> Result<Self::Pending, Self::Error> {
        if self.fail_at == Some(FailAt::Send) {
            return Err(MockError("sending"));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((tx.clone(), gas_limit));
        Ok(sent.len() - 1)
    }

    async fn wait(&self, _pending: Self::Pending) -> Result<Vec<Log>, Self::Error> {
        if self.fail_at == Some(FailAt::Wait) {
            return Err(MockError("waiting"));
        }
        Ok(self.logs.clone())
    }
}

fn result_log(address: Address, return_data: Bytes) -> Log {
    Log {
        address,
        data: IMulticall::MulticallResult { returnData: return_data }.encode_log_data(),
    }
}

/// A client whose aggregator returns no data.
fn client_with_empty_result() -> MulticallClient<MockTransport> {
    MulticallClient::new(MockTransport::new(vec![result_log(AGGREGATOR, Bytes::new())]), AGGREGATOR)
}

fn encoded_results(results: &[Bytes]) -> Bytes {
    results.to_vec().abi_encode().into()
}

#[tokio::test]
async fn erc20_batch_with_empty_result() {
    let client = client_with_empty_result();
    let transfers =
        [Transfer::native(ALICE, U256::from(100)), Transfer::native(BOB, U256::from(200))];

    let results = client.batch_erc20_transfers(TOKEN, &transfers).await.unwrap();
    assert!(results.is_empty());

    let sent = client.transport().sent();
    assert_eq!(sent.len(), 1);
    let (tx, gas_limit) = &sent[0];
    assert_eq!(*gas_limit, 25_200);
    assert_eq!(tx.to, AGGREGATOR);
    assert_eq!(tx.value, U256::ZERO);
    assert_eq!(tx.input[..4], IMulticall::multicallCall::SELECTOR);

    let calls = [
        CallDescriptor::new(TOKEN, encode_transfer(ALICE, U256::from(100))),
        CallDescriptor::new(TOKEN, encode_transfer(BOB, U256::from(200))),
    ];
    assert_eq!(tx.input[4..], encode_batch_parameter(&AggregatorAbi::v1(), &calls)[..]);

    // the estimate covers the same transaction that was sent
    assert_eq!(client.transport().estimated.lock().unwrap().as_slice(), &[tx.clone()]);
}

#[tokio::test]
async fn native_batch_attaches_total_value() {
    let client = client_with_empty_result();

    client
        .batch_native_transfers(&[
            Transfer::native(ALICE, U256::from(1_000)),
            Transfer::native(BOB, U256::from(234)),
        ])
        .await
        .unwrap();

    let (tx, _) = &client.transport().sent()[0];
    assert_eq!(tx.value, U256::from(1_234));
}

#[tokio::test]
async fn mixed_batch_routes_by_asset() {
    let client = client_with_empty_result();

    client
        .batch_mixed_transfers(&[
            Transfer::native(ALICE, U256::from(5)),
            Transfer::token(TOKEN, BOB, U256::from(7)),
        ])
        .await
        .unwrap();

    let (tx, _) = &client.transport().sent()[0];
    assert_eq!(tx.value, U256::from(5));
    let expected = client
        .prepare(&[
            CallDescriptor::native_transfer(ALICE, U256::from(5)),
            CallDescriptor::new(TOKEN, encode_transfer(BOB, U256::from(7))),
        ])
        .unwrap();
    assert_eq!(*tx, expected);
}

#[tokio::test]
async fn decodes_return_data_in_order() {
    let returned = vec![bytes!("0x01"), Bytes::new(), bytes!("0xdeadbeef")];
    let unrelated = Log {
        address: TOKEN,
        data: IMulticall::MulticallResult { returnData: bytes!("0xff") }.encode_log_data(),
    };
    let transport =
        MockTransport::new(vec![unrelated, result_log(AGGREGATOR, encoded_results(&returned))]);
    let client = MulticallClient::new(transport, AGGREGATOR);

    let results = client
        .batch_calls(&[CallDescriptor::native_transfer(ALICE, U256::from(1))])
        .await
        .unwrap();
    assert_eq!(results, returned);
}

#[tokio::test]
async fn missing_result_event() {
    for logs in [vec![], vec![result_log(TOKEN, Bytes::new())]] {
        let client = MulticallClient::new(MockTransport::new(logs), AGGREGATOR);
        let err = client.batch_native_transfers(&[Transfer::native(ALICE, U256::from(1))]).await;
        let Err(MulticallError::ResultNotFound { event }) = err else {
            panic!("expected a missing result event, got {err:?}")
        };
        assert_eq!(event, "MulticallResult");
    }
}

#[tokio::test]
async fn malformed_result_payload() {
    let client = MulticallClient::new(
        MockTransport::new(vec![result_log(AGGREGATOR, bytes!("0x1234"))]),
        AGGREGATOR,
    );
    let err = client.batch_native_transfers(&[Transfer::native(ALICE, U256::from(1))]).await;
    assert!(matches!(err, Err(MulticallError::Decoding(_))));
}

#[tokio::test]
async fn transport_failures_map_to_stage() {
    let transfers = [Transfer::native(ALICE, U256::from(1))];

    let client = MulticallClient::new(MockTransport::failing(FailAt::Estimate), AGGREGATOR);
    let err = client.batch_native_transfers(&transfers).await.unwrap_err();
    assert!(matches!(err, MulticallError::GasEstimation(_)));
    assert!(client.transport().sent().is_empty());

    let client = MulticallClient::new(MockTransport::failing(FailAt::Send), AGGREGATOR);
    let err = client.batch_native_transfers(&transfers).await.unwrap_err();
    assert!(matches!(err, MulticallError::Submission(_)));

    let client = MulticallClient::new(MockTransport::failing(FailAt::Wait), AGGREGATOR);
    let err = client.batch_native_transfers(&transfers).await.unwrap_err();
    assert!(matches!(err, MulticallError::Confirmation(_)));
    assert_eq!(client.transport().sent().len(), 1);
}

#[tokio::test]
async fn empty_batch_is_sent() {
    let client = client_with_empty_result();

    let results = client.batch_calls(&[]).await.unwrap();
    assert!(results.is_empty());

    let (tx, _) = &client.transport().sent()[0];
    assert_eq!(tx.value, U256::ZERO);
    assert_eq!(tx.input.len(), 4 + 64);
}

#[tokio::test]
async fn custom_batch_defaults_missing_values() {
    let client = client_with_empty_result();

    client
        .custom_batch_call_str(
            TOKEN,
            "approve(address,uint256)",
            &[
                vec!["0x1111111111111111111111111111111111111111", "1"],
                vec!["0x2222222222222222222222222222222222222222", "2"],
            ],
            &[U256::from(10)],
        )
        .await
        .unwrap();

    let (tx, _) = &client.transport().sent()[0];
    assert_eq!(tx.value, U256::from(10));
}

#[tokio::test]
async fn value_overflow_fails_before_estimation() {
    let client = client_with_empty_result();

    let err = client
        .batch_native_transfers(&[
            Transfer::native(ALICE, U256::MAX),
            Transfer::native(BOB, U256::from(1)),
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, MulticallError::Encoding(EncodingError::ValueOverflow { .. })));
    assert!(err.is_local());
    assert!(client.transport().estimated.lock().unwrap().is_empty());
    assert!(client.transport().sent().is_empty());
}

#[tokio::test]
async fn custom_gas_margin() {
    let client = client_with_empty_result().with_gas_margin_percent(50);

    client.batch_calls(&[]).await.unwrap();
    assert_eq!(client.transport().sent()[0].1, 31_500);
}
