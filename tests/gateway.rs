use std::str::FromStr as _;

use alloy::primitives::{address, U256};
use alloy::signers::local::PrivateKeySigner;
use faucet_army::config::{DEFAULT_GAS_PRICE_WEI, GAS_LIMIT_TX};
use faucet_army::errors::Error;
use faucet_army::{AlloyGateway, ErrorKind, LedgerGateway, Result, TxParams};
use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;
use url::Url;

const PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

const HOLDER: alloy::primitives::Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

#[tokio::test]
async fn connect_should_read_chain_id() -> Result<()> {
    let server = MockServer::start_async().await;

    let chain_id = server
        .mock_async(|when, then| {
            when.method(POST).body_contains("eth_chainId");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "jsonrpc": "2.0", "id": 0, "result": "0x7f93" }));
        })
        .await;

    let gateway = AlloyGateway::connect(Url::parse(&server.url("/"))?).await?;

    assert_eq!(gateway.chain_id(), 32659);
    chain_id.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn get_balance_should_decode_quantity() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).body_contains("eth_chainId");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "jsonrpc": "2.0", "id": 0, "result": "0x7f93" }));
        })
        .await;
    let balance = server
        .mock_async(|when, then| {
            when.method(POST).body_contains("eth_getBalance");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": "0xde0b6b3a7640000" }));
        })
        .await;

    let gateway = AlloyGateway::connect(Url::parse(&server.url("/"))?).await?;
    let amount = gateway.get_balance(HOLDER).await?;

    assert_eq!(amount, U256::from(1_000_000_000_000_000_000u64));
    balance.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn connect_should_fail_on_http_error() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(503).body("upstream unavailable");
        })
        .await;

    let err = match AlloyGateway::connect(Url::parse(&server.url("/"))?).await {
        Ok(_) => panic!("connect should fail against a failing endpoint"),
        Err(err) => err,
    };

    assert!(matches!(err, Error::Rpc(_)));
    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert!(!err.is_fatal());

    Ok(())
}

#[tokio::test]
async fn submit_should_classify_node_refusal_as_rejected() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).body_contains("eth_chainId");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "jsonrpc": "2.0", "id": 0, "result": "0x7f93" }));
        })
        .await;
    let send = server
        .mock_async(|when, then| {
            when.method(POST).body_contains("eth_sendRawTransaction");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": { "code": -32000, "message": "replacement transaction underpriced" }
                }));
        })
        .await;

    let gateway = AlloyGateway::connect(Url::parse(&server.url("/"))?).await?;
    let signer = PrivateKeySigner::from_str(PRIVATE_KEY)?;
    let params = TxParams::new(DEFAULT_GAS_PRICE_WEI, GAS_LIMIT_TX)
        .value(U256::from(1u64))
        .nonce(0);

    let err = match gateway.submit_native_transfer(&signer, HOLDER, params).await {
        Ok(_) => panic!("submission should be refused"),
        Err(err) => err,
    };

    assert!(matches!(&err, Error::Rejected(msg) if msg == "replacement transaction underpriced"));
    assert_eq!(err.kind(), ErrorKind::Transaction);
    assert!(!err.is_fatal());
    send.assert_async().await;

    Ok(())
}
