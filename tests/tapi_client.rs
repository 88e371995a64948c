//! TAPI client tests against a mock server.
//!
//! These tests pin the wire contract: parameter ordering, string-literal
//! booleans, optional-key omission, the authentication headers and the
//! envelope/transport failure handling. The mock only matches when the
//! request hits the exact `/tapi/v3/` path, so a path divergence between
//! signing and sending shows up as an unmatched mock.

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use rust_decimal_macros::dec;

use mercadobtc_utils::error::{ApiError, ErrorClassification};
use mercadobtc_utils::tapi::types::OrderStatus;
use mercadobtc_utils::tapi::{
    ListOrdersFilter, OrderSide, TapiClient, TapiHmacSigner, DEFAULT_COIN_PAIR,
};

const TEST_TAPI_ID: &str = "test_tapi_id";
const TEST_TAPI_SECRET: &str = "test_tapi_secret";

/// 128 lowercase hex chars, the width of an HMAC-SHA512 digest
const MAC_PATTERN: &str = "^[0-9a-f]{128}$";

async fn test_server() -> (ServerGuard, TapiClient) {
    let server = Server::new_async().await;
    let signer = TapiHmacSigner::new(TEST_TAPI_ID, TEST_TAPI_SECRET).unwrap();
    let client = TapiClient::new(reqwest::Client::new(), Arc::new(signer), server.url());
    (server, client)
}

fn success_body(response_data: &str) -> String {
    format!(r#"{{"status_code": 100, "response_data": {response_data}}}"#)
}

const ORDER_JSON: &str = r#"{
    "order_id": 1459,
    "coin_pair": "BRLBTC",
    "order_type": 1,
    "status": 2,
    "has_fills": false,
    "quantity": "0.10000000",
    "limit_price": "30000.00000",
    "executed_quantity": "0.00000000",
    "executed_price_avg": "0.00000",
    "fee": "0.00000000",
    "created_timestamp": "1609459200",
    "updated_timestamp": "1609459200",
    "operations": []
}"#;

// ============================================================================
// Account information
// ============================================================================

#[tokio::test]
async fn test_get_account_info_filters_assets_locally() {
    let (mut server, client) = test_server().await;
    let mock = server
        .mock("POST", "/tapi/v3/")
        .match_body(Matcher::Regex(
            r"^tapi_method=get_account_info&tapi_nonce=\d+$".to_string(),
        ))
        .with_body(success_body(
            r#"{"balance": {
                "btc": {"available": "1.00000000", "total": "1.00000000"},
                "brl": {"available": "500.00000", "total": "500.00000"}
            }}"#,
        ))
        .create_async()
        .await;

    let balance = client.get_account_info(Some(&["btc"])).await.unwrap();

    // The server returned both assets; only the requested one survives
    assert_eq!(balance.len(), 1);
    assert_eq!(balance["btc"].available, dec!(1.00000000));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_account_info_without_filter_returns_everything() {
    let (mut server, client) = test_server().await;
    let mock = server
        .mock("POST", "/tapi/v3/")
        .with_body(success_body(
            r#"{"balance": {
                "btc": {"available": "1.00000000", "total": "1.00000000"},
                "brl": {"available": "500.00000", "total": "500.00000"}
            }}"#,
        ))
        .create_async()
        .await;

    let balance = client.get_account_info(None).await.unwrap();

    assert_eq!(balance.len(), 2);
    assert_eq!(balance["brl"].total, dec!(500.00000));
    mock.assert_async().await;
}

// ============================================================================
// Authentication headers
// ============================================================================

#[tokio::test]
async fn test_signed_request_carries_auth_headers() {
    let (mut server, client) = test_server().await;
    let mock = server
        .mock("POST", "/tapi/v3/")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_header("tapi-id", TEST_TAPI_ID)
        .match_header("tapi-mac", Matcher::Regex(MAC_PATTERN.to_string()))
        .with_body(success_body(r#"{"balance": {}}"#))
        .create_async()
        .await;

    client.get_account_info(None).await.unwrap();
    mock.assert_async().await;
}

// ============================================================================
// Order listing
// ============================================================================

#[tokio::test]
async fn test_list_orders_omits_unsupplied_optional_keys() {
    let (mut server, client) = test_server().await;
    let mock = server
        .mock("POST", "/tapi/v3/")
        .match_body(Matcher::Regex(
            r"^tapi_method=list_orders&tapi_nonce=\d+&coin_pair=BRLBTC$".to_string(),
        ))
        .with_body(success_body(r#"{"orders": []}"#))
        .create_async()
        .await;

    let orders = client
        .list_orders(DEFAULT_COIN_PAIR, &ListOrdersFilter::new())
        .await
        .unwrap();

    assert!(orders.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_orders_encodes_optional_filters() {
    let (mut server, client) = test_server().await;
    // status_list is JSON int array text, percent-encoded in the body
    let mock = server
        .mock("POST", "/tapi/v3/")
        .match_body(Matcher::Regex(
            r"^tapi_method=list_orders&tapi_nonce=\d+&coin_pair=BRLBTC&order_type=1&status_list=%5B2%2C3%5D&has_fills=true$"
                .to_string(),
        ))
        .with_body(success_body(&format!(r#"{{"orders": [{ORDER_JSON}]}}"#)))
        .create_async()
        .await;

    let filter = ListOrdersFilter::new()
        .with_order_type(OrderSide::Buy)
        .with_status_list(vec![OrderStatus::Open, OrderStatus::Canceled])
        .with_has_fills(true);
    let orders = client.list_orders(DEFAULT_COIN_PAIR, &filter).await.unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, 1459);
    assert_eq!(orders[0].status, OrderStatus::Open);
    mock.assert_async().await;
}

// ============================================================================
// Single order / order book
// ============================================================================

#[tokio::test]
async fn test_get_order_unwraps_payload() {
    let (mut server, client) = test_server().await;
    let mock = server
        .mock("POST", "/tapi/v3/")
        .match_body(Matcher::Regex(
            r"^tapi_method=get_order&tapi_nonce=\d+&coin_pair=BRLBTC&order_id=1459$".to_string(),
        ))
        .with_body(success_body(&format!(r#"{{"order": {ORDER_JSON}}}"#)))
        .create_async()
        .await;

    let order = client.get_order(DEFAULT_COIN_PAIR, 1459).await.unwrap();

    assert_eq!(order.order_id, 1459);
    assert_eq!(order.order_type, OrderSide::Buy);
    assert_eq!(order.quantity, dec!(0.10000000));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_orderbook_sends_string_bool_full_flag() {
    let (mut server, client) = test_server().await;
    let mock = server
        .mock("POST", "/tapi/v3/")
        .match_body(Matcher::Regex(
            r"^tapi_method=list_orderbook&tapi_nonce=\d+&coin_pair=BRLBTC&full=true$".to_string(),
        ))
        .with_body(success_body(
            r#"{"orderbook": {
                "bids": [{"order_id": 10, "quantity": "0.5", "limit_price": "29000.0", "is_owner": false}],
                "asks": [{"order_id": 11, "quantity": "0.2", "limit_price": "31000.0", "is_owner": true}],
                "latest_order_id": 11
            }}"#,
        ))
        .create_async()
        .await;

    let book = client.list_orderbook(DEFAULT_COIN_PAIR, true).await.unwrap();

    assert_eq!(book.bids.len(), 1);
    assert_eq!(book.asks.len(), 1);
    assert!(book.asks[0].is_owner);
    assert_eq!(book.latest_order_id, Some(11));
    mock.assert_async().await;
}

// ============================================================================
// Placing and canceling orders
// ============================================================================

#[tokio::test]
async fn test_place_buy_order_uses_buy_method_tag() {
    let (mut server, client) = test_server().await;
    let mock = server
        .mock("POST", "/tapi/v3/")
        .match_body(Matcher::Regex(
            r"^tapi_method=place_buy_order&tapi_nonce=\d+&coin_pair=BRLBTC&quantity=0.10000000&limit_price=30000.00000&async=false$"
                .to_string(),
        ))
        .with_body(success_body(&format!(r#"{{"order": {ORDER_JSON}}}"#)))
        .create_async()
        .await;

    let order = client
        .place_order(
            OrderSide::Buy,
            DEFAULT_COIN_PAIR,
            dec!(0.10000000),
            dec!(30000.00000),
            false,
        )
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Open);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_place_sell_order_uses_sell_method_tag() {
    let (mut server, client) = test_server().await;
    let mock = server
        .mock("POST", "/tapi/v3/")
        .match_body(Matcher::Regex(
            r"^tapi_method=place_sell_order&tapi_nonce=\d+&coin_pair=BRLBTC&quantity=0.1&limit_price=35000&async=true$"
                .to_string(),
        ))
        .with_body(success_body(&format!(r#"{{"order": {ORDER_JSON}}}"#)))
        .create_async()
        .await;

    client
        .place_order(
            OrderSide::Sell,
            DEFAULT_COIN_PAIR,
            dec!(0.1),
            dec!(35000),
            true,
        )
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_order_sends_id_and_async_flag() {
    let (mut server, client) = test_server().await;
    let mock = server
        .mock("POST", "/tapi/v3/")
        .match_body(Matcher::Regex(
            r"^tapi_method=cancel_order&tapi_nonce=\d+&coin_pair=BRLBTC&order_id=1459&async=false$"
                .to_string(),
        ))
        .with_body(success_body(&format!(r#"{{"order": {ORDER_JSON}}}"#)))
        .create_async()
        .await;

    client
        .cancel_order(DEFAULT_COIN_PAIR, 1459, false)
        .await
        .unwrap();

    mock.assert_async().await;
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test]
async fn test_envelope_failure_carries_server_message() {
    let (mut server, client) = test_server().await;
    let _mock = server
        .mock("POST", "/tapi/v3/")
        .with_body(r#"{"status_code": 200, "error_message": "bad nonce"}"#)
        .create_async()
        .await;

    let err = client.get_account_info(None).await.unwrap_err();

    // A nonce rejection is an authentication failure carrying the message
    assert!(err.is_auth_error());
    assert_eq!(err.envelope_code(), Some(200));
    assert!(err.to_string().contains("bad nonce"));
}

#[tokio::test]
async fn test_envelope_failure_other_rejections() {
    let (mut server, client) = test_server().await;
    let _mock = server
        .mock("POST", "/tapi/v3/")
        .with_body(r#"{"status_code": 207, "error_message": "Insufficient funds"}"#)
        .create_async()
        .await;

    let err = client
        .place_order(
            OrderSide::Buy,
            DEFAULT_COIN_PAIR,
            dec!(100),
            dec!(30000),
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Api { code: 207, .. }));
    assert!(err.is_permanent());
    assert!(err.to_string().contains("Insufficient funds"));
}

#[tokio::test]
async fn test_transport_failure_skips_body_parse() {
    let (mut server, client) = test_server().await;
    // Non-JSON body: a parse attempt would surface as ApiError::Parse
    let _mock = server
        .mock("POST", "/tapi/v3/")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let err = client.get_account_info(None).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { code: 500, .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_connection_failure_is_classified_transient() {
    // Nothing listens here; the request fails at the transport level
    let signer = TapiHmacSigner::new(TEST_TAPI_ID, TEST_TAPI_SECRET).unwrap();
    let client = TapiClient::new(
        reqwest::Client::new(),
        Arc::new(signer),
        "http://127.0.0.1:1",
    );

    let err = client.get_account_info(None).await.unwrap_err();

    assert!(matches!(err, ApiError::Connection(_)));
    assert!(err.is_transient());
    assert!(err.is_transport());
}
