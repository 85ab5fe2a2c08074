//! CoinSpot 커넥터 통합 테스트

#![cfg(feature = "cex")]

mod common;

use std::sync::Arc;

use common::MockTransport;
use rust_decimal_macros::dec;
use serde_json::json;
use venue_connect::{
    Coinspot, Exchange, ExchangeConfig, HttpMethod, OrderRequest, OrderSide, OrderStatus, Params,
};

fn coinspot(transport: Arc<MockTransport>) -> Coinspot {
    let config = ExchangeConfig::new()
        .with_api_key("key")
        .with_api_secret("secret");
    Coinspot::new(config, transport).unwrap()
}

#[tokio::test]
async fn test_fetch_balance_ltc() {
    let transport = Arc::new(MockTransport::new().respond(
        "api/my/balances",
        json!({
            "status": "ok",
            "balances": [
                {"LTC": {"balance": 0.1, "audbalance": 16.5, "rate": 165}},
                {"AUD": {"balance": 20, "audbalance": 20, "rate": 1}}
            ]
        }),
    ));
    let exchange = coinspot(transport.clone());

    let balances = exchange.fetch_balance(Params::new()).await.unwrap();
    let ltc = balances.get("LTC").unwrap();
    assert_eq!(ltc.total.as_deref(), Some("0.1"));
    assert!(ltc.free.is_none());
    assert!(ltc.used.is_none());
    assert_eq!(balances.total("AUD"), Some("20"));

    // 마켓 카탈로그는 정적이라 요청은 잔고 한 번뿐
    assert_eq!(transport.calls(), 1);
    assert_eq!(transport.requests()[0].method, HttpMethod::Post);
}

#[tokio::test]
async fn test_read_only_balance_endpoint() {
    let transport = Arc::new(MockTransport::new().respond(
        "api/ro/my/balances",
        json!({"status": "ok", "balances": [{"BTC": {"balance": 1.5}}]}),
    ));
    let config = ExchangeConfig::new()
        .with_api_key("key")
        .with_api_secret("secret")
        .with_option("fetchBalance", "ro/my/balances");
    let exchange = Coinspot::new(config, transport.clone()).unwrap();

    let balances = exchange.fetch_balance(Params::new()).await.unwrap();
    assert_eq!(balances.total("BTC"), Some("1.5"));
    assert_eq!(transport.calls_to("/ro/my/balances"), 1);
}

#[tokio::test]
async fn test_fetch_ticker_and_missing_id() {
    let transport = Arc::new(MockTransport::new().respond(
        "pubapi/latest",
        json!({
            "status": "ok",
            "prices": {
                "btc": {"bid": "60000", "ask": "60100", "last": "60050"},
                "ltc": {"bid": "160", "ask": "161", "last": "160.5"}
            }
        }),
    ));
    let exchange = coinspot(transport);

    let ticker = exchange.fetch_ticker("LTC/AUD", Params::new()).await.unwrap();
    assert_eq!(ticker.symbol.as_deref(), Some("LTC/AUD"));
    assert_eq!(ticker.bid.as_deref(), Some("160"));
    assert_eq!(ticker.close.as_deref(), Some("160.5"));
    assert!(ticker.timestamp.is_some());

    let err = exchange.fetch_ticker("DOGE/AUD", Params::new()).await.unwrap_err();
    assert_eq!(err.code(), "BAD_SYMBOL");
}

#[tokio::test]
async fn test_fetch_order_book() {
    let transport = Arc::new(MockTransport::new().respond(
        "api/orders",
        json!({
            "status": "ok",
            "buyorders": [{"rate": 99, "amount": 1}, {"rate": 100, "amount": 2}],
            "sellorders": [{"rate": 102, "amount": 1}, {"rate": 101, "amount": 3}]
        }),
    ));
    let exchange = coinspot(transport);

    let book = exchange
        .fetch_order_book("BTC/AUD", Some(1), Params::new())
        .await
        .unwrap();
    assert_eq!(book.bids.len(), 1);
    assert_eq!(book.bids[0].price, "100");
    assert_eq!(book.asks[0].price, "101");
}

#[tokio::test]
async fn test_create_and_cancel_order() {
    let transport = Arc::new(
        MockTransport::new()
            .respond("api/my/sell", json!({"status": "ok", "id": "abc"}))
            .respond("api/my/sell/cancel", json!({"status": "ok"})),
    );
    let exchange = coinspot(transport.clone());

    let order = exchange
        .create_order(OrderRequest::limit("BTC/AUD", OrderSide::Sell, dec!(0.01), dec!(65000)))
        .await
        .unwrap();
    assert_eq!(order.id.as_deref(), Some("abc"));
    assert_eq!(order.status, Some(OrderStatus::Open));

    let canceled = exchange
        .cancel_order("abc", Some("BTC/AUD"), Params::new().with("side", "sell"))
        .await
        .unwrap();
    assert_eq!(canceled.status, Some(OrderStatus::Canceled));

    let cancel = transport
        .requests()
        .into_iter()
        .find(|r| r.url.ends_with("my/sell/cancel"))
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(cancel.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["id"], "abc");
    assert!(body.get("side").is_none());
}

#[tokio::test]
async fn test_market_orders_not_supported() {
    let transport = Arc::new(MockTransport::new());
    let exchange = coinspot(transport.clone());

    let err = exchange
        .create_order(OrderRequest::market("BTC/AUD", OrderSide::Buy, dec!(1)))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_SUPPORTED");

    let err = exchange
        .fetch_positions(Some(&["BTC/AUD"][..]), Params::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_SUPPORTED");
    assert!(!exchange.has_feature("fetchPositions"));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_venue_failure_message() {
    let transport = Arc::new(MockTransport::new().respond(
        "api/my/balances",
        json!({"status": "error", "message": "Invalid API key"}),
    ));
    let exchange = coinspot(transport);

    let err = exchange.fetch_balance(Params::new()).await.unwrap_err();
    assert_eq!(err.code(), "EXCHANGE_ERROR");
    assert!(err.to_string().contains("Invalid API key"));
    assert!(!err.to_string().contains("secret"));
}
