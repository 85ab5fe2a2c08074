//! bitFlyer 커넥터 통합 테스트

#![cfg(feature = "cex")]

mod common;

use std::sync::Arc;

use common::MockTransport;
use rust_decimal_macros::dec;
use serde_json::json;
use venue_connect::{
    Bitflyer, Exchange, ExchangeConfig, HttpMethod, OrderRequest, OrderSide, OrderStatus,
    OrderType, Params, RawResponse, TransactionStatus, TransactionType,
};

fn catalogs(transport: MockTransport) -> MockTransport {
    transport
        .respond(
            "v1/getmarkets",
            json!([
                {"product_code": "BTC_JPY", "market_type": "Spot"},
                {"product_code": "ETH_BTC", "market_type": "Spot"},
                {"product_code": "FX_BTC_JPY", "market_type": "FX"},
                {"product_code": "BTCJPY25MAR2022", "alias": "BTCJPY_MAT3M", "market_type": "Futures"}
            ]),
        )
        .respond("v1/getmarkets/usa", json!([{"product_code": "BTC_USD", "market_type": "Spot"}]))
        .respond("v1/getmarkets/eu", json!([{"product_code": "BTC_EUR", "market_type": "Spot"}]))
}

fn bitflyer(transport: Arc<MockTransport>) -> Bitflyer {
    let config = ExchangeConfig::new()
        .with_api_key("key")
        .with_api_secret("secret");
    Bitflyer::new(config, transport).unwrap()
}

#[tokio::test]
async fn test_load_markets_merges_catalogs() {
    let transport = Arc::new(catalogs(MockTransport::new()));
    let exchange = bitflyer(transport.clone());

    let markets = exchange.load_markets(false).await.unwrap();
    assert_eq!(markets.len(), 6);
    assert_eq!(transport.calls(), 3);

    let swap = markets.get("BTC/JPY:JPY").unwrap();
    assert_eq!(swap.id, "FX_BTC_JPY");
    assert_eq!(swap.settle.as_deref(), Some("JPY"));

    let future = markets.get("BTC/JPY:JPY-220325").unwrap();
    assert!(future.future);
    assert_eq!(future.expiry_datetime.as_deref(), Some("2022-03-25T00:00:00.000Z"));

    assert!(markets.get("BTC/USD").is_some());
    assert_eq!(markets.by_id("ETH_BTC").unwrap().symbol, "ETH/BTC");
}

#[tokio::test]
async fn test_fetch_order_book() {
    let transport = Arc::new(catalogs(MockTransport::new()).respond(
        "v1/getboard",
        json!({
            "mid_price": 33320,
            "bids": [{"price": 30000, "size": 0.1}, {"price": 25570, "size": 3}],
            "asks": [{"price": 36640, "size": 5}, {"price": 36700, "size": 1.2}]
        }),
    ));
    let exchange = bitflyer(transport.clone());

    let book = exchange
        .fetch_order_book("BTC/JPY", None, Params::new())
        .await
        .unwrap();
    assert_eq!(book.symbol.as_deref(), Some("BTC/JPY"));
    assert_eq!(book.bids[0].price, "30000");
    assert_eq!(book.asks[0].amount, "5");
    assert_eq!(transport.calls_to("getboard?product_code=BTC_JPY"), 1);
}

#[tokio::test]
async fn test_fetch_withdrawals_fee_is_exact_sum() {
    let transport = Arc::new(catalogs(MockTransport::new()).respond(
        "me/getcoinouts",
        json!([
            {
                "id": 500,
                "order_id": "CWD20171213-090909-999999",
                "currency_code": "BTC",
                "amount": 0.1234,
                "address": "1CDtZpkYK7WkY8NdC5e5PA2jWvqrZQbt9d",
                "tx_hash": "724c07dfd4044abcb390b0412c3e707dd5c4f373f0a52b3bd295ce32b478c60a",
                "fee": 0.1,
                "additional_fee": 0.2,
                "status": "COMPLETED",
                "event_date": "2017-12-13T09:09:09.000"
            }
        ]),
    ));
    let exchange = bitflyer(transport.clone());

    let withdrawals = exchange
        .fetch_withdrawals(Some("BTC"), None, Some(10), Params::new())
        .await
        .unwrap();
    assert_eq!(withdrawals.len(), 1);
    let withdrawal = &withdrawals[0];
    assert_eq!(withdrawal.tx_type, Some(TransactionType::Withdrawal));
    assert_eq!(withdrawal.status, Some(TransactionStatus::Ok));
    assert_eq!(withdrawal.amount.as_deref(), Some("0.1234"));
    // 0.1 + 0.2, exactly
    assert_eq!(withdrawal.fee.as_ref().unwrap().cost.as_deref(), Some("0.3"));
    assert_eq!(withdrawal.timestamp, Some(1_513_156_149_000));

    let request = transport
        .requests()
        .into_iter()
        .find(|r| r.url.contains("getcoinouts"))
        .unwrap();
    assert_eq!(request.url, "https://api.bitflyer.com/v1/me/getcoinouts?count=10");
    assert!(request.header("ACCESS-SIGN").is_some());
}

#[tokio::test]
async fn test_fetch_deposits() {
    let transport = Arc::new(catalogs(MockTransport::new()).respond(
        "me/getcoinins",
        json!([
            {"id": 100, "currency_code": "BTC", "amount": 0.00002, "status": "PENDING",
             "tx_hash": "498acc28", "event_date": "2015-11-19T07:34:10.000"}
        ]),
    ));
    let exchange = bitflyer(transport);

    let deposits = exchange
        .fetch_deposits(None, None, None, Params::new())
        .await
        .unwrap();
    assert_eq!(deposits[0].tx_type, Some(TransactionType::Deposit));
    assert_eq!(deposits[0].status, Some(TransactionStatus::Pending));
    assert!(deposits[0].fee.is_none());
}

#[tokio::test]
async fn test_create_order_posts_upper_case_fields() {
    let transport = Arc::new(catalogs(MockTransport::new()).respond(
        "me/sendchildorder",
        json!({"child_order_acceptance_id": "JRF20150707-050237-639234"}),
    ));
    let exchange = bitflyer(transport.clone());

    let order = exchange
        .create_order(OrderRequest::limit("BTC/JPY", OrderSide::Buy, dec!(0.1), dec!(30000)))
        .await
        .unwrap();
    assert_eq!(order.id.as_deref(), Some("JRF20150707-050237-639234"));
    assert_eq!(order.order_type, Some(OrderType::Limit));

    let request = transport
        .requests()
        .into_iter()
        .find(|r| r.url.ends_with("sendchildorder"))
        .unwrap();
    assert_eq!(request.method, HttpMethod::Post);
    let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["child_order_type"], "LIMIT");
    assert_eq!(body["side"], "BUY");
    assert_eq!(body["product_code"], "BTC_JPY");
    assert_eq!(body["size"], 0.1);
    assert_eq!(body["price"], 30000);
}

#[tokio::test]
async fn test_cancel_order_accepts_empty_body() {
    let transport = Arc::new(
        catalogs(MockTransport::new()).respond_raw("me/cancelchildorder", RawResponse::new(200, "")),
    );
    let exchange = bitflyer(transport);

    let order = exchange
        .cancel_order("JRF1", Some("BTC/JPY"), Params::new())
        .await
        .unwrap();
    assert_eq!(order.status, Some(OrderStatus::Canceled));
    assert_eq!(order.id.as_deref(), Some("JRF1"));
}

#[tokio::test]
async fn test_fetch_open_orders_and_emulated_fetch_order() {
    let transport = Arc::new(catalogs(MockTransport::new()).respond(
        "me/getchildorders",
        json!([
            {
                "child_order_acceptance_id": "JRF1",
                "product_code": "BTC_JPY",
                "side": "SELL",
                "child_order_type": "LIMIT",
                "price": 30000,
                "size": 0.1,
                "child_order_state": "ACTIVE",
                "child_order_date": "2015-07-07T08:45:53",
                "outstanding_size": 0.1,
                "executed_size": 0
            }
        ]),
    ));
    let exchange = bitflyer(transport.clone());

    let orders = exchange
        .fetch_open_orders(Some("BTC/JPY"), None, None, Params::new())
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, Some(OrderStatus::Open));
    assert_eq!(orders[0].side, Some(OrderSide::Sell));
    assert_eq!(
        transport.calls_to("getchildorders?child_order_state=ACTIVE&count=100&product_code=BTC_JPY"),
        1
    );

    let found = exchange
        .fetch_order("JRF1", Some("BTC/JPY"), Params::new())
        .await
        .unwrap();
    assert_eq!(found.remaining.as_deref(), Some("0.1"));

    let err = exchange
        .fetch_order("JRF2", Some("BTC/JPY"), Params::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ORDER_NOT_FOUND");
}

#[tokio::test]
async fn test_fetch_trading_fee() {
    let transport = Arc::new(
        catalogs(MockTransport::new())
            .respond("me/gettradingcommission", json!({"commission_rate": 0.001})),
    );
    let exchange = bitflyer(transport);

    let fee = exchange.fetch_trading_fee("BTC/JPY", Params::new()).await.unwrap();
    assert_eq!(fee.symbol, "BTC/JPY");
    assert_eq!(fee.maker.as_deref(), Some("0.001"));
    assert_eq!(fee.taker.as_deref(), Some("0.001"));
}

#[tokio::test]
async fn test_fetch_positions() {
    let transport = Arc::new(catalogs(MockTransport::new()).respond(
        "me/getpositions",
        json!([{
            "product_code": "FX_BTC_JPY",
            "side": "BUY",
            "price": 36000,
            "size": 10,
            "commission": 0,
            "swap_point_accumulate": -35,
            "require_collateral": 120000,
            "open_date": "2015-11-03T10:04:45.011",
            "leverage": 3,
            "pnl": 965,
            "sfd": -0.5
        }]),
    ));
    let exchange = bitflyer(transport.clone());
    assert!(exchange.has_feature("fetchPositions"));

    let err = exchange.fetch_positions(None, Params::new()).await.unwrap_err();
    assert_eq!(err.code(), "ARGUMENTS_REQUIRED");
    let err = exchange
        .fetch_positions(Some(&["BTC/JPY:JPY", "BTC/JPY"][..]), Params::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ARGUMENTS_REQUIRED");
    assert_eq!(transport.calls(), 0);

    let positions = exchange
        .fetch_positions(Some(&["BTC/JPY:JPY"][..]), Params::new())
        .await
        .unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0]["pnl"], json!(965));

    let request = transport
        .requests()
        .into_iter()
        .find(|r| r.url.contains("getpositions"))
        .unwrap();
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url, "https://api.bitflyer.com/v1/me/getpositions?product_code=FX_BTC_JPY");
}

#[tokio::test]
async fn test_insufficient_funds() {
    let transport = Arc::new(catalogs(MockTransport::new()).respond_raw(
        "me/sendchildorder",
        RawResponse::json(
            400,
            &json!({"status": -200, "error_message": "Insufficient fund", "data": null}),
        ),
    ));
    let exchange = bitflyer(transport);

    let err = exchange
        .create_order(OrderRequest::market("BTC/JPY", OrderSide::Sell, dec!(100)))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_FUNDS");
}
