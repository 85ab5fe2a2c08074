//! Order type - 주문 정보

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Fee, Params, Trade};

/// 주문 상태
///
/// Raw venue statuses that no mapping table knows pass through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Open,
    Closed,
    Canceled,
    Expired,
    Rejected,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Closed => "closed",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Expired => "expired",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "open" => OrderStatus::Open,
            "closed" => OrderStatus::Closed,
            "canceled" => OrderStatus::Canceled,
            "expired" => OrderStatus::Expired,
            "rejected" => OrderStatus::Rejected,
            _ => OrderStatus::Other(value),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 주문 측면
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }

    /// Canonical `buy`/`sell` only; anything else is undeterminable
    pub fn from_canonical(side: &str) -> Option<Self> {
        match side {
            "buy" => Some(OrderSide::Buy),
            "sell" => Some(OrderSide::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 주문 타입
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderType {
    Limit,
    Market,
    Other(String),
}

impl OrderType {
    pub fn as_str(&self) -> &str {
        match self {
            OrderType::Limit => "limit",
            OrderType::Market => "market",
            OrderType::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "limit" => OrderType::Limit,
            "market" => OrderType::Market,
            _ => OrderType::Other(value),
        }
    }
}

impl From<OrderType> for String {
    fn from(value: OrderType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 주문 유효 기간
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    GTC, // Good Till Canceled
    IOC, // Immediate Or Cancel
    FOK, // Fill Or Kill
}

impl TimeInForce {
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.to_uppercase().as_str() {
            "GTC" => Some(TimeInForce::GTC),
            "IOC" => Some(TimeInForce::IOC),
            "FOK" => Some(TimeInForce::FOK),
            _ => None,
        }
    }
}

/// 주문 정보
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// 주문 ID
    pub id: Option<String>,
    /// 클라이언트 주문 ID
    pub client_order_id: Option<String>,
    /// 타임스탬프 (밀리초)
    pub timestamp: Option<i64>,
    /// ISO 8601 datetime
    pub datetime: Option<String>,
    /// 마지막 체결 시간
    pub last_trade_timestamp: Option<i64>,
    /// 주문 상태
    pub status: Option<OrderStatus>,
    /// 심볼
    pub symbol: Option<String>,
    /// 주문 타입
    #[serde(rename = "type")]
    pub order_type: Option<OrderType>,
    /// 유효 기간
    pub time_in_force: Option<TimeInForce>,
    /// 주문 측면
    pub side: Option<OrderSide>,
    /// 주문 가격
    pub price: Option<String>,
    /// 평균 체결가
    pub average: Option<String>,
    /// 주문 수량
    pub amount: Option<String>,
    /// 체결 수량
    pub filled: Option<String>,
    /// 미체결 수량
    pub remaining: Option<String>,
    /// 체결 금액
    pub cost: Option<String>,
    /// 체결 내역
    pub trades: Vec<Trade>,
    /// 수수료
    pub fee: Option<Fee>,
    /// 원본 응답
    pub info: serde_json::Value,
}

impl Order {
    pub fn is_open(&self) -> bool {
        self.status == Some(OrderStatus::Open)
    }

    pub fn is_canceled(&self) -> bool {
        self.status == Some(OrderStatus::Canceled)
    }
}

/// 주문 요청
///
/// Caller-side value object: amounts are exact decimals, rendered to venue
/// strings by the connector.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// 심볼
    pub symbol: String,
    /// 주문 타입
    pub order_type: OrderType,
    /// 주문 측면
    pub side: OrderSide,
    /// 수량
    pub amount: Decimal,
    /// 가격 (지정가 주문)
    pub price: Option<Decimal>,
    /// 거래소별 추가 파라미터
    pub params: Params,
}

impl OrderRequest {
    pub fn new(symbol: &str, order_type: OrderType, side: OrderSide, amount: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            order_type,
            side,
            amount,
            price: None,
            params: Params::new(),
        }
    }

    /// 지정가 주문
    pub fn limit(symbol: &str, side: OrderSide, amount: Decimal, price: Decimal) -> Self {
        Self::new(symbol, OrderType::Limit, side, amount).with_price(price)
    }

    /// 시장가 주문
    pub fn market(symbol: &str, side: OrderSide, amount: Decimal) -> Self {
        Self::new(symbol, OrderType::Market, side, amount)
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Amount as a plain decimal string
    pub fn amount_string(&self) -> String {
        self.amount.normalize().to_string()
    }

    pub fn price_string(&self) -> Option<String> {
        self.price.map(|p| p.normalize().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_pass_through() {
        assert_eq!(OrderStatus::from("open".to_string()), OrderStatus::Open);
        let other = OrderStatus::from("partially_canceled".to_string());
        assert_eq!(other, OrderStatus::Other("partially_canceled".into()));
        assert_eq!(serde_json::to_value(&other).unwrap(), "partially_canceled");
        assert_eq!(serde_json::to_value(OrderStatus::Canceled).unwrap(), "canceled");
    }

    #[test]
    fn test_order_type_round_trip() {
        let parsed: OrderType = serde_json::from_str("\"stop\"").unwrap();
        assert_eq!(parsed, OrderType::Other("stop".into()));
        assert_eq!(OrderType::Limit.to_string(), "limit");
    }

    #[test]
    fn test_order_request_strings() {
        let request = OrderRequest::limit("BTC/KRW", OrderSide::Buy, dec!(0.50), dec!(50000000.0));
        assert_eq!(request.amount_string(), "0.5");
        assert_eq!(request.price_string().as_deref(), Some("50000000"));
        assert!(OrderRequest::market("BTC/KRW", OrderSide::Sell, dec!(1))
            .price
            .is_none());
    }

    #[test]
    fn test_order_serializes_nulls() {
        let json = serde_json::to_value(Order::default()).unwrap();
        assert!(json["status"].is_null());
        assert!(json["remaining"].is_null());
        assert_eq!(json["trades"], serde_json::json!([]));
    }
}
