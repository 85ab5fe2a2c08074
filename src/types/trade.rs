//! Trade type - 체결 정보

use serde::{Deserialize, Serialize};

use super::{Fee, OrderSide};

/// 체결 정보
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// 체결 ID (거래소가 제공하지 않으면 null)
    pub id: Option<String>,
    /// 주문 ID
    pub order: Option<String>,
    /// 타임스탬프 (밀리초)
    pub timestamp: Option<i64>,
    /// ISO 8601 datetime
    pub datetime: Option<String>,
    /// 심볼
    pub symbol: Option<String>,
    /// 주문 타입 (limit/market)
    #[serde(rename = "type")]
    pub trade_type: Option<String>,
    /// buy / sell, 판별 불가 시 null
    pub side: Option<OrderSide>,
    /// Taker 또는 Maker
    pub taker_or_maker: Option<TakerOrMaker>,
    /// 체결 가격
    pub price: Option<String>,
    /// 체결 수량
    pub amount: Option<String>,
    /// 체결 금액 (price * amount)
    pub cost: Option<String>,
    /// 수수료
    pub fee: Option<Fee>,
    /// 원본 응답
    pub info: serde_json::Value,
}

/// Taker/Maker 구분
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TakerOrMaker {
    Taker,
    Maker,
}

impl Trade {
    pub fn is_buy(&self) -> bool {
        self.side == Some(OrderSide::Buy)
    }

    pub fn is_sell(&self) -> bool {
        self.side == Some(OrderSide::Sell)
    }
}
