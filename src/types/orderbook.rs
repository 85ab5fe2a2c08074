//! OrderBook type - 호가창

use serde::{Deserialize, Serialize};

use crate::utils::Precise;

/// 호가창
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    /// 심볼
    pub symbol: Option<String>,
    /// 타임스탬프 (밀리초)
    pub timestamp: Option<i64>,
    /// ISO 8601 datetime
    pub datetime: Option<String>,
    /// 매수호가 (가격순 내림차순)
    pub bids: Vec<OrderBookEntry>,
    /// 매도호가 (가격순 오름차순)
    pub asks: Vec<OrderBookEntry>,
    /// 호가 시퀀스 번호
    pub nonce: Option<i64>,
}

/// 호가 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookEntry {
    /// 가격
    pub price: String,
    /// 수량
    pub amount: String,
}

impl OrderBook {
    /// 최고 매수호가
    pub fn best_bid(&self) -> Option<&OrderBookEntry> {
        self.bids.first()
    }

    /// 최저 매도호가
    pub fn best_ask(&self) -> Option<&OrderBookEntry> {
        self.asks.first()
    }

    /// 스프레드 (매도-매수 가격 차이)
    pub fn spread(&self) -> Option<String> {
        let bid = Precise::parse(&self.best_bid()?.price).ok()?;
        let ask = Precise::parse(&self.best_ask()?.price).ok()?;
        Some(ask.sub(&bid).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(price: &str, amount: &str) -> OrderBookEntry {
        OrderBookEntry {
            price: price.into(),
            amount: amount.into(),
        }
    }

    #[test]
    fn test_spread() {
        let book = OrderBook {
            bids: vec![entry("100.1", "1"), entry("100", "2")],
            asks: vec![entry("100.3", "1")],
            ..Default::default()
        };
        assert_eq!(book.spread().as_deref(), Some("0.2"));
        assert!(OrderBook::default().spread().is_none());
    }
}
