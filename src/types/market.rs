//! Market type - 거래소 마켓 정보

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{CcxtError, CcxtResult};
use crate::utils::time;

/// 마켓 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    #[default]
    Spot,
    Margin,
    Swap,
    Future,
    Option,
}

/// 마켓 정보
///
/// Built once per session by the market-loading phase and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    /// 거래소 내부 ID (예: 'BTC_JPY', 'xec')
    pub id: String,
    /// 통합 심볼 (예: 'BTC/JPY', 'BTC/JPY:JPY-220211')
    pub symbol: String,
    /// 기준 화폐
    pub base: String,
    /// 견적 화폐
    pub quote: String,
    /// 정산 화폐 (파생상품용)
    pub settle: Option<String>,
    /// 거래소 기준 화폐 ID
    pub base_id: String,
    /// 거래소 견적 화폐 ID
    pub quote_id: String,
    /// 거래소 정산 화폐 ID
    pub settle_id: Option<String>,
    /// 마켓 타입
    #[serde(rename = "type")]
    pub market_type: MarketType,
    pub spot: bool,
    pub margin: bool,
    pub swap: bool,
    pub future: bool,
    pub option: bool,
    /// 활성 상태
    pub active: Option<bool>,
    /// 계약 여부
    pub contract: bool,
    /// 선형 계약 여부
    pub linear: Option<bool>,
    /// 역방향 계약 여부
    pub inverse: Option<bool>,
    /// 테이커 수수료
    pub taker: Option<String>,
    /// 메이커 수수료
    pub maker: Option<String>,
    /// 계약 크기
    pub contract_size: Option<String>,
    /// 만기일 (timestamp ms)
    pub expiry: Option<i64>,
    /// 만기일 (ISO 8601)
    pub expiry_datetime: Option<String>,
    /// 정밀도
    pub precision: MarketPrecision,
    /// 거래 제한
    pub limits: MarketLimits,
    /// 원본 응답
    pub info: serde_json::Value,
}

/// 마켓 정밀도 (소수점 자릿수)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketPrecision {
    pub amount: Option<i32>,
    pub price: Option<i32>,
    pub cost: Option<i32>,
}

/// 마켓 제한
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketLimits {
    pub amount: MinMax,
    pub price: MinMax,
    pub cost: MinMax,
    pub leverage: MinMax,
}

/// 최소/최대 범위
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: Option<String>,
    pub max: Option<String>,
}

impl Market {
    /// 현물 마켓 생성
    pub fn spot(id: &str, base: &str, quote: &str, base_id: &str, quote_id: &str) -> Self {
        Self {
            id: id.to_string(),
            symbol: Self::symbol_for(base, quote, None, None),
            base: base.to_string(),
            quote: quote.to_string(),
            settle: None,
            base_id: base_id.to_string(),
            quote_id: quote_id.to_string(),
            settle_id: None,
            market_type: MarketType::Spot,
            spot: true,
            margin: false,
            swap: false,
            future: false,
            option: false,
            active: Some(true),
            contract: false,
            linear: None,
            inverse: None,
            taker: None,
            maker: None,
            contract_size: None,
            expiry: None,
            expiry_datetime: None,
            precision: MarketPrecision::default(),
            limits: MarketLimits::default(),
            info: serde_json::Value::Null,
        }
    }

    /// `BASE/QUOTE[:SETTLE[-YYMMDD]]`
    pub fn symbol_for(base: &str, quote: &str, settle: Option<&str>, expiry: Option<i64>) -> String {
        let mut symbol = format!("{base}/{quote}");
        if let Some(settle) = settle {
            symbol.push(':');
            symbol.push_str(settle);
            if let Some(suffix) = expiry.and_then(time::yymmdd) {
                symbol.push('-');
                symbol.push_str(&suffix);
            }
        }
        symbol
    }

    pub fn with_fees(mut self, taker: Option<&str>, maker: Option<&str>) -> Self {
        self.taker = taker.map(str::to_string);
        self.maker = maker.map(str::to_string);
        self
    }

    pub fn with_info(mut self, info: serde_json::Value) -> Self {
        self.info = info;
        self
    }
}

/// Session-scoped market index, by symbol and by venue id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketTable {
    by_symbol: HashMap<String, Market>,
    symbols_by_id: HashMap<String, String>,
    ordered: Vec<String>,
}

impl MarketTable {
    /// Index a market list; later duplicates of a symbol are ignored
    pub fn new(markets: Vec<Market>) -> Self {
        let mut table = MarketTable::default();
        for market in markets {
            if table.by_symbol.contains_key(&market.symbol) {
                tracing::debug!(symbol = %market.symbol, id = %market.id, "duplicate market symbol dropped");
                continue;
            }
            table
                .symbols_by_id
                .entry(market.id.clone())
                .or_insert_with(|| market.symbol.clone());
            table.ordered.push(market.symbol.clone());
            table.by_symbol.insert(market.symbol.clone(), market);
        }
        table
    }

    pub fn get(&self, symbol: &str) -> Option<&Market> {
        self.by_symbol.get(symbol)
    }

    /// Market for `symbol`, or `BadSymbol`
    pub fn market(&self, symbol: &str) -> CcxtResult<&Market> {
        self.get(symbol).ok_or_else(|| CcxtError::BadSymbol {
            symbol: symbol.to_string(),
        })
    }

    pub fn by_id(&self, id: &str) -> Option<&Market> {
        self.symbols_by_id
            .get(id)
            .and_then(|symbol| self.by_symbol.get(symbol))
    }

    /// Symbols in load order
    pub fn symbols(&self) -> &[String] {
        &self.ordered
    }

    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.ordered.iter().filter_map(|s| self.by_symbol.get(s))
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
