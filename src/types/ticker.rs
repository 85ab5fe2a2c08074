//! Ticker type - 시세 정보

use serde::{Deserialize, Serialize};

/// 시세 정보
///
/// Every numeric field is an exact decimal string or `null`. A field the
/// venue does not report is never zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    /// 심볼
    pub symbol: Option<String>,
    /// 타임스탬프 (밀리초)
    pub timestamp: Option<i64>,
    /// ISO 8601 datetime
    pub datetime: Option<String>,
    /// 고가
    pub high: Option<String>,
    /// 저가
    pub low: Option<String>,
    /// 최고 매수호가
    pub bid: Option<String>,
    /// 매수호가 수량
    pub bid_volume: Option<String>,
    /// 최저 매도호가
    pub ask: Option<String>,
    /// 매도호가 수량
    pub ask_volume: Option<String>,
    /// 거래량 가중 평균가
    pub vwap: Option<String>,
    /// 시가
    pub open: Option<String>,
    /// 종가 (= last)
    pub close: Option<String>,
    /// 최종 거래가
    pub last: Option<String>,
    /// 전일 종가
    pub previous_close: Option<String>,
    /// 가격 변동
    pub change: Option<String>,
    /// 가격 변동률 (%)
    pub percentage: Option<String>,
    /// 평균가
    pub average: Option<String>,
    /// 기준화폐 거래량
    pub base_volume: Option<String>,
    /// 견적화폐 거래량
    pub quote_volume: Option<String>,
    /// 원본 응답
    pub info: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_serializes_every_field() {
        let ticker = Ticker {
            symbol: Some("BTC/KRW".into()),
            last: Some("50000000".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&ticker).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 20);
        assert!(obj["bid"].is_null());
        assert!(obj["baseVolume"].is_null());
        assert_eq!(obj["last"], "50000000");
    }
}
