//! Fee type - 수수료 정보

use serde::{Deserialize, Serialize};

/// 수수료 정보
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    /// 수수료 금액 (항상 0 이상)
    pub cost: Option<String>,
    /// 수수료 화폐
    pub currency: Option<String>,
    /// 수수료율
    pub rate: Option<String>,
}

impl Fee {
    pub fn new(cost: Option<String>, currency: Option<String>) -> Self {
        Self {
            cost,
            currency,
            rate: None,
        }
    }

    pub fn with_rate(mut self, rate: Option<String>) -> Self {
        self.rate = rate;
        self
    }
}

/// 심볼별 거래 수수료
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingFee {
    /// 심볼
    pub symbol: String,
    /// 메이커 수수료율
    pub maker: Option<String>,
    /// 테이커 수수료율
    pub taker: Option<String>,
    /// 원본 응답
    pub info: serde_json::Value,
}
