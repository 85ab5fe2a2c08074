//! Balance type - 잔고 정보

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 잔고 정보
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    /// 타임스탬프 (밀리초)
    pub timestamp: Option<i64>,
    /// ISO 8601 datetime
    pub datetime: Option<String>,
    /// 화폐별 잔고
    #[serde(flatten)]
    pub currencies: BTreeMap<String, Balance>,
    /// 원본 응답
    pub info: serde_json::Value,
}

/// 단일 화폐 잔고
///
/// Only what the venue reports is filled in; a venue that reports `total`
/// alone leaves `free` and `used` null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// 사용 가능 잔고
    pub free: Option<String>,
    /// 사용 중 잔고 (주문 등)
    pub used: Option<String>,
    /// 총 잔고
    pub total: Option<String>,
}

impl Balances {
    /// 잔고 추가
    pub fn add(&mut self, currency: impl Into<String>, balance: Balance) {
        self.currencies.insert(currency.into(), balance);
    }

    /// 특정 화폐 잔고 조회
    pub fn get(&self, currency: &str) -> Option<&Balance> {
        self.currencies.get(currency)
    }

    pub fn free(&self, currency: &str) -> Option<&str> {
        self.get(currency).and_then(|b| b.free.as_deref())
    }

    pub fn total(&self, currency: &str) -> Option<&str> {
        self.get(currency).and_then(|b| b.total.as_deref())
    }
}

impl Balance {
    pub fn new(free: Option<String>, used: Option<String>, total: Option<String>) -> Self {
        Self { free, used, total }
    }

    /// 총 잔고만 알려진 경우
    pub fn from_total(total: Option<String>) -> Self {
        Self {
            free: None,
            used: None,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balances_accessors() {
        let mut balances = Balances::default();
        balances.add("KRW", Balance::new(Some("1000".into()), None, Some("1500".into())));
        balances.add("LTC", Balance::from_total(Some("0.1".into())));

        assert_eq!(balances.free("KRW"), Some("1000"));
        assert_eq!(balances.total("LTC"), Some("0.1"));
        assert_eq!(balances.free("LTC"), None);
        assert!(balances.get("BTC").is_none());
    }

    #[test]
    fn test_balances_flatten() {
        let mut balances = Balances::default();
        balances.add("LTC", Balance::from_total(Some("0.1".into())));
        let json = serde_json::to_value(&balances).unwrap();
        assert_eq!(json["LTC"]["total"], "0.1");
        assert!(json["LTC"]["free"].is_null());
    }
}
