//! Deposit address type - 입금 주소

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 화폐별 입금 주소
///
/// `tag` carries the memo / destination tag some chains need next to the
/// address. `info` keeps what the venue sent for this currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositAddress {
    /// 화폐 코드
    pub currency: String,
    /// 체인 (venue가 알려주는 경우만)
    pub network: Option<String>,
    /// 주소
    pub address: String,
    /// 태그 / 메모
    pub tag: Option<String>,
    /// 원본 응답
    pub info: Value,
}

impl DepositAddress {
    pub fn new(currency: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            network: None,
            address: address.into(),
            tag: None,
            info: Value::Null,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_info(mut self, info: Value) -> Self {
        self.info = info;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deposit_address_serialization() {
        let address = DepositAddress::new("XRP", "rp2diYfVtpbgEMyaoWnuaWgFCAkqCAEg28")
            .with_tag("3091276090")
            .with_info(json!(["rp2diYfVtpbgEMyaoWnuaWgFCAkqCAEg28", "3091276090"]));
        let value = serde_json::to_value(&address).unwrap();
        assert_eq!(value["currency"], "XRP");
        assert_eq!(value["tag"], "3091276090");
        assert!(value["network"].is_null());
    }
}
