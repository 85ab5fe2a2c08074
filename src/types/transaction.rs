//! Transaction type - 입출금 내역

use serde::{Deserialize, Serialize};

use super::Fee;

/// 트랜잭션 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

/// 트랜잭션 상태
///
/// Unmapped venue statuses pass through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionStatus {
    Pending,
    Ok,
    Canceled,
    Failed,
    Other(String),
}

impl From<String> for TransactionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => TransactionStatus::Pending,
            "ok" => TransactionStatus::Ok,
            "canceled" => TransactionStatus::Canceled,
            "failed" => TransactionStatus::Failed,
            _ => TransactionStatus::Other(value),
        }
    }
}

impl From<TransactionStatus> for String {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Pending => "pending".into(),
            TransactionStatus::Ok => "ok".into(),
            TransactionStatus::Canceled => "canceled".into(),
            TransactionStatus::Failed => "failed".into(),
            TransactionStatus::Other(raw) => raw,
        }
    }
}

/// 입출금 트랜잭션
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// 트랜잭션 ID
    pub id: Option<String>,
    /// 트랜잭션 해시
    pub txid: Option<String>,
    /// 타임스탬프 (밀리초)
    pub timestamp: Option<i64>,
    /// ISO 8601 datetime
    pub datetime: Option<String>,
    /// 주소
    pub address: Option<String>,
    /// 태그 (memo, destination tag 등)
    pub tag: Option<String>,
    /// 트랜잭션 타입
    #[serde(rename = "type")]
    pub tx_type: Option<TransactionType>,
    /// 금액
    pub amount: Option<String>,
    /// 화폐 코드
    pub currency: Option<String>,
    /// 상태
    pub status: Option<TransactionStatus>,
    /// 수수료
    pub fee: Option<Fee>,
    /// 원본 응답
    pub info: serde_json::Value,
}
