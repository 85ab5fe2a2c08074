//! Transport boundary
//!
//! The crate never opens a socket. Callers supply a `Transport` that executes
//! a `SignedRequest` and hands back the raw response.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::CcxtResult;
use crate::types::SignedRequest;

/// Raw HTTP response as delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Response whose body is the serialized `value`
    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body parsed as JSON, `None` when it is not JSON
    pub fn parsed_body(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }
}

/// Executes signed requests; timeouts, retries and pacing live here
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: SignedRequest) -> CcxtResult<RawResponse>;
}
