//! Exchange configuration

use serde_json::{Map, Value};
use std::fmt;

use crate::errors::{CcxtError, CcxtResult};

/// API 인증 정보
///
/// `Debug` never prints the values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    api_key: Option<String>,
    secret: Option<String>,
    password: Option<String>,
    uid: Option<String>,
}

impl Credentials {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// 인증 정보 유효성 확인
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.secret.is_some()
    }

    /// API key, or `AuthenticationError` naming the missing field
    pub fn require_api_key(&self) -> CcxtResult<&str> {
        self.api_key().ok_or_else(|| missing("apiKey"))
    }

    /// API key and secret, or `AuthenticationError` naming the missing field
    pub fn check_required_credentials(&self) -> CcxtResult<(&str, &str)> {
        let key = self.require_api_key()?;
        let secret = self.secret().ok_or_else(|| missing("secret"))?;
        Ok((key, secret))
    }
}

fn missing(field: &str) -> CcxtError {
    CcxtError::AuthenticationError {
        message: format!("requires \"{field}\" credential"),
    }
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "<redacted>"
    } else {
        "None"
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &redact(&self.api_key))
            .field("secret", &redact(&self.secret))
            .field("password", &redact(&self.password))
            .field("uid", &redact(&self.uid))
            .finish()
    }
}

/// 거래소 설정
#[derive(Debug, Clone, Default)]
pub struct ExchangeConfig {
    credentials: Credentials,
    hostname: Option<String>,
    options: Map<String, Value>,
}

impl ExchangeConfig {
    /// 새로운 빈 설정 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// API 키 설정
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.credentials.api_key = Some(key.into());
        self
    }

    /// API 시크릿 설정
    pub fn with_api_secret(mut self, secret: impl Into<String>) -> Self {
        self.credentials.secret = Some(secret.into());
        self
    }

    /// 비밀번호 설정 (일부 거래소 필요)
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.credentials.password = Some(password.into());
        self
    }

    /// UID 설정 (일부 거래소 필요)
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.credentials.uid = Some(uid.into());
        self
    }

    /// 인증 정보로 설정
    pub fn with_credentials(
        mut self,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        self.credentials.api_key = Some(api_key.into());
        self.credentials.secret = Some(api_secret.into());
        self
    }

    /// 호스트네임 설정 (`{hostname}` URL 템플릿에 사용)
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// 거래소별 옵션 설정
    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    // === Getters ===

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.option(key).and_then(Value::as_str)
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.has_credentials()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ExchangeConfig::new()
            .with_api_key("test_key")
            .with_api_secret("test_secret")
            .with_hostname("bitflyer.jp")
            .with_option("fetchBalance", "private_post_ro_my_balances");

        assert_eq!(config.credentials().api_key(), Some("test_key"));
        assert_eq!(config.credentials().secret(), Some("test_secret"));
        assert_eq!(config.hostname(), Some("bitflyer.jp"));
        assert_eq!(
            config.option_str("fetchBalance"),
            Some("private_post_ro_my_balances")
        );
        assert!(config.has_credentials());
    }

    #[test]
    fn test_config_default() {
        let config = ExchangeConfig::default();
        assert!(config.credentials().api_key().is_none());
        assert!(!config.has_credentials());
        assert!(config.option("missing").is_none());
    }

    #[test]
    fn test_missing_credentials() {
        let config = ExchangeConfig::new().with_api_key("only_key");
        let err = config.credentials().check_required_credentials().unwrap_err();
        assert!(err.is_auth_error());
        assert!(err.to_string().contains("secret"));
        assert!(!err.to_string().contains("only_key"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ExchangeConfig::new().with_credentials("my-key", "my-secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("my-key"));
        assert!(!printed.contains("my-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
