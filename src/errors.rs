//! Error taxonomy shared by every connector
//!
//! Venue failures are classified into the same set of kinds regardless of
//! which exchange produced them. The hierarchy mirrors the unified API:
//! - ExchangeError (venue reported a failure)
//!   - AuthenticationError (missing or rejected credentials)
//!   - ArgumentsRequired
//!   - BadRequest
//!     - BadSymbol
//!   - InsufficientFunds
//!   - InvalidAddress
//!   - InvalidOrder
//!     - OrderNotFound
//!   - NotSupported
//! - NetworkError
//!   - RateLimitExceeded
//!   - ExchangeNotAvailable
//!     - OnMaintenance
//!   - InvalidNonce
//!   - RequestTimeout
//! - BadResponse
//! - NumericError

use thiserror::Error;

/// Unified error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CcxtError {
    // === ExchangeError family ===
    /// Unclassified venue failure
    #[error("Exchange error: {message}")]
    ExchangeError { message: String },

    /// Credentials missing or rejected
    #[error("Authentication error: {message}")]
    AuthenticationError { message: String },

    /// Caller omitted a mandatory argument; raised before any network call
    #[error("Arguments required: {message}")]
    ArgumentsRequired { message: String },

    /// Malformed request parameters
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Unknown or malformed instrument
    #[error("Bad symbol: {symbol}")]
    BadSymbol { symbol: String },

    /// Not enough balance
    #[error("Insufficient funds: {message}")]
    InsufficientFunds { message: String },

    /// Invalid deposit/withdrawal address
    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    /// Order rejected by validation
    #[error("Invalid order: {message}")]
    InvalidOrder { message: String },

    /// Order not found on exchange
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: String },

    /// Operation not offered by this venue
    #[error("Not supported: {feature}")]
    NotSupported { feature: String },

    // === NetworkError family ===
    /// Transport level failure
    #[error("Network error: {url} - {message}")]
    NetworkError { url: String, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        message: String,
        /// Suggested retry delay in milliseconds, if the venue sent one
        retry_after_ms: Option<u64>,
    },

    /// Venue temporarily unavailable
    #[error("Exchange not available: {message}")]
    ExchangeNotAvailable { message: String },

    /// Venue under maintenance; retry later
    #[error("On maintenance: {message}")]
    OnMaintenance { message: String },

    /// Nonce rejected by the venue
    #[error("Invalid nonce: {message}")]
    InvalidNonce { message: String },

    /// Request timed out
    #[error("Request timeout: {url}")]
    RequestTimeout { url: String },

    // === Response / data errors ===
    /// Response could not be interpreted
    #[error("Bad response: {message}")]
    BadResponse { message: String },

    /// JSON encoding or decoding failed
    #[error("JSON error: {message}")]
    JsonError { message: String },

    /// Malformed numeric string or division by zero
    #[error("Numeric error: {message}")]
    NumericError { message: String },
}

impl CcxtError {
    /// Returns the error code as a string constant
    pub fn code(&self) -> &'static str {
        match self {
            CcxtError::ExchangeError { .. } => "EXCHANGE_ERROR",
            CcxtError::AuthenticationError { .. } => "AUTHENTICATION_ERROR",
            CcxtError::ArgumentsRequired { .. } => "ARGUMENTS_REQUIRED",
            CcxtError::BadRequest { .. } => "BAD_REQUEST",
            CcxtError::BadSymbol { .. } => "BAD_SYMBOL",
            CcxtError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            CcxtError::InvalidAddress { .. } => "INVALID_ADDRESS",
            CcxtError::InvalidOrder { .. } => "INVALID_ORDER",
            CcxtError::OrderNotFound { .. } => "ORDER_NOT_FOUND",
            CcxtError::NotSupported { .. } => "NOT_SUPPORTED",
            CcxtError::NetworkError { .. } => "NETWORK_ERROR",
            CcxtError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            CcxtError::ExchangeNotAvailable { .. } => "EXCHANGE_NOT_AVAILABLE",
            CcxtError::OnMaintenance { .. } => "ON_MAINTENANCE",
            CcxtError::InvalidNonce { .. } => "INVALID_NONCE",
            CcxtError::RequestTimeout { .. } => "REQUEST_TIMEOUT",
            CcxtError::BadResponse { .. } => "BAD_RESPONSE",
            CcxtError::JsonError { .. } => "JSON_ERROR",
            CcxtError::NumericError { .. } => "NUMERIC_ERROR",
        }
    }

    /// Returns true if the condition is temporary and the call may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CcxtError::NetworkError { .. }
                | CcxtError::RequestTimeout { .. }
                | CcxtError::RateLimitExceeded { .. }
                | CcxtError::ExchangeNotAvailable { .. }
                | CcxtError::OnMaintenance { .. }
                | CcxtError::InvalidNonce { .. }
        )
    }

    /// Returns true if this is an authentication-related error
    pub fn is_auth_error(&self) -> bool {
        matches!(self, CcxtError::AuthenticationError { .. })
    }

    /// Returns true if this is an order-related error
    pub fn is_order_error(&self) -> bool {
        matches!(
            self,
            CcxtError::InvalidOrder { .. } | CcxtError::OrderNotFound { .. }
        )
    }

    /// Returns true if this is a network-related error
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            CcxtError::NetworkError { .. }
                | CcxtError::RateLimitExceeded { .. }
                | CcxtError::ExchangeNotAvailable { .. }
                | CcxtError::OnMaintenance { .. }
                | CcxtError::InvalidNonce { .. }
                | CcxtError::RequestTimeout { .. }
        )
    }

    /// Returns true for failures raised before any request left the process
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            CcxtError::ArgumentsRequired { .. }
                | CcxtError::NotSupported { .. }
                | CcxtError::NumericError { .. }
        )
    }

    /// Suggested retry delay in milliseconds for retryable errors
    pub fn suggested_retry_after(&self) -> Option<u64> {
        match self {
            CcxtError::RateLimitExceeded { retry_after_ms, .. } => retry_after_ms.or(Some(1000)),
            CcxtError::RequestTimeout { .. } => Some(5000),
            CcxtError::ExchangeNotAvailable { .. } => Some(30000),
            CcxtError::OnMaintenance { .. } => Some(60000),
            CcxtError::NetworkError { .. } => Some(1000),
            CcxtError::InvalidNonce { .. } => Some(100),
            _ => None,
        }
    }

    pub(crate) fn numeric(message: impl Into<String>) -> Self {
        CcxtError::NumericError {
            message: message.into(),
        }
    }

    pub(crate) fn arguments_required(message: impl Into<String>) -> Self {
        CcxtError::ArgumentsRequired {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CcxtError {
    fn from(err: serde_json::Error) -> Self {
        CcxtError::JsonError {
            message: err.to_string(),
        }
    }
}

/// Result type alias
pub type CcxtResult<T> = Result<T, CcxtError>;

/// Error kinds a venue error code can be classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ExchangeError,
    AuthenticationError,
    BadRequest,
    BadSymbol,
    InsufficientFunds,
    InvalidOrder,
    OrderNotFound,
    RateLimitExceeded,
    ExchangeNotAvailable,
    OnMaintenance,
    InvalidNonce,
}

impl ErrorKind {
    /// Build the error carrying the venue's original message
    pub fn into_error(self, message: impl Into<String>) -> CcxtError {
        let message = message.into();
        match self {
            ErrorKind::ExchangeError => CcxtError::ExchangeError { message },
            ErrorKind::AuthenticationError => CcxtError::AuthenticationError { message },
            ErrorKind::BadRequest => CcxtError::BadRequest { message },
            ErrorKind::BadSymbol => CcxtError::BadSymbol { symbol: message },
            ErrorKind::InsufficientFunds => CcxtError::InsufficientFunds { message },
            ErrorKind::InvalidOrder => CcxtError::InvalidOrder { message },
            ErrorKind::OrderNotFound => CcxtError::OrderNotFound { order_id: message },
            ErrorKind::RateLimitExceeded => CcxtError::RateLimitExceeded {
                message,
                retry_after_ms: None,
            },
            ErrorKind::ExchangeNotAvailable => CcxtError::ExchangeNotAvailable { message },
            ErrorKind::OnMaintenance => CcxtError::OnMaintenance { message },
            ErrorKind::InvalidNonce => CcxtError::InvalidNonce { message },
        }
    }
}

/// HTTP statuses every venue shares
const HTTP_EXCEPTIONS: &[(u16, ErrorKind)] = &[
    (401, ErrorKind::AuthenticationError),
    (403, ErrorKind::AuthenticationError),
    (429, ErrorKind::RateLimitExceeded),
    (503, ErrorKind::ExchangeNotAvailable),
];

/// Venue error-code table
///
/// Codes are matched exactly; anything not listed degrades to the generic
/// `ExchangeError` while keeping the original message.
#[derive(Debug, Clone, Copy)]
pub struct ExceptionTable {
    pub exact: &'static [(&'static str, ErrorKind)],
}

impl ExceptionTable {
    pub const fn new(exact: &'static [(&'static str, ErrorKind)]) -> Self {
        Self { exact }
    }

    /// Kind for an exactly matching code
    pub fn kind_for(&self, code: &str) -> Option<ErrorKind> {
        self.exact
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
    }

    /// Classified error for a venue code, falling back to `ExchangeError`
    pub fn throw_exactly_matched(&self, code: Option<&str>, message: impl Into<String>) -> CcxtError {
        let kind = code
            .and_then(|c| self.kind_for(c))
            .unwrap_or(ErrorKind::ExchangeError);
        kind.into_error(message)
    }

    /// Classification by HTTP status alone, for non-2xx responses
    pub fn classify_http(status: u16, message: impl Into<String>) -> Option<CcxtError> {
        if status < 400 {
            return None;
        }
        let kind = HTTP_EXCEPTIONS
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorKind::ExchangeError);
        Some(kind.into_error(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: ExceptionTable = ExceptionTable::new(&[
        ("405", ErrorKind::OnMaintenance),
        ("104", ErrorKind::OrderNotFound),
    ]);

    #[test]
    fn test_error_codes() {
        let err = CcxtError::AuthenticationError {
            message: "Invalid API key".into(),
        };
        assert_eq!(err.code(), "AUTHENTICATION_ERROR");

        let err = CcxtError::NumericError {
            message: "abc".into(),
        };
        assert_eq!(err.code(), "NUMERIC_ERROR");
    }

    #[test]
    fn test_retryable_errors() {
        let maintenance_err = CcxtError::OnMaintenance {
            message: "System upgrade".into(),
        };
        assert!(maintenance_err.is_retryable());
        assert_eq!(maintenance_err.suggested_retry_after(), Some(60000));

        let auth_err = CcxtError::AuthenticationError {
            message: "Invalid key".into(),
        };
        assert!(!auth_err.is_retryable());
        assert!(auth_err.is_auth_error());
    }

    #[test]
    fn test_exact_match() {
        let err = TABLE.throw_exactly_matched(Some("405"), "coinone maintenance");
        assert_eq!(err.code(), "ON_MAINTENANCE");
        assert!(err.to_string().contains("coinone maintenance"));
    }

    #[test]
    fn test_unmapped_code_falls_back_to_exchange_error() {
        let err = TABLE.throw_exactly_matched(Some("4050"), "unknown failure");
        assert_eq!(
            err,
            CcxtError::ExchangeError {
                message: "unknown failure".into()
            }
        );

        let err = TABLE.throw_exactly_matched(None, "no code");
        assert_eq!(err.code(), "EXCHANGE_ERROR");
    }

    #[test]
    fn test_classify_http() {
        assert!(ExceptionTable::classify_http(200, "ok").is_none());
        assert_eq!(
            ExceptionTable::classify_http(429, "slow down").map(|e| e.code()),
            Some("RATE_LIMIT_EXCEEDED")
        );
        assert_eq!(
            ExceptionTable::classify_http(401, "nope").map(|e| e.code()),
            Some("AUTHENTICATION_ERROR")
        );
        assert_eq!(
            ExceptionTable::classify_http(500, "boom").map(|e| e.code()),
            Some("EXCHANGE_ERROR")
        );
    }

    #[test]
    fn test_validation_errors() {
        assert!(CcxtError::arguments_required("symbol").is_validation_error());
        assert!(!CcxtError::ExchangeError {
            message: "x".into()
        }
        .is_validation_error());
    }
}
