//! venue-connect: per-exchange REST connectors
//!
//! 거래소별 응답을 공통 모델(티커, 호가, 체결, 주문, 잔고)로 정규화하는 라이브러리.
//! The crate never performs I/O: callers hand each connector a `Transport`
//! that executes the signed requests it builds.

pub mod client;
pub mod errors;
pub mod exchanges;
pub mod types;
pub mod utils;

// Re-exports
pub use client::{
    Api, ApiRequest, Credentials, ExchangeConfig, NonceGenerator, RawResponse, Session, Signer,
    Transport,
};
pub use errors::{CcxtError, CcxtResult, ErrorKind, ExceptionTable};
pub use types::*;
pub use utils::Precise;

#[cfg(feature = "cex")]
pub use exchanges::{Bitflyer, Coinone, Coinspot};
