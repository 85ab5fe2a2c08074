//! Centralized Exchange Implementations
//!
//! 거래소별 REST 커넥터

mod bitflyer;
mod coinone;
mod coinspot;

pub use bitflyer::{Bitflyer, BitflyerSigner};
pub use coinone::{Coinone, CoinoneSigner};
pub use coinspot::{Coinspot, CoinspotSigner};
