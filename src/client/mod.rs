//! Session, signing and transport plumbing

mod config;
mod nonce;
mod session;
mod signer;
mod transport;

pub use config::{Credentials, ExchangeConfig};
pub use nonce::NonceGenerator;
pub use session::Session;
pub use signer::{join_url, Api, ApiRequest, Signer};
pub use transport::{RawResponse, Transport};
