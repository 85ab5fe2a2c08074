//! Canonical data model shared by every connector

mod account;
mod balance;
mod exchange;
mod fee;
mod market;
mod order;
mod orderbook;
mod params;
mod ticker;
mod trade;
mod transaction;

pub use account::DepositAddress;
pub use balance::{Balance, Balances};
pub use exchange::{
    find_route, Action, EndpointRoute, Exchange, ExchangeFeatures, ExchangeId, ExchangeUrls,
    HttpMethod, SignedRequest, VenueDescriptor,
};
pub use fee::{Fee, TradingFee};
pub use market::{Market, MarketLimits, MarketPrecision, MarketTable, MarketType, MinMax};
pub use order::{Order, OrderRequest, OrderSide, OrderStatus, OrderType, TimeInForce};
pub use orderbook::{OrderBook, OrderBookEntry};
pub use params::Params;
pub use ticker::Ticker;
pub use trade::{TakerOrMaker, Trade};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
