//! Canonical builders
//!
//! Venue parsers extract raw fields into canonical records; the finishers here
//! complete them the same way for every venue: numeric fields are validated,
//! derivable fields are derived with exact decimal math, everything else stays
//! null. All functions are pure.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::trace;

use super::precise::Precise;
use super::safe::safe_string;
use super::time::iso8601;
use crate::errors::{CcxtError, CcxtResult};
use crate::types::{
    Balances, Fee, Market, MarketTable, Order, OrderBook, OrderBookEntry, OrderSide, OrderStatus,
    Ticker, Trade,
};

/// Codes every venue maps the same way
const SHARED_CURRENCY_ALIASES: &[(&str, &str)] = &[("XBT", "BTC"), ("BCC", "BCH"), ("BCHSV", "BSV")];

/// Upper-cased currency code with venue aliases applied first
pub fn safe_currency_code(currency_id: Option<&str>, aliases: &[(&str, &str)]) -> Option<String> {
    let code = currency_id?.trim().to_uppercase();
    if code.is_empty() {
        return None;
    }
    let alias = aliases
        .iter()
        .chain(SHARED_CURRENCY_ALIASES)
        .find(|(raw, _)| *raw == code)
        .map(|(_, common)| (*common).to_string());
    Some(alias.unwrap_or(code))
}

/// Deposit/withdrawal addresses must not contain whitespace
pub fn check_address(address: &str) -> CcxtResult<()> {
    if address.is_empty() || address.chars().any(char::is_whitespace) {
        return Err(CcxtError::InvalidAddress {
            address: address.to_string(),
        });
    }
    Ok(())
}

/// Explicit enumerated mapping; unmapped values pass through unchanged
pub fn map_raw(table: &[(&str, &str)], raw: &str) -> String {
    table
        .iter()
        .find(|(from, _)| *from == raw)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Side through a venue table; anything not ending up as buy/sell is `None`
pub fn parse_side(table: &[(&str, &str)], raw: Option<&str>) -> Option<OrderSide> {
    OrderSide::from_canonical(&map_raw(table, raw?))
}

/// Status through a venue table; unmapped statuses pass through as `Other`
pub fn parse_status(table: &[(&str, &str)], raw: Option<&str>) -> Option<OrderStatus> {
    raw.map(|r| OrderStatus::from(map_raw(table, r)))
}

/// Fee currency by trade side: quote when selling, base when buying
pub fn fee_currency(side: Option<OrderSide>, market: Option<&Market>) -> Option<String> {
    let market = market?;
    match side? {
        OrderSide::Sell => Some(market.quote.clone()),
        OrderSide::Buy => Some(market.base.clone()),
    }
}

/// Normalization context: known markets plus the market the caller asked for
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseContext<'a> {
    pub market: Option<&'a Market>,
    pub markets: Option<&'a MarketTable>,
    pub aliases: &'a [(&'a str, &'a str)],
}

impl<'a> ParseContext<'a> {
    pub fn new(markets: Option<&'a MarketTable>, aliases: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            market: None,
            markets,
            aliases,
        }
    }

    /// Same context with a requested-market hint
    pub fn with_market(mut self, market: Option<&'a Market>) -> Self {
        self.market = market;
        self
    }

    /// Resolve a venue market id
    ///
    /// Cached id first, then `BASE<delimiter>QUOTE` split into currency codes,
    /// then the hinted market.
    pub fn safe_market(&self, market_id: Option<&str>, delimiter: Option<&str>) -> Option<Market> {
        if let Some(id) = market_id {
            if let Some(market) = self.markets.and_then(|m| m.by_id(id)) {
                return Some(market.clone());
            }
            if let Some((base_id, quote_id)) = delimiter.and_then(|d| id.split_once(d)) {
                let base = safe_currency_code(Some(base_id), self.aliases);
                let quote = safe_currency_code(Some(quote_id), self.aliases);
                if let (Some(base), Some(quote)) = (base, quote) {
                    return Some(Market::spot(id, &base, &quote, base_id, quote_id));
                }
            }
        }
        self.market.cloned()
    }

    pub fn safe_symbol(&self, market_id: Option<&str>, delimiter: Option<&str>) -> Option<String> {
        self.safe_market(market_id, delimiter).map(|m| m.symbol)
    }
}

fn valid_number(field: &str, value: Option<String>) -> Option<String> {
    let value = value?;
    match Precise::parse(&value) {
        Ok(number) => Some(number.to_string()),
        Err(_) => {
            trace!(field, value = %value, "non-numeric field degraded to null");
            None
        }
    }
}

fn abs_number(field: &str, value: Option<String>) -> Option<String> {
    valid_number(field, value).and_then(|v| Precise::string_abs(&v).ok())
}

fn precise(value: &Option<String>) -> Option<Precise> {
    value.as_deref().and_then(|v| Precise::parse(v).ok())
}

fn sanitize_fee(fee: Option<Fee>) -> Option<Fee> {
    fee.map(|f| Fee {
        cost: abs_number("fee.cost", f.cost),
        currency: f.currency,
        rate: abs_number("fee.rate", f.rate),
    })
}

/// Finish a ticker: validate numerics, `close`↔`last`, derive change stats
pub fn safe_ticker(ticker: Ticker) -> Ticker {
    let mut t = Ticker {
        high: valid_number("high", ticker.high),
        low: valid_number("low", ticker.low),
        bid: valid_number("bid", ticker.bid),
        bid_volume: valid_number("bidVolume", ticker.bid_volume),
        ask: valid_number("ask", ticker.ask),
        ask_volume: valid_number("askVolume", ticker.ask_volume),
        vwap: valid_number("vwap", ticker.vwap),
        open: valid_number("open", ticker.open),
        close: valid_number("close", ticker.close),
        last: valid_number("last", ticker.last),
        previous_close: valid_number("previousClose", ticker.previous_close),
        change: valid_number("change", ticker.change),
        percentage: valid_number("percentage", ticker.percentage),
        average: valid_number("average", ticker.average),
        base_volume: valid_number("baseVolume", ticker.base_volume),
        quote_volume: valid_number("quoteVolume", ticker.quote_volume),
        ..ticker
    };

    if t.close.is_none() {
        t.close = t.last.clone();
    }
    if t.last.is_none() {
        t.last = t.close.clone();
    }
    if t.datetime.is_none() {
        t.datetime = t.timestamp.and_then(iso8601);
    }

    let open = precise(&t.open);
    let last = precise(&t.last);
    if let (Some(open), Some(last)) = (&open, &last) {
        let change = last.sub(open);
        if t.percentage.is_none() && !open.is_zero() {
            t.percentage = change
                .div(open, 18)
                .ok()
                .map(|ratio| ratio.mul(&Precise::from_i64(100)).to_string());
        }
        if t.change.is_none() {
            t.change = Some(change.to_string());
        }
        if t.average.is_none() {
            t.average = last
                .add(open)
                .div(&Precise::from_i64(2), 18)
                .ok()
                .map(|avg| avg.to_string());
        }
    }
    if t.vwap.is_none() {
        if let (Some(quote), Some(base)) = (precise(&t.quote_volume), precise(&t.base_volume)) {
            t.vwap = quote.div(&base, 18).ok().map(|v| v.to_string());
        }
    }
    t
}

/// Finish a trade: validate numerics, `cost = price × amount`, non-negative fee
pub fn safe_trade(trade: Trade) -> Trade {
    let mut t = Trade {
        price: valid_number("price", trade.price),
        amount: valid_number("amount", trade.amount),
        cost: valid_number("cost", trade.cost),
        fee: sanitize_fee(trade.fee),
        ..trade
    };
    if t.cost.is_none() {
        if let (Some(price), Some(amount)) = (precise(&t.price), precise(&t.amount)) {
            t.cost = Some(price.mul(&amount).to_string());
        }
    }
    if t.datetime.is_none() {
        t.datetime = t.timestamp.and_then(iso8601);
    }
    t
}

/// Finish an order: derive `filled`/`remaining`/`amount`, then `cost`/`average`
///
/// A `remaining` greater than `amount` cannot be right and is degraded to null.
pub fn safe_order(order: Order) -> Order {
    let mut o = Order {
        price: valid_number("price", order.price),
        average: valid_number("average", order.average),
        amount: valid_number("amount", order.amount),
        filled: valid_number("filled", order.filled),
        remaining: valid_number("remaining", order.remaining),
        cost: valid_number("cost", order.cost),
        fee: sanitize_fee(order.fee),
        trades: order.trades.into_iter().map(safe_trade).collect(),
        ..order
    };

    let amount = precise(&o.amount);
    let filled = precise(&o.filled);
    let remaining = precise(&o.remaining);
    match (&amount, &filled, &remaining) {
        (Some(amount), None, Some(remaining)) if remaining.le(amount) => {
            o.filled = Some(amount.sub(remaining).to_string());
        }
        (Some(amount), Some(filled), None) => {
            let left = amount.sub(filled);
            o.remaining = Some(if left.is_negative() { "0".to_string() } else { left.to_string() });
        }
        (None, Some(filled), Some(remaining)) => {
            o.amount = Some(filled.add(remaining).to_string());
        }
        _ => {}
    }

    if let (Some(amount), Some(remaining)) = (precise(&o.amount), precise(&o.remaining)) {
        if remaining.gt(&amount) {
            trace!(
                amount = %amount,
                remaining = %remaining,
                "remaining exceeds amount, degraded to null"
            );
            o.remaining = None;
        }
    }

    let filled = precise(&o.filled);
    if o.cost.is_none() {
        if let Some(filled) = &filled {
            let unit = precise(&o.average).or_else(|| precise(&o.price));
            o.cost = unit.map(|unit| unit.mul(filled).to_string());
        }
    }
    if o.average.is_none() {
        if let (Some(cost), Some(filled)) = (precise(&o.cost), &filled) {
            if !filled.is_zero() {
                o.average = cost.div(filled, 18).ok().map(|avg| avg.to_string());
            }
        }
    }
    if o.datetime.is_none() {
        o.datetime = o.timestamp.and_then(iso8601);
    }
    o
}

/// Finish balances: derive the third of free/used/total when two are known
///
/// A venue that reports only `total` keeps `free` and `used` null.
pub fn safe_balance(balances: Balances) -> Balances {
    let mut b = balances;
    for balance in b.currencies.values_mut() {
        balance.free = valid_number("free", balance.free.take());
        balance.used = valid_number("used", balance.used.take());
        balance.total = valid_number("total", balance.total.take());

        let free = precise(&balance.free);
        let used = precise(&balance.used);
        let total = precise(&balance.total);
        match (free, used, total) {
            (Some(free), Some(used), None) => balance.total = Some(free.add(&used).to_string()),
            (Some(free), None, Some(total)) => balance.used = Some(total.sub(&free).to_string()),
            (None, Some(used), Some(total)) => balance.free = Some(total.sub(&used).to_string()),
            _ => {}
        }
    }
    if b.datetime.is_none() {
        b.datetime = b.timestamp.and_then(iso8601);
    }
    b
}

/// Order-book side from a list of objects carrying price/amount keys
///
/// Entries whose price or amount is not numeric are dropped.
pub fn parse_bids_asks(entries: &[Value], price_key: &str, amount_key: &str) -> Vec<OrderBookEntry> {
    entries
        .iter()
        .filter_map(|entry| {
            let price = valid_number(price_key, safe_string(entry, price_key))?;
            let amount = valid_number(amount_key, safe_string(entry, amount_key))?;
            Some(OrderBookEntry { price, amount })
        })
        .collect()
}

fn price_order(a: &OrderBookEntry, b: &OrderBookEntry) -> Ordering {
    match (Precise::parse(&a.price), Precise::parse(&b.price)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}

/// Order book with bids descending and asks ascending by price
pub fn build_order_book(
    symbol: Option<String>,
    mut bids: Vec<OrderBookEntry>,
    mut asks: Vec<OrderBookEntry>,
    timestamp: Option<i64>,
) -> OrderBook {
    bids.sort_by(|a, b| price_order(b, a));
    asks.sort_by(price_order);
    OrderBook {
        symbol,
        timestamp,
        datetime: timestamp.and_then(iso8601),
        bids,
        asks,
        nonce: None,
    }
}

/// Ascending by timestamp, entries before `since` dropped, first `limit` kept
pub fn filter_by_since_limit<T>(
    mut items: Vec<T>,
    since: Option<i64>,
    limit: Option<u32>,
    timestamp: impl Fn(&T) -> Option<i64>,
) -> Vec<T> {
    items.sort_by_key(|item| timestamp(item));
    if let Some(since) = since {
        items.retain(|item| timestamp(item).is_some_and(|ts| ts >= since));
    }
    if let Some(limit) = limit {
        items.truncate(limit as usize);
    }
    items
}
