//! bitFlyer Exchange Implementation
//!
//! 일본 거래소. 현물, FX(무기한) 및 만기 선물 마켓

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;

use tracing::debug;

use crate::client::{
    Api, ApiRequest, Credentials, ExchangeConfig, NonceGenerator, Session, Signer, Transport,
};
use crate::errors::{CcxtError, CcxtResult, ErrorKind, ExceptionTable};
use crate::types::{
    Action, Balance, Balances, EndpointRoute, Exchange, ExchangeFeatures, ExchangeId,
    ExchangeUrls, Fee, HttpMethod, Market, MarketTable, MarketType, Order, OrderBook,
    OrderRequest, OrderStatus, OrderType, Params, SignedRequest, Ticker, Trade, TradingFee,
    Transaction, TransactionStatus, TransactionType, VenueDescriptor,
};
use crate::utils::crypto::hmac_sha256_hex;
use crate::utils::parse::{
    build_order_book, check_address, filter_by_since_limit, map_raw, parse_bids_asks, parse_side,
    parse_status, safe_balance, safe_currency_code, safe_order, safe_ticker, safe_trade,
    ParseContext,
};
use crate::utils::time::{iso8601, parse8601, parse_ddmmmyyyy};
use crate::utils::{
    safe_list, safe_number, safe_string, safe_string2, safe_string_lower, safe_value,
    value_to_string, Precise,
};

const EXCEPTIONS: ExceptionTable = ExceptionTable::new(&[("-200", ErrorKind::InsufficientFunds)]);

static ROUTES: &[EndpointRoute] = &[
    EndpointRoute {
        action: Action::CreateOrder,
        side: None,
        order_type: None,
        api: Api::Private,
        method: HttpMethod::Post,
        path: "sendchildorder",
    },
    EndpointRoute {
        action: Action::CancelOrder,
        side: None,
        order_type: None,
        api: Api::Private,
        method: HttpMethod::Post,
        path: "cancelchildorder",
    },
    EndpointRoute {
        action: Action::FetchPositions,
        side: None,
        order_type: None,
        api: Api::Private,
        method: HttpMethod::Get,
        path: "getpositions",
    },
];

const STATUSES: &[(&str, &str)] = &[
    ("ACTIVE", "open"),
    ("COMPLETED", "closed"),
    ("CANCELED", "canceled"),
    ("EXPIRED", "canceled"),
    ("REJECTED", "canceled"),
];

/// 입금/출금 공통 상태
const TRANSACTION_STATUSES: &[(&str, &str)] = &[("PENDING", "pending"), ("COMPLETED", "ok")];

/// Fiat currencies the `withdraw` endpoint accepts
const WITHDRAW_CURRENCIES: &[&str] = &["JPY", "USD", "EUR"];

/// 마켓 카탈로그 (일본, 미국, 유럽)
const MARKET_CATALOGS: &[&str] = &["getmarkets", "getmarkets/usa", "getmarkets/eu"];

/// bitFlyer 요청 서명
///
/// Every path is rooted at `/v1/` (`/v1/me/` for private calls). The signed
/// text is `timestamp + method + path`, plus the JSON body on POST.
#[derive(Debug, Clone)]
pub struct BitflyerSigner {
    host: String,
    version: &'static str,
}

impl BitflyerSigner {
    pub fn new(host: impl Into<String>, version: &'static str) -> Self {
        Self {
            host: host.into(),
            version,
        }
    }

    fn endpoint(&self, api: Api, path: &str) -> String {
        let mut endpoint = format!("/{}/", self.version);
        if api == Api::Private {
            endpoint.push_str("me/");
        }
        endpoint.push_str(path.trim_start_matches('/'));
        endpoint
    }
}

impl Signer for BitflyerSigner {
    fn sign(
        &self,
        request: &ApiRequest,
        credentials: &Credentials,
        nonce: &NonceGenerator,
    ) -> CcxtResult<SignedRequest> {
        let (path, query) = request.params.implode_path(&request.path);
        let mut endpoint = self.endpoint(request.api, &path);
        let mut body = None;
        if request.method == HttpMethod::Get {
            let query_string = query.to_query_string();
            if !query_string.is_empty() {
                endpoint.push('?');
                endpoint.push_str(&query_string);
            }
        } else if !query.is_empty() {
            body = Some(serde_json::to_string(&query)?);
        }
        let url = format!("{}{}", self.host, endpoint);

        match request.api {
            Api::Public => {
                let signed = SignedRequest::new(request.method, url);
                Ok(match body {
                    Some(body) => signed.with_body(body),
                    None => signed,
                })
            }
            Api::Private => {
                let (api_key, secret) = credentials.check_required_credentials()?;
                let timestamp = nonce.next().to_string();
                let mut auth = format!("{timestamp}{}{endpoint}", request.method.as_str());
                if let Some(body) = &body {
                    auth.push_str(body);
                }
                let signature = hmac_sha256_hex(secret, &auth)?;

                let signed = SignedRequest::new(request.method, url)
                    .with_header("ACCESS-KEY", api_key)
                    .with_header("ACCESS-TIMESTAMP", timestamp)
                    .with_header("ACCESS-SIGN", signature)
                    .with_header("Content-Type", "application/json");
                Ok(match body {
                    Some(body) => signed.with_body(body),
                    None => signed,
                })
            }
        }
    }
}

/// bitFlyer 거래소
pub struct Bitflyer {
    descriptor: VenueDescriptor,
    session: Session,
    transport: Arc<dyn Transport>,
    signer: BitflyerSigner,
}

impl Bitflyer {
    const DEFAULT_HOSTNAME: &'static str = "bitflyer.com";
    const VERSION: &'static str = "v1";
    const RATE_LIMIT_MS: u64 = 1000;
    const TRADING_FEE: &'static str = "0.002";
    /// FX and futures settle in yen and carry no trading fee
    const SETTLE: &'static str = "JPY";
    const DEFAULT_ORDER_COUNT: u32 = 100;

    /// 새 bitFlyer 인스턴스 생성
    ///
    /// `hostname` in the config replaces `bitflyer.com` in the API host.
    pub fn new(config: ExchangeConfig, transport: Arc<dyn Transport>) -> CcxtResult<Self> {
        let hostname = config.hostname().unwrap_or(Self::DEFAULT_HOSTNAME);
        let host = format!("https://api.{hostname}");
        let descriptor = Self::describe(&host);
        let signer = BitflyerSigner::new(host, Self::VERSION);
        Ok(Self {
            descriptor,
            session: Session::new(config),
            transport,
            signer,
        })
    }

    fn describe(host: &str) -> VenueDescriptor {
        let features = ExchangeFeatures {
            spot: true,
            swap: true,
            future: true,
            fetch_markets: true,
            fetch_ticker: true,
            fetch_order_book: true,
            fetch_trades: true,
            fetch_balance: true,
            create_order: true,
            cancel_order: true,
            fetch_order: true,
            fetch_orders: true,
            fetch_open_orders: true,
            fetch_closed_orders: true,
            fetch_my_trades: true,
            fetch_trading_fee: true,
            fetch_deposits: true,
            fetch_withdrawals: true,
            withdraw: true,
            fetch_positions: true,
            ..Default::default()
        };

        let urls = ExchangeUrls {
            public: format!("{host}/{}", Self::VERSION),
            private: format!("{host}/{}/me", Self::VERSION),
            www: Some("https://bitflyer.com".into()),
            doc: vec!["https://lightning.bitflyer.com/docs?lang=en".into()],
        };

        VenueDescriptor {
            id: ExchangeId::Bitflyer,
            name: "bitFlyer",
            countries: &["JP"],
            version: Self::VERSION,
            rate_limit_ms: Self::RATE_LIMIT_MS,
            urls,
            has: features,
            exceptions: EXCEPTIONS,
            routes: ROUTES,
            common_currencies: &[],
            taker_fee: Some(Self::TRADING_FEE),
            maker_fee: Some(Self::TRADING_FEE),
        }
    }

    fn context<'a>(&'a self, markets: &'a MarketTable, market: Option<&'a Market>) -> ParseContext<'a> {
        ParseContext::new(Some(markets), self.descriptor.common_currencies).with_market(market)
    }

    fn require_symbol<'s>(&self, symbol: Option<&'s str>, method: &str) -> CcxtResult<&'s str> {
        symbol.ok_or_else(|| {
            CcxtError::arguments_required(format!(
                "{} {method}() requires a symbol argument",
                self.id()
            ))
        })
    }

    /// `getmarkets` 카탈로그를 마켓으로 변환
    ///
    /// `market_type` of `FX` is a perpetual swap (`FX_BTC_JPY`), `Futures` an
    /// expiring contract whose date is the `DDMMMYYYY` tail of the product code.
    pub fn parse_markets(catalogs: &[Value], ctx: ParseContext<'_>) -> Vec<Market> {
        catalogs
            .iter()
            .filter_map(|catalog| catalog.as_array())
            .flatten()
            .filter_map(|raw| Self::parse_market(raw, ctx))
            .collect()
    }

    fn parse_market(raw: &Value, ctx: ParseContext<'_>) -> Option<Market> {
        let id = safe_string(raw, "product_code")?;
        let market_type = match safe_string(raw, "market_type").as_deref() {
            Some("FX") => MarketType::Swap,
            Some("Futures") => MarketType::Future,
            _ => MarketType::Spot,
        };

        let currencies: Vec<&str> = id.split('_').collect();
        let (base_id, quote_id, expiry) = match market_type {
            MarketType::Swap => (
                currencies.get(1)?.to_string(),
                currencies.get(2)?.to_string(),
                None,
            ),
            MarketType::Future => match safe_string(raw, "alias") {
                Some(alias) => {
                    let pair = alias.split('_').next()?;
                    let split = pair.len().checked_sub(3)?;
                    let expiry = id.split(pair).nth(1).and_then(parse_ddmmmyyyy);
                    (pair.get(..split)?.to_string(), pair.get(split..)?.to_string(), expiry)
                }
                None => {
                    let tail = id.len().checked_sub(9)?;
                    let expiry = id.get(tail..).and_then(parse_ddmmmyyyy);
                    (id.get(0..3)?.to_string(), id.get(3..6)?.to_string(), expiry)
                }
            },
            _ => (
                currencies.first()?.to_string(),
                currencies.get(1)?.to_string(),
                None,
            ),
        };

        let base = safe_currency_code(Some(base_id.as_str()), ctx.aliases)?;
        let quote = safe_currency_code(Some(quote_id.as_str()), ctx.aliases)?;
        let market = Market::spot(&id, &base, &quote, &base_id, &quote_id)
            .with_fees(Some(Self::TRADING_FEE), Some(Self::TRADING_FEE))
            .with_info(raw.clone());
        if market_type == MarketType::Spot {
            return Some(market);
        }

        let future = market_type == MarketType::Future;
        if future && expiry.is_none() {
            debug!(product_code = %id, "futures product without a parseable expiry skipped");
            return None;
        }
        Some(Market {
            symbol: Market::symbol_for(&base, &quote, Some(Self::SETTLE), expiry),
            settle: Some(Self::SETTLE.to_string()),
            settle_id: Some(Self::SETTLE.to_string()),
            market_type,
            spot: false,
            swap: !future,
            future,
            contract: true,
            linear: Some(true),
            inverse: Some(false),
            expiry,
            expiry_datetime: expiry.and_then(iso8601),
            ..market.with_fees(Some("0"), Some("0"))
        })
    }

    /// 티커 파싱
    pub fn parse_ticker(ticker: &Value, ctx: ParseContext<'_>) -> Ticker {
        let market_id = safe_string(ticker, "product_code");
        let last = safe_string(ticker, "ltp");
        safe_ticker(Ticker {
            symbol: ctx.safe_symbol(market_id.as_deref(), Some("_")),
            timestamp: safe_string(ticker, "timestamp").and_then(|ts| parse8601(&ts)),
            bid: safe_string(ticker, "best_bid"),
            ask: safe_string(ticker, "best_ask"),
            close: last.clone(),
            last,
            base_volume: safe_string(ticker, "volume_by_product"),
            info: ticker.clone(),
            ..Default::default()
        })
    }

    /// 체결 파싱
    ///
    /// Executions name the order on each side; the taker side's order id is
    /// `<side>_child_order_acceptance_id`.
    pub fn parse_trade(trade: &Value, ctx: ParseContext<'_>) -> Trade {
        let side = safe_string_lower(trade, "side").filter(|s| !s.is_empty());
        let order = side
            .as_ref()
            .and_then(|s| safe_string(trade, &format!("{s}_child_order_acceptance_id")))
            .or_else(|| safe_string(trade, "child_order_acceptance_id"));

        safe_trade(Trade {
            id: safe_string(trade, "id"),
            order,
            timestamp: safe_string(trade, "exec_date").and_then(|ts| parse8601(&ts)),
            symbol: ctx.safe_symbol(None, None),
            side: parse_side(&[], side.as_deref()),
            price: safe_string(trade, "price"),
            amount: safe_string(trade, "size"),
            info: trade.clone(),
            ..Default::default()
        })
    }

    /// 주문 파싱
    pub fn parse_order(order: &Value, ctx: ParseContext<'_>) -> Order {
        let market_id = safe_string(order, "product_code");
        let fee = safe_number(order, "total_commission").map(|cost| Fee::new(Some(cost), None));

        safe_order(Order {
            id: safe_string(order, "child_order_acceptance_id"),
            timestamp: safe_string(order, "child_order_date").and_then(|ts| parse8601(&ts)),
            status: parse_status(STATUSES, safe_string(order, "child_order_state").as_deref()),
            symbol: ctx.safe_symbol(market_id.as_deref(), Some("_")),
            order_type: safe_string_lower(order, "child_order_type").map(OrderType::from),
            side: parse_side(&[], safe_string_lower(order, "side").as_deref()),
            price: safe_string(order, "price"),
            average: safe_string(order, "average_price"),
            amount: safe_string(order, "size"),
            filled: safe_string(order, "executed_size"),
            remaining: safe_string(order, "outstanding_size"),
            fee,
            info: order.clone(),
            ..Default::default()
        })
    }

    /// 잔고 파싱 (`available` → free, `amount` → total)
    pub fn parse_balance(response: &Value, ctx: ParseContext<'_>) -> Balances {
        let mut result = Balances {
            info: response.clone(),
            ..Default::default()
        };
        for balance in response.as_array().into_iter().flatten() {
            let currency_id = safe_string(balance, "currency_code");
            if let Some(code) = safe_currency_code(currency_id.as_deref(), ctx.aliases) {
                result.add(
                    code,
                    Balance::new(
                        safe_string(balance, "available"),
                        None,
                        safe_string(balance, "amount"),
                    ),
                );
            }
        }
        safe_balance(result)
    }

    /// 입출금 내역 파싱
    ///
    /// Only withdrawals (`getcoinouts`) carry a `fee`; its cost is the sum of
    /// `fee` and `additional_fee`.
    pub fn parse_transaction(transaction: &Value, code: Option<&str>, ctx: ParseContext<'_>) -> Transaction {
        let currency = safe_currency_code(
            safe_string(transaction, "currency_code").as_deref(),
            ctx.aliases,
        )
        .or_else(|| code.map(str::to_string));
        let status = safe_string(transaction, "status")
            .map(|raw| TransactionStatus::from(map_raw(TRANSACTION_STATUSES, &raw)));
        let timestamp = safe_string(transaction, "event_date").and_then(|ts| parse8601(&ts));
        let address = safe_string(transaction, "address");

        let (tx_type, fee) = if safe_value(transaction, "fee").is_some() {
            let cost = withdrawal_fee(transaction);
            (
                TransactionType::Withdrawal,
                Some(Fee::new(cost, currency.clone())),
            )
        } else {
            (TransactionType::Deposit, None)
        };

        Transaction {
            id: safe_string2(transaction, "id", "message_id"),
            txid: safe_string(transaction, "tx_hash"),
            timestamp,
            datetime: timestamp.and_then(iso8601),
            address,
            tag: None,
            tx_type: Some(tx_type),
            amount: safe_number(transaction, "amount"),
            currency,
            status,
            fee,
            info: transaction.clone(),
        }
    }

    async fn fetch_transactions(
        &self,
        path: &str,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Transaction>> {
        let markets = self.load_markets(false).await?;
        let request = Params::new().with_opt("count", limit).merge(&params);
        let response = self.request(ApiRequest::private_get(path, request)).await?;

        let ctx = self.context(&markets, None);
        let transactions = response
            .as_array()
            .into_iter()
            .flatten()
            .map(|t| Self::parse_transaction(t, code, ctx))
            .filter(|t| code.map_or(true, |c| t.currency.as_deref() == Some(c)))
            .collect();
        Ok(filter_by_since_limit(transactions, since, limit, |t| t.timestamp))
    }
}

/// `fee + additional_fee`, exact; a missing part counts as zero
fn withdrawal_fee(transaction: &Value) -> Option<String> {
    let fee = safe_number(transaction, "fee");
    let additional = safe_number(transaction, "additional_fee");
    if fee.is_none() && additional.is_none() {
        return None;
    }
    Precise::string_add(
        fee.as_deref().unwrap_or("0"),
        additional.as_deref().unwrap_or("0"),
    )
    .ok()
}

/// Decimal rendered as a JSON number, the way the order endpoints expect it
///
/// Values a JSON number cannot carry exactly are rejected instead of rounded.
fn json_number(value: &str) -> CcxtResult<Value> {
    let number: Value = serde_json::from_str(value)?;
    let exact = value_to_string(&number)
        .and_then(|rendered| Precise::parse(&rendered).ok())
        .zip(Precise::parse(value).ok())
        .map_or(false, |(rendered, requested)| rendered == requested);
    if !exact {
        return Err(CcxtError::InvalidOrder {
            message: format!("{value} does not fit a JSON number exactly"),
        });
    }
    Ok(number)
}

#[async_trait]
impl Exchange for Bitflyer {
    fn descriptor(&self) -> &VenueDescriptor {
        &self.descriptor
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn signer(&self) -> &dyn Signer {
        &self.signer
    }

    /// Failures come back as `{"status": <negative>, "error_message": ...}`
    fn handle_errors(&self, _status: u16, body: &Value) -> CcxtResult<()> {
        let Some(code) = body.get("status").and_then(Value::as_i64) else {
            return Ok(());
        };
        if code >= 0 {
            return Ok(());
        }
        let message = safe_string(body, "error_message").unwrap_or_default();
        Err(self.descriptor.exceptions.throw_exactly_matched(
            Some(code.to_string().as_str()),
            format!("{} {message}", self.id()),
        ))
    }

    async fn fetch_markets(&self, params: Params) -> CcxtResult<Vec<Market>> {
        let mut catalogs = Vec::with_capacity(MARKET_CATALOGS.len());
        for path in MARKET_CATALOGS {
            let response = self
                .request(ApiRequest::public_get(*path, params.clone()))
                .await?;
            catalogs.push(response);
        }
        let ctx = ParseContext::new(None, self.descriptor.common_currencies);
        let markets = Self::parse_markets(&catalogs, ctx);
        debug!(exchange = %self.id(), count = markets.len(), "parsed markets");
        Ok(markets)
    }

    async fn fetch_ticker(&self, symbol: &str, params: Params) -> CcxtResult<Ticker> {
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("product_code", market.id.as_str())
            .merge(&params);
        let response = self
            .request(ApiRequest::public_get("getticker", request))
            .await?;
        Ok(Self::parse_ticker(&response, self.context(&markets, Some(market))))
    }

    async fn fetch_order_book(
        &self,
        symbol: &str,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<OrderBook> {
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("product_code", market.id.as_str())
            .merge(&params);
        let response = self
            .request(ApiRequest::public_get("getboard", request))
            .await?;

        let mut book = build_order_book(
            Some(market.symbol.clone()),
            parse_bids_asks(safe_list(&response, "bids"), "price", "size"),
            parse_bids_asks(safe_list(&response, "asks"), "price", "size"),
            None,
        );
        if let Some(limit) = limit {
            book.bids.truncate(limit as usize);
            book.asks.truncate(limit as usize);
        }
        Ok(book)
    }

    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Trade>> {
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("product_code", market.id.as_str())
            .merge(&params);
        let response = self
            .request(ApiRequest::public_get("getexecutions", request))
            .await?;

        let ctx = self.context(&markets, Some(market));
        let trades = response
            .as_array()
            .into_iter()
            .flatten()
            .map(|t| Self::parse_trade(t, ctx))
            .collect();
        Ok(filter_by_since_limit(trades, since, limit, |t| t.timestamp))
    }

    async fn fetch_balance(&self, params: Params) -> CcxtResult<Balances> {
        let markets = self.load_markets(false).await?;
        let response = self
            .request(ApiRequest::private_get("getbalance", params))
            .await?;
        Ok(Self::parse_balance(&response, self.context(&markets, None)))
    }

    async fn fetch_trading_fee(&self, symbol: &str, params: Params) -> CcxtResult<TradingFee> {
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("product_code", market.id.as_str())
            .merge(&params);
        let response = self
            .request(ApiRequest::private_get("gettradingcommission", request))
            .await?;

        let rate = safe_number(&response, "commission_rate");
        Ok(TradingFee {
            symbol: market.symbol.clone(),
            maker: rate.clone(),
            taker: rate,
            info: response,
        })
    }

    async fn create_order(&self, order: OrderRequest) -> CcxtResult<Order> {
        let route = self.route(Action::CreateOrder, Some(order.side), Some(&order.order_type))?;
        let markets = self.load_markets(false).await?;
        let market = markets.market(&order.symbol)?;

        let amount = order.amount_string();
        let price = order.price_string();
        let request = Params::new()
            .with("product_code", market.id.as_str())
            .with("child_order_type", order.order_type.as_str().to_uppercase())
            .with("side", order.side.as_str().to_uppercase())
            .with_opt("price", price.as_deref().map(json_number).transpose()?)
            .with("size", json_number(&amount)?)
            .merge(&order.params);
        let response = self.request(route.request(request)).await?;

        Ok(safe_order(Order {
            id: safe_string(&response, "child_order_acceptance_id"),
            symbol: Some(market.symbol.clone()),
            order_type: Some(order.order_type.clone()),
            side: Some(order.side),
            price,
            amount: Some(amount),
            info: response,
            ..Default::default()
        }))
    }

    async fn cancel_order(&self, id: &str, symbol: Option<&str>, params: Params) -> CcxtResult<Order> {
        let symbol = self.require_symbol(symbol, "cancelOrder")?;
        let route = self.route(Action::CancelOrder, None, None)?;
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("product_code", market.id.as_str())
            .with("child_order_acceptance_id", id)
            .merge(&params);
        let response = self.request(route.request(request)).await?;

        Ok(safe_order(Order {
            id: Some(id.to_string()),
            status: Some(OrderStatus::Canceled),
            symbol: Some(market.symbol.clone()),
            info: response,
            ..Default::default()
        }))
    }

    /// 최근 주문 목록에서 찾는다 (단건 조회 API 없음)
    async fn fetch_order(&self, id: &str, symbol: Option<&str>, params: Params) -> CcxtResult<Order> {
        let symbol = self.require_symbol(symbol, "fetchOrder")?;
        let orders = self.fetch_orders(Some(symbol), None, None, params).await?;
        orders
            .into_iter()
            .find(|o| o.id.as_deref() == Some(id))
            .ok_or_else(|| CcxtError::OrderNotFound {
                order_id: id.to_string(),
            })
    }

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Order>> {
        let symbol = self.require_symbol(symbol, "fetchOrders")?;
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("product_code", market.id.as_str())
            .with("count", limit.unwrap_or(Self::DEFAULT_ORDER_COUNT))
            .merge(&params);
        let response = self
            .request(ApiRequest::private_get("getchildorders", request))
            .await?;

        let ctx = self.context(&markets, Some(market));
        let orders = response
            .as_array()
            .into_iter()
            .flatten()
            .map(|o| Self::parse_order(o, ctx))
            .filter(|o| o.symbol.as_deref() == Some(market.symbol.as_str()))
            .collect();
        Ok(filter_by_since_limit(orders, since, limit, |o| o.timestamp))
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Order>> {
        let params = Params::new().with("child_order_state", "ACTIVE").merge(&params);
        self.fetch_orders(symbol, since, limit, params).await
    }

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Order>> {
        let params = Params::new().with("child_order_state", "COMPLETED").merge(&params);
        self.fetch_orders(symbol, since, limit, params).await
    }

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Trade>> {
        let symbol = self.require_symbol(symbol, "fetchMyTrades")?;
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("product_code", market.id.as_str())
            .with_opt("count", limit)
            .merge(&params);
        let response = self
            .request(ApiRequest::private_get("getexecutions", request))
            .await?;

        let ctx = self.context(&markets, Some(market));
        let trades = response
            .as_array()
            .into_iter()
            .flatten()
            .map(|t| Self::parse_trade(t, ctx))
            .collect();
        Ok(filter_by_since_limit(trades, since, limit, |t| t.timestamp))
    }

    async fn fetch_deposits(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Transaction>> {
        self.fetch_transactions("getcoinins", code, since, limit, params)
            .await
    }

    async fn fetch_withdrawals(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Transaction>> {
        self.fetch_transactions("getcoinouts", code, since, limit, params)
            .await
    }

    /// Fiat only; the bank account goes in `params` (`bank_account_id`)
    async fn withdraw(
        &self,
        code: &str,
        amount: Decimal,
        address: &str,
        tag: Option<&str>,
        params: Params,
    ) -> CcxtResult<Transaction> {
        let _ = tag;
        check_address(address)?;
        if !WITHDRAW_CURRENCIES.contains(&code) {
            return Err(CcxtError::ExchangeError {
                message: format!(
                    "{} allows withdrawing JPY, USD, EUR only, {code} is not supported",
                    self.id()
                ),
            });
        }
        let markets = self.load_markets(false).await?;
        let amount = amount.normalize().to_string();
        let request = Params::new()
            .with("currency_code", code)
            .with("amount", json_number(&amount)?)
            .merge(&params);
        let response = self
            .request(ApiRequest::private_post("withdraw", request))
            .await?;

        let parsed = Self::parse_transaction(&response, Some(code), self.context(&markets, None));
        Ok(Transaction {
            tx_type: Some(TransactionType::Withdrawal),
            amount: parsed.amount.or(Some(amount)),
            address: parsed.address.or_else(|| Some(address.to_string())),
            ..parsed
        })
    }

    /// Raw `getpositions` records for exactly one FX/futures symbol
    async fn fetch_positions(&self, symbols: Option<&[&str]>, params: Params) -> CcxtResult<Vec<Value>> {
        let symbol = match symbols {
            Some([symbol]) => *symbol,
            _ => {
                return Err(CcxtError::arguments_required(format!(
                    "{} fetchPositions() requires a symbols argument with exactly one symbol",
                    self.id()
                )))
            }
        };
        let route = self.route(Action::FetchPositions, None, None)?;
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("product_code", market.id.as_str())
            .merge(&params);
        let response = self.request(route.request(request)).await?;
        Ok(response.as_array().cloned().unwrap_or_default())
    }
}
