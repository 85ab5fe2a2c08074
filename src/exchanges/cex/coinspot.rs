//! CoinSpot Exchange Implementation
//!
//! Australian cryptocurrency exchange. The market catalog is static; order
//! book and trade history are private endpoints.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::client::{
    join_url, Api, ApiRequest, Credentials, ExchangeConfig, NonceGenerator, Session, Signer,
    Transport,
};
use crate::errors::{CcxtError, CcxtResult, ExceptionTable};
use crate::types::{
    Action, Balance, Balances, EndpointRoute, Exchange, ExchangeFeatures, ExchangeId,
    ExchangeUrls, HttpMethod, Market, MarketTable, Order, OrderBook, OrderRequest, OrderSide,
    OrderStatus, OrderType, Params, SignedRequest, Ticker, Trade, VenueDescriptor,
};
use crate::utils::crypto::hmac_sha512_hex;
use crate::utils::parse::{
    build_order_book, filter_by_since_limit, parse_bids_asks, safe_balance, safe_currency_code,
    safe_order, safe_ticker, safe_trade, ParseContext,
};
use crate::utils::time::now_ms;
use crate::utils::{safe_integer, safe_list, safe_string, safe_value, safe_value2, value_to_string};

static ROUTES: &[EndpointRoute] = &[
    EndpointRoute {
        action: Action::CreateOrder,
        side: Some(OrderSide::Buy),
        order_type: Some(OrderType::Limit),
        api: Api::Private,
        method: HttpMethod::Post,
        path: "my/buy",
    },
    EndpointRoute {
        action: Action::CreateOrder,
        side: Some(OrderSide::Sell),
        order_type: Some(OrderType::Limit),
        api: Api::Private,
        method: HttpMethod::Post,
        path: "my/sell",
    },
    EndpointRoute {
        action: Action::CancelOrder,
        side: Some(OrderSide::Buy),
        order_type: None,
        api: Api::Private,
        method: HttpMethod::Post,
        path: "my/buy/cancel",
    },
    EndpointRoute {
        action: Action::CancelOrder,
        side: Some(OrderSide::Sell),
        order_type: None,
        api: Api::Private,
        method: HttpMethod::Post,
        path: "my/sell/cancel",
    },
];

const COMMON_CURRENCIES: &[(&str, &str)] = &[("DRK", "DASH")];

/// Base currency ids listed against AUD
const BASE_IDS: &[&str] = &[
    "btc", "eth", "xrp", "ltc", "doge", "rfox", "powr", "neo", "trx", "eos", "xlm", "rhoc", "gas",
];

/// `fetchBalance` option values and the endpoint each selects
const BALANCE_ENDPOINTS: &[(&str, &str)] = &[
    ("my/balances", "my/balances"),
    ("private_post_my_balances", "my/balances"),
    ("ro/my/balances", "ro/my/balances"),
    ("private_post_ro_my_balances", "ro/my/balances"),
];

/// CoinSpot request signer
///
/// Every call needs an API key, public ones included. Private calls post a
/// JSON body carrying the nonce, signed with HMAC-SHA512 over the body.
#[derive(Debug, Clone)]
pub struct CoinspotSigner {
    urls: ExchangeUrls,
}

impl CoinspotSigner {
    pub fn new(urls: &ExchangeUrls) -> Self {
        Self { urls: urls.clone() }
    }
}

impl Signer for CoinspotSigner {
    fn sign(
        &self,
        request: &ApiRequest,
        credentials: &Credentials,
        nonce: &NonceGenerator,
    ) -> CcxtResult<SignedRequest> {
        if credentials.api_key().is_none() {
            return Err(CcxtError::AuthenticationError {
                message: "coinspot requires apiKey for all requests".into(),
            });
        }
        let (path, query) = request.params.implode_path(&request.path);
        let base = self.urls.api(request.api);

        match request.api {
            Api::Public => Ok(SignedRequest::new(request.method, join_url(base, &path, &query))),
            Api::Private => {
                let (api_key, secret) = credentials.check_required_credentials()?;
                let body = Params::new()
                    .with("nonce", nonce.next())
                    .merge(&query);
                let body = serde_json::to_string(&body)?;
                let signature = hmac_sha512_hex(secret, &body)?;

                Ok(SignedRequest::new(request.method, join_url(base, &path, &Params::new()))
                    .with_header("Content-Type", "application/json")
                    .with_header("key", api_key)
                    .with_header("sign", signature)
                    .with_body(body))
            }
        }
    }
}

/// CoinSpot Exchange
pub struct Coinspot {
    descriptor: VenueDescriptor,
    session: Session,
    transport: Arc<dyn Transport>,
    signer: CoinspotSigner,
}

impl Coinspot {
    const PUBLIC_URL: &'static str = "https://www.coinspot.com.au/pubapi";
    const PRIVATE_URL: &'static str = "https://www.coinspot.com.au/api";
    const RATE_LIMIT_MS: u64 = 1000;
    const QUOTE_ID: &'static str = "aud";

    /// Create new CoinSpot instance
    pub fn new(config: ExchangeConfig, transport: Arc<dyn Transport>) -> CcxtResult<Self> {
        let descriptor = Self::describe();
        let signer = CoinspotSigner::new(&descriptor.urls);
        Ok(Self {
            descriptor,
            session: Session::new(config),
            transport,
            signer,
        })
    }

    fn describe() -> VenueDescriptor {
        let features = ExchangeFeatures {
            spot: true,
            fetch_markets: true,
            fetch_ticker: true,
            fetch_tickers: true,
            fetch_order_book: true,
            fetch_trades: true,
            fetch_balance: true,
            create_order: true,
            cancel_order: true,
            ..Default::default()
        };

        let urls = ExchangeUrls {
            public: Self::PUBLIC_URL.into(),
            private: Self::PRIVATE_URL.into(),
            www: Some("https://www.coinspot.com.au".into()),
            doc: vec!["https://www.coinspot.com.au/api".into()],
        };

        VenueDescriptor {
            id: ExchangeId::Coinspot,
            name: "CoinSpot",
            countries: &["AU"],
            version: "v1",
            rate_limit_ms: Self::RATE_LIMIT_MS,
            urls,
            has: features,
            exceptions: ExceptionTable::new(&[]),
            routes: ROUTES,
            common_currencies: COMMON_CURRENCIES,
            taker_fee: None,
            maker_fee: None,
        }
    }

    /// Static AUD market catalog
    pub fn default_markets() -> Vec<Market> {
        BASE_IDS
            .iter()
            .copied()
            .filter_map(|base_id| {
                let base = safe_currency_code(Some(base_id), COMMON_CURRENCIES)?;
                let quote = safe_currency_code(Some(Self::QUOTE_ID), COMMON_CURRENCIES)?;
                Some(Market::spot(base_id, &base, &quote, base_id, Self::QUOTE_ID))
            })
            .collect()
    }

    fn context<'a>(&'a self, markets: &'a MarketTable, market: Option<&'a Market>) -> ParseContext<'a> {
        ParseContext::new(Some(markets), self.descriptor.common_currencies).with_market(market)
    }

    fn balance_endpoint(&self) -> CcxtResult<&'static str> {
        let Some(option) = self.session.config().option_str("fetchBalance") else {
            return Ok("my/balances");
        };
        BALANCE_ENDPOINTS
            .iter()
            .find(|(name, _)| *name == option)
            .map(|(_, path)| *path)
            .ok_or_else(|| CcxtError::BadRequest {
                message: format!("{} unknown fetchBalance option {option}", self.id()),
            })
    }

    /// 잔고 파싱
    ///
    /// `my/balances` answers a list of `{CODE: {balance, ...}}` objects,
    /// `ro/my/balances` a flat `{code: amount}` map. Only totals are reported.
    pub fn parse_balance(response: &Value, ctx: ParseContext<'_>) -> Balances {
        let mut result = Balances {
            info: response.clone(),
            ..Default::default()
        };
        match safe_value2(response, "balance", "balances") {
            Some(Value::Array(entries)) => {
                for (currency_id, balance) in entries.iter().filter_map(Value::as_object).flatten() {
                    if let Some(code) = safe_currency_code(Some(currency_id.as_str()), ctx.aliases) {
                        result.add(code, Balance::from_total(safe_string(balance, "balance")));
                    }
                }
            }
            Some(Value::Object(balances)) => {
                for (currency_id, total) in balances {
                    if let Some(code) = safe_currency_code(Some(currency_id.as_str()), ctx.aliases) {
                        result.add(code, Balance::from_total(value_to_string(total)));
                    }
                }
            }
            _ => {}
        }
        safe_balance(result)
    }

    /// 티커 파싱; CoinSpot sends no timestamp, so the receive time is used
    pub fn parse_ticker(ticker: &Value, ctx: ParseContext<'_>, timestamp: i64) -> Ticker {
        let last = safe_string(ticker, "last");
        safe_ticker(Ticker {
            symbol: ctx.safe_symbol(None, None),
            timestamp: Some(timestamp),
            bid: safe_string(ticker, "bid"),
            ask: safe_string(ticker, "ask"),
            close: last.clone(),
            last,
            info: ticker.clone(),
            ..Default::default()
        })
    }

    /// 체결 파싱 (`market` is `BASE/QUOTE`)
    pub fn parse_trade(trade: &Value, ctx: ParseContext<'_>) -> Trade {
        let market_id = safe_string(trade, "market");
        safe_trade(Trade {
            symbol: ctx.safe_symbol(market_id.as_deref(), Some("/")),
            timestamp: safe_integer(trade, "solddate"),
            price: safe_string(trade, "rate"),
            amount: safe_string(trade, "amount"),
            cost: safe_string(trade, "total"),
            info: trade.clone(),
            ..Default::default()
        })
    }

    fn latest_prices<'v>(&self, response: &'v Value) -> CcxtResult<&'v Value> {
        safe_value(response, "prices").ok_or_else(|| CcxtError::BadResponse {
            message: format!("{} latest response carries no prices", self.id()),
        })
    }
}

#[async_trait]
impl Exchange for Coinspot {
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

    /// Any `status` other than `ok` is a failure
    fn handle_errors(&self, _status: u16, body: &Value) -> CcxtResult<()> {
        match safe_string(body, "status") {
            Some(status) if status != "ok" => {
                let message = safe_string(body, "message").unwrap_or_else(|| body.to_string());
                Err(CcxtError::ExchangeError {
                    message: format!("{} {message}", self.id()),
                })
            }
            _ => Ok(()),
        }
    }

    async fn fetch_markets(&self, _params: Params) -> CcxtResult<Vec<Market>> {
        Ok(Self::default_markets())
    }

    async fn fetch_ticker(&self, symbol: &str, params: Params) -> CcxtResult<Ticker> {
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let response = self.request(ApiRequest::public_get("latest", params)).await?;
        let prices = self.latest_prices(&response)?;
        let ticker = safe_value(prices, &market.id.to_lowercase()).ok_or_else(|| {
            CcxtError::BadSymbol {
                symbol: symbol.to_string(),
            }
        })?;
        Ok(Self::parse_ticker(ticker, self.context(&markets, Some(market)), now_ms()))
    }

    async fn fetch_tickers(
        &self,
        symbols: Option<&[&str]>,
        params: Params,
    ) -> CcxtResult<BTreeMap<String, Ticker>> {
        let markets = self.load_markets(false).await?;
        let response = self.request(ApiRequest::public_get("latest", params)).await?;
        let prices = self.latest_prices(&response)?;

        let timestamp = now_ms();
        let mut result = BTreeMap::new();
        for (id, raw) in prices.as_object().into_iter().flatten() {
            let Some(market) = markets.by_id(id) else {
                continue;
            };
            if symbols.is_some_and(|wanted| !wanted.contains(&market.symbol.as_str())) {
                continue;
            }
            let ticker = Self::parse_ticker(raw, self.context(&markets, Some(market)), timestamp);
            result.insert(market.symbol.clone(), ticker);
        }
        Ok(result)
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
            .with("cointype", market.id.as_str())
            .merge(&params);
        let response = self
            .request(ApiRequest::private_post("orders", request))
            .await?;

        let mut book = build_order_book(
            Some(market.symbol.clone()),
            parse_bids_asks(safe_list(&response, "buyorders"), "rate", "amount"),
            parse_bids_asks(safe_list(&response, "sellorders"), "rate", "amount"),
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
            .with("cointype", market.id.as_str())
            .merge(&params);
        let response = self
            .request(ApiRequest::private_post("orders/history", request))
            .await?;

        let ctx = self.context(&markets, Some(market));
        let trades = safe_list(&response, "orders")
            .iter()
            .map(|t| Self::parse_trade(t, ctx))
            .collect();
        Ok(filter_by_since_limit(trades, since, limit, |t| t.timestamp))
    }

    async fn fetch_balance(&self, params: Params) -> CcxtResult<Balances> {
        let path = self.balance_endpoint()?;
        let markets = self.load_markets(false).await?;
        let response = self.request(ApiRequest::private_post(path, params)).await?;
        Ok(Self::parse_balance(&response, self.context(&markets, None)))
    }

    async fn create_order(&self, order: OrderRequest) -> CcxtResult<Order> {
        let route = self.route(Action::CreateOrder, Some(order.side), Some(&order.order_type))?;
        let price = order.price_string().ok_or_else(|| {
            CcxtError::arguments_required(format!(
                "{} createOrder() requires a price for limit orders",
                self.id()
            ))
        })?;

        let markets = self.load_markets(false).await?;
        let market = markets.market(&order.symbol)?;
        let request = Params::new()
            .with("cointype", market.id.as_str())
            .with("amount", order.amount_string())
            .with("rate", price.as_str())
            .merge(&order.params);
        let response = self.request(route.request(request)).await?;

        Ok(safe_order(Order {
            id: safe_string(&response, "id"),
            status: Some(OrderStatus::Open),
            symbol: Some(market.symbol.clone()),
            order_type: Some(OrderType::Limit),
            side: Some(order.side),
            price: Some(price),
            amount: Some(order.amount_string()),
            info: response,
            ..Default::default()
        }))
    }

    /// CoinSpot cancels per side; pass `side` (`buy`/`sell`) in `params`
    async fn cancel_order(&self, id: &str, symbol: Option<&str>, params: Params) -> CcxtResult<Order> {
        let side = params
            .get_string("side")
            .and_then(|s| OrderSide::from_canonical(&s))
            .ok_or_else(|| {
                CcxtError::arguments_required(format!(
                    "{} cancelOrder() requires a side parameter, \"buy\" or \"sell\"",
                    self.id()
                ))
            })?;
        let route = self.route(Action::CancelOrder, Some(side), None)?;
        let request = Params::new()
            .with("id", id)
            .merge(&params.omit(&["side"]));
        let response = self.request(route.request(request)).await?;

        Ok(safe_order(Order {
            id: Some(id.to_string()),
            status: Some(OrderStatus::Canceled),
            symbol: symbol.map(str::to_string),
            side: Some(side),
            info: response,
            ..Default::default()
        }))
    }
}
