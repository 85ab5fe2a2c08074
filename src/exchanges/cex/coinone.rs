//! Coinone Exchange Implementation
//!
//! 한국 현물 거래소, 모든 마켓의 견적 화폐는 KRW

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::client::{
    join_url, Api, ApiRequest, Credentials, ExchangeConfig, NonceGenerator, Session, Signer,
    Transport,
};
use crate::errors::{CcxtError, CcxtResult, ErrorKind, ExceptionTable};
use crate::types::{
    Action, Balance, Balances, DepositAddress, EndpointRoute, Exchange, ExchangeFeatures,
    ExchangeId, ExchangeUrls, Fee, HttpMethod, Market, MarketTable, Order, OrderBook,
    OrderRequest, OrderSide, OrderStatus, OrderType, Params, SignedRequest, Ticker, Trade,
    VenueDescriptor,
};
use crate::utils::crypto::{base64_encode, hmac_sha512_hex};
use crate::utils::parse::{
    build_order_book, check_address, fee_currency, filter_by_since_limit, parse_bids_asks,
    parse_side, parse_status, safe_balance, safe_currency_code, safe_order, safe_ticker,
    safe_trade, ParseContext,
};
use crate::utils::{
    safe_integer, safe_integer_product, safe_list, safe_string, safe_string_lower, safe_value,
    Precise,
};

const EXCEPTIONS: ExceptionTable = ExceptionTable::new(&[
    ("405", ErrorKind::OnMaintenance),
    ("104", ErrorKind::OrderNotFound),
    ("108", ErrorKind::BadSymbol),
    ("107", ErrorKind::BadRequest),
]);

static ROUTES: &[EndpointRoute] = &[
    EndpointRoute {
        action: Action::CreateOrder,
        side: Some(OrderSide::Buy),
        order_type: Some(OrderType::Limit),
        api: Api::Private,
        method: HttpMethod::Post,
        path: "order/limit_buy/",
    },
    EndpointRoute {
        action: Action::CreateOrder,
        side: Some(OrderSide::Sell),
        order_type: Some(OrderType::Limit),
        api: Api::Private,
        method: HttpMethod::Post,
        path: "order/limit_sell/",
    },
    EndpointRoute {
        action: Action::CancelOrder,
        side: None,
        order_type: None,
        api: Api::Private,
        method: HttpMethod::Post,
        path: "order/cancel/",
    },
];

const COMMON_CURRENCIES: &[(&str, &str)] = &[("SOC", "Soda Coin")];

/// bid/ask → buy/sell
const SIDES: &[(&str, &str)] = &[("bid", "buy"), ("ask", "sell")];

/// is_ask 플래그
const ASK_FLAGS: &[(&str, &str)] = &[("1", "sell"), ("0", "buy")];

const STATUSES: &[(&str, &str)] = &[
    ("live", "open"),
    ("partially_filled", "open"),
    ("filled", "closed"),
];

/// 잔고 응답의 메타데이터 키
const BALANCE_META_KEYS: &[&str] = &["errorCode", "result", "normalWallets"];

/// Coinone 요청 서명
///
/// Private calls carry their parameters as a base64 JSON payload, signed with
/// HMAC-SHA512 keyed by the upper-cased secret. The payload doubles as body.
#[derive(Debug, Clone)]
pub struct CoinoneSigner {
    public_url: String,
    private_url: String,
}

impl CoinoneSigner {
    pub fn new(urls: &ExchangeUrls) -> Self {
        Self {
            public_url: urls.public.clone(),
            private_url: urls.private.clone(),
        }
    }
}

impl Signer for CoinoneSigner {
    fn sign(
        &self,
        request: &ApiRequest,
        credentials: &Credentials,
        nonce: &NonceGenerator,
    ) -> CcxtResult<SignedRequest> {
        let (path, query) = request.params.implode_path(&request.path);
        match request.api {
            Api::Public => Ok(SignedRequest::new(
                request.method,
                join_url(&self.public_url, &path, &query),
            )),
            Api::Private => {
                let (api_key, secret) = credentials.check_required_credentials()?;
                let url = join_url(&self.private_url, &path, &Params::new());
                let payload = Params::new()
                    .with("access_token", api_key)
                    .with("nonce", nonce.next().to_string())
                    .merge(&request.params);
                let json = serde_json::to_string(&payload)?;
                let encoded = base64_encode(json.as_bytes());
                let signature = hmac_sha512_hex(&secret.to_uppercase(), &encoded)?;

                Ok(SignedRequest::new(request.method, url)
                    .with_header("Content-Type", "application/json")
                    .with_header("X-COINONE-PAYLOAD", encoded.clone())
                    .with_header("X-COINONE-SIGNATURE", signature)
                    .with_body(encoded))
            }
        }
    }
}

/// Coinone 거래소
pub struct Coinone {
    descriptor: VenueDescriptor,
    session: Session,
    transport: Arc<dyn Transport>,
    signer: CoinoneSigner,
}

impl Coinone {
    const BASE_URL: &'static str = "https://api.coinone.co.kr";
    const VERSION: &'static str = "v2";
    const RATE_LIMIT_MS: u64 = 667;
    const QUOTE_ID: &'static str = "krw";
    const TRADING_FEE: &'static str = "0.002";

    /// 새 Coinone 인스턴스 생성
    pub fn new(config: ExchangeConfig, transport: Arc<dyn Transport>) -> CcxtResult<Self> {
        let descriptor = Self::describe();
        let signer = CoinoneSigner::new(&descriptor.urls);
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
            fetch_order: true,
            fetch_open_orders: true,
            fetch_my_trades: true,
            fetch_deposit_addresses: true,
            ..Default::default()
        };

        let urls = ExchangeUrls {
            public: Self::BASE_URL.into(),
            private: format!("{}/{}", Self::BASE_URL, Self::VERSION),
            www: Some("https://coinone.co.kr".into()),
            doc: vec!["https://doc.coinone.co.kr".into()],
        };

        VenueDescriptor {
            id: ExchangeId::Coinone,
            name: "CoinOne",
            countries: &["KR"],
            version: Self::VERSION,
            rate_limit_ms: Self::RATE_LIMIT_MS,
            urls,
            has: features,
            exceptions: EXCEPTIONS,
            routes: ROUTES,
            common_currencies: COMMON_CURRENCIES,
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

    /// `ticker?currency=all` 응답에서 마켓 목록 추출
    ///
    /// Every key whose value carries a `currency` field is a base currency.
    pub fn parse_markets(response: &Value, ctx: ParseContext<'_>) -> Vec<Market> {
        let Some(tickers) = response.as_object() else {
            return Vec::new();
        };
        let Some(quote) = safe_currency_code(Some(Self::QUOTE_ID), ctx.aliases) else {
            return Vec::new();
        };
        tickers
            .iter()
            .filter(|(_, ticker)| safe_value(ticker, "currency").is_some())
            .filter_map(|(base_id, ticker)| {
                let base = safe_currency_code(Some(base_id.as_str()), ctx.aliases)?;
                let mut market = Market::spot(base_id, &base, &quote, base_id, Self::QUOTE_ID)
                    .with_fees(Some(Self::TRADING_FEE), Some(Self::TRADING_FEE))
                    .with_info(ticker.clone());
                market.active = None;
                Some(market)
            })
            .collect()
    }

    /// 티커 파싱 (`timestamp`는 초 단위)
    pub fn parse_ticker(ticker: &Value, ctx: ParseContext<'_>) -> Ticker {
        let last = safe_string(ticker, "last");
        safe_ticker(Ticker {
            symbol: ctx.safe_symbol(None, None),
            timestamp: safe_integer_product(ticker, "timestamp", 1000),
            high: safe_string(ticker, "high"),
            low: safe_string(ticker, "low"),
            open: safe_string(ticker, "first"),
            close: last.clone(),
            last,
            previous_close: safe_string(ticker, "yesterday_last"),
            base_volume: safe_string(ticker, "volume"),
            info: ticker.clone(),
            ..Default::default()
        })
    }

    /// 체결 파싱
    ///
    /// Public trades flag the taker side with `is_ask`; private fills use `type`.
    pub fn parse_trade(trade: &Value, ctx: ParseContext<'_>) -> Trade {
        let market = ctx.safe_market(None, None);
        let side = match safe_string(trade, "is_ask") {
            Some(flag) => parse_side(ASK_FLAGS, Some(flag.as_str())),
            None => parse_side(SIDES, safe_string(trade, "type").as_deref()),
        };
        let fee = safe_string(trade, "fee").map(|cost| {
            Fee::new(Some(cost), fee_currency(side, market.as_ref()))
                .with_rate(safe_string(trade, "feeRate"))
        });

        safe_trade(Trade {
            id: safe_string(trade, "id"),
            order: safe_string(trade, "orderId"),
            timestamp: safe_integer_product(trade, "timestamp", 1000),
            symbol: market.map(|m| m.symbol),
            side,
            price: safe_string(trade, "price"),
            amount: safe_string(trade, "qty"),
            fee,
            info: trade.clone(),
            ..Default::default()
        })
    }

    /// 주문 파싱
    ///
    /// A `live` order whose remaining quantity is below its amount has been
    /// partially filled and then canceled; Coinone keeps reporting it as live.
    pub fn parse_order(order: &Value, ctx: ParseContext<'_>) -> Order {
        let side = parse_side(SIDES, safe_string(order, "type").as_deref());
        let remaining = safe_string(order, "remainQty");
        let amount = safe_string(order, "qty");

        let mut raw_status = safe_string(order, "status");
        if raw_status.as_deref() == Some("live") {
            if let (Some(remaining), Some(amount)) = (&remaining, &amount) {
                if Precise::string_lt(remaining, amount).unwrap_or(false) {
                    raw_status = Some("canceled".to_string());
                }
            }
        }

        let market = match safe_string_lower(order, "currency") {
            Some(id) => ctx.markets.and_then(|m| m.by_id(&id)).cloned().or_else(|| {
                let base = safe_currency_code(Some(id.as_str()), ctx.aliases)?;
                let quote = safe_currency_code(Some(Self::QUOTE_ID), ctx.aliases)?;
                Some(Market::spot(&id, &base, &quote, &id, Self::QUOTE_ID))
            }),
            None => ctx.market.cloned(),
        };
        let fee = safe_string(order, "fee").map(|cost| {
            Fee::new(Some(cost), fee_currency(side, market.as_ref()))
                .with_rate(safe_string(order, "feeRate"))
        });

        safe_order(Order {
            id: safe_string(order, "orderId"),
            timestamp: safe_integer_product(order, "timestamp", 1000),
            status: parse_status(STATUSES, raw_status.as_deref()),
            symbol: market.map(|m| m.symbol),
            order_type: Some(OrderType::Limit),
            side,
            price: safe_string(order, "price"),
            amount,
            remaining,
            fee,
            info: order.clone(),
            ..Default::default()
        })
    }

    /// 잔고 파싱 (`avail` → free, `balance` → total)
    pub fn parse_balance(response: &Value, ctx: ParseContext<'_>) -> Balances {
        let mut result = Balances {
            info: response.clone(),
            ..Default::default()
        };
        if let Some(balances) = response.as_object() {
            for (currency_id, balance) in balances {
                if BALANCE_META_KEYS.contains(&currency_id.as_str()) {
                    continue;
                }
                if let Some(code) = safe_currency_code(Some(currency_id.as_str()), ctx.aliases) {
                    result.add(
                        code,
                        Balance::new(
                            safe_string(balance, "avail"),
                            None,
                            safe_string(balance, "balance"),
                        ),
                    );
                }
            }
        }
        safe_balance(result)
    }

    /// 입금 주소 파싱
    ///
    /// `walletAddress` maps `<currency>` to an address and `<currency>_tag` /
    /// `<currency>_memo` to its tag. Empty and `-1` entries are unassigned.
    pub fn parse_deposit_addresses(
        response: &Value,
        ctx: ParseContext<'_>,
    ) -> CcxtResult<BTreeMap<String, DepositAddress>> {
        let mut found: BTreeMap<String, (Option<String>, Option<String>)> = BTreeMap::new();
        let wallets = response
            .get("walletAddress")
            .and_then(Value::as_object)
            .into_iter()
            .flatten();
        for (key, value) in wallets {
            let Some(value) = value.as_str().filter(|v| !v.is_empty() && *v != "-1") else {
                continue;
            };
            let mut parts = key.split('_');
            let Some(code) = safe_currency_code(parts.next(), ctx.aliases) else {
                continue;
            };
            let entry = found.entry(code).or_default();
            match parts.next() {
                Some("tag") | Some("memo") => entry.1 = Some(value.to_string()),
                _ => entry.0 = Some(value.to_string()),
            }
        }

        let mut result = BTreeMap::new();
        for (code, (address, tag)) in found {
            let Some(address) = address else {
                continue;
            };
            check_address(&address)?;
            let deposit = match tag {
                Some(tag) => DepositAddress::new(&code, &address)
                    .with_info(json!([address, tag]))
                    .with_tag(tag),
                None => DepositAddress::new(&code, &address).with_info(json!(address)),
            };
            result.insert(code, deposit);
        }
        Ok(result)
    }
}

#[async_trait]
impl Exchange for Coinone {
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

    /// `result` must be present and equal to `success`
    fn handle_errors(&self, _status: u16, body: &Value) -> CcxtResult<()> {
        let feedback = format!("{} {}", self.id(), body);
        match body.get("result") {
            None => Err(CcxtError::ExchangeError { message: feedback }),
            Some(result) if result.as_str() == Some("success") => Ok(()),
            Some(_) => {
                let code = safe_string(body, "errorCode");
                Err(self
                    .descriptor
                    .exceptions
                    .throw_exactly_matched(code.as_deref(), feedback))
            }
        }
    }

    async fn fetch_markets(&self, params: Params) -> CcxtResult<Vec<Market>> {
        let request = Params::new().with("currency", "all").merge(&params);
        let response = self
            .request(ApiRequest::public_get("ticker/", request))
            .await?;
        let ctx = ParseContext::new(None, self.descriptor.common_currencies);
        let markets = Self::parse_markets(&response, ctx);
        debug!(exchange = %self.id(), count = markets.len(), "parsed markets");
        Ok(markets)
    }

    async fn fetch_ticker(&self, symbol: &str, params: Params) -> CcxtResult<Ticker> {
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("currency", market.id.as_str())
            .with("format", "json")
            .merge(&params);
        let response = self
            .request(ApiRequest::public_get("ticker/", request))
            .await?;
        Ok(Self::parse_ticker(&response, self.context(&markets, Some(market))))
    }

    async fn fetch_tickers(
        &self,
        symbols: Option<&[&str]>,
        params: Params,
    ) -> CcxtResult<BTreeMap<String, Ticker>> {
        let markets = self.load_markets(false).await?;
        let request = Params::new()
            .with("currency", "all")
            .with("format", "json")
            .merge(&params);
        let response = self
            .request(ApiRequest::public_get("ticker/", request))
            .await?;

        let timestamp = safe_integer_product(&response, "timestamp", 1000);
        let mut result = BTreeMap::new();
        for (id, raw) in response.as_object().into_iter().flatten() {
            let Some(market) = markets.by_id(id) else {
                continue;
            };
            if symbols.is_some_and(|wanted| !wanted.contains(&market.symbol.as_str())) {
                continue;
            }
            let mut ticker = Self::parse_ticker(raw, self.context(&markets, Some(market)));
            ticker.timestamp = timestamp;
            ticker.datetime = timestamp.and_then(crate::utils::time::iso8601);
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
            .with("currency", market.id.as_str())
            .with("format", "json")
            .merge(&params);
        let response = self
            .request(ApiRequest::public_get("orderbook/", request))
            .await?;

        let mut book = build_order_book(
            Some(market.symbol.clone()),
            parse_bids_asks(safe_list(&response, "bid"), "price", "qty"),
            parse_bids_asks(safe_list(&response, "ask"), "price", "qty"),
            safe_integer_product(&response, "timestamp", 1000),
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
            .with("currency", market.id.as_str())
            .with("format", "json")
            .merge(&params);
        let response = self
            .request(ApiRequest::public_get("trades/", request))
            .await?;

        let ctx = self.context(&markets, Some(market));
        let trades = safe_list(&response, "completeOrders")
            .iter()
            .map(|t| Self::parse_trade(t, ctx))
            .collect();
        Ok(filter_by_since_limit(trades, since, limit, |t| t.timestamp))
    }

    async fn fetch_balance(&self, params: Params) -> CcxtResult<Balances> {
        let markets = self.load_markets(false).await?;
        let response = self
            .request(ApiRequest::private_post("account/balance/", params))
            .await?;
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
            .with("price", price)
            .with("currency", market.id.as_str())
            .with("qty", order.amount_string())
            .merge(&order.params);
        let response = self.request(route.request(request)).await?;
        Ok(Self::parse_order(&response, self.context(&markets, Some(market))))
    }

    /// Coinone cancels by order id plus the original price, quantity and side
    /// (`price`, `qty`, `is_ask` in `params`).
    async fn cancel_order(&self, id: &str, symbol: Option<&str>, params: Params) -> CcxtResult<Order> {
        let symbol = self.require_symbol(symbol, "cancelOrder")?;
        let (Some(price), Some(qty), Some(is_ask)) = (
            params.get_string("price"),
            params.get_string("qty"),
            safe_integer(&params.to_value(), "is_ask"),
        ) else {
            return Err(CcxtError::arguments_required(format!(
                "{} cancelOrder() requires price, qty and is_ask params",
                self.id()
            )));
        };
        Precise::parse(&price)?;
        Precise::parse(&qty)?;
        let route = self.route(Action::CancelOrder, None, None)?;

        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("order_id", id)
            .with("price", price.as_str())
            .with("qty", qty.as_str())
            .with("is_ask", is_ask)
            .with("currency", market.id.as_str())
            .merge(&params);
        let response = self.request(route.request(request)).await?;

        Ok(safe_order(Order {
            id: Some(id.to_string()),
            status: Some(OrderStatus::Canceled),
            symbol: Some(market.symbol.clone()),
            order_type: Some(OrderType::Limit),
            side: parse_side(ASK_FLAGS, Some(is_ask.to_string().as_str())),
            price: Some(price),
            amount: Some(qty),
            info: response,
            ..Default::default()
        }))
    }

    async fn fetch_order(&self, id: &str, symbol: Option<&str>, params: Params) -> CcxtResult<Order> {
        let symbol = self.require_symbol(symbol, "fetchOrder")?;
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("order_id", id)
            .with("currency", market.id.as_str())
            .merge(&params);
        let response = self
            .request(ApiRequest::private_post("order/order_info/", request))
            .await?;

        // 주문 상태는 `info` 바깥에 온다
        let mut info = safe_value(&response, "info").cloned().unwrap_or_else(|| json!({}));
        if let (Some(obj), Some(status)) = (info.as_object_mut(), response.get("status")) {
            obj.entry("status").or_insert_with(|| status.clone());
        }
        Ok(Self::parse_order(&info, self.context(&markets, Some(market))))
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Order>> {
        let symbol = self.require_symbol(symbol, "fetchOpenOrders")?;
        let markets = self.load_markets(false).await?;
        let market = markets.market(symbol)?;
        let request = Params::new()
            .with("currency", market.id.as_str())
            .merge(&params);
        let response = self
            .request(ApiRequest::private_post("order/limit_orders/", request))
            .await?;

        let ctx = self.context(&markets, Some(market));
        let orders = safe_list(&response, "limitOrders")
            .iter()
            .map(|o| Self::parse_order(o, ctx))
            .collect();
        Ok(filter_by_since_limit(orders, since, limit, |o| o.timestamp))
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
            .with("currency", market.id.as_str())
            .merge(&params);
        let response = self
            .request(ApiRequest::private_post("order/complete_orders/", request))
            .await?;

        let ctx = self.context(&markets, Some(market));
        let trades = safe_list(&response, "completeOrders")
            .iter()
            .map(|t| Self::parse_trade(t, ctx))
            .collect();
        Ok(filter_by_since_limit(trades, since, limit, |t| t.timestamp))
    }

    async fn fetch_deposit_addresses(
        &self,
        codes: Option<&[&str]>,
        params: Params,
    ) -> CcxtResult<BTreeMap<String, DepositAddress>> {
        let markets = self.load_markets(false).await?;
        let response = self
            .request(ApiRequest::private_post("account/deposit_address/", params))
            .await?;
        let mut addresses = Self::parse_deposit_addresses(&response, self.context(&markets, None))?;
        if let Some(codes) = codes {
            addresses.retain(|code, _| codes.contains(&code.as_str()));
        }
        Ok(addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RawResponse;

    struct NoTransport;

    #[async_trait]
    impl Transport for NoTransport {
        async fn execute(&self, request: SignedRequest) -> CcxtResult<RawResponse> {
            Err(CcxtError::NetworkError {
                url: request.url,
                message: "offline".into(),
            })
        }
    }

    fn exchange() -> Coinone {
        let config = ExchangeConfig::new()
            .with_api_key("K")
            .with_api_secret("secret");
        Coinone::new(config, Arc::new(NoTransport)).unwrap()
    }

    fn xec_market() -> Market {
        Market::spot("xec", "XEC", "KRW", "xec", "krw")
    }

    #[test]
    fn test_exchange_info() {
        let exchange = exchange();
        assert_eq!(exchange.id(), ExchangeId::Coinone);
        assert_eq!(exchange.name(), "CoinOne");
        assert!(exchange.has().spot);
        assert!(!exchange.has().swap);
        assert!(exchange.has_feature("fetchDepositAddresses"));
        assert_eq!(exchange.urls().private, "https://api.coinone.co.kr/v2");
    }

    #[test]
    fn test_public_request_url() {
        let exchange = exchange();
        let request = ApiRequest::public_get(
            "orderbook/",
            Params::new().with("currency", "btc").with("format", "json"),
        );
        let signed = exchange
            .signer()
            .sign(&request, exchange.session().credentials(), exchange.session().nonce())
            .unwrap();
        assert_eq!(signed.method, HttpMethod::Get);
        assert_eq!(
            signed.url,
            "https://api.coinone.co.kr/orderbook/?currency=btc&format=json"
        );
        assert!(signed.headers.is_empty());
        assert!(signed.body.is_none());
    }

    #[test]
    fn test_private_request_signature() {
        let exchange = exchange();
        let request = ApiRequest::private_post("account/balance/", Params::new());
        let signed = exchange
            .signer()
            .sign(&request, exchange.session().credentials(), exchange.session().nonce())
            .unwrap();

        assert_eq!(signed.url, "https://api.coinone.co.kr/v2/account/balance/");
        let payload = signed.header("X-COINONE-PAYLOAD").unwrap();
        assert_eq!(signed.body.as_deref(), Some(payload));

        let expected = hmac_sha512_hex("SECRET", payload).unwrap();
        assert_eq!(signed.header("X-COINONE-SIGNATURE"), Some(expected.as_str()));
        assert_eq!(signed.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_private_request_requires_credentials() {
        let exchange = Coinone::new(ExchangeConfig::new(), Arc::new(NoTransport)).unwrap();
        let request = ApiRequest::private_post("account/balance/", Params::new());
        let err = exchange
            .signer()
            .sign(&request, exchange.session().credentials(), exchange.session().nonce())
            .unwrap_err();
        assert!(err.is_auth_error());
    }

    #[test]
    fn test_handle_errors() {
        let exchange = exchange();
        assert!(exchange
            .handle_errors(200, &json!({"result": "success", "errorCode": "0"}))
            .is_ok());

        let err = exchange
            .handle_errors(
                200,
                &json!({"result": "error", "errorCode": "104", "errorMsg": "Order id is not exist"}),
            )
            .unwrap_err();
        assert_eq!(err.code(), "ORDER_NOT_FOUND");
        assert!(err.to_string().contains("Order id is not exist"));

        let err = exchange
            .handle_errors(200, &json!({"errorCode": "405", "status": "maintenance"}))
            .unwrap_err();
        assert_eq!(err.code(), "EXCHANGE_ERROR");

        let err = exchange
            .handle_errors(200, &json!({"result": "error", "errorCode": "999"}))
            .unwrap_err();
        assert_eq!(err.code(), "EXCHANGE_ERROR");
    }

    #[test]
    fn test_parse_ticker() {
        let market = xec_market();
        let raw = json!({"first": "0.1069", "last": "0.0911", "high": "0.1069", "low": "0.09"});
        let ticker = Coinone::parse_ticker(&raw, ParseContext::default().with_market(Some(&market)));

        assert_eq!(ticker.symbol.as_deref(), Some("XEC/KRW"));
        assert_eq!(ticker.open.as_deref(), Some("0.1069"));
        assert_eq!(ticker.close.as_deref(), Some("0.0911"));
        assert_eq!(ticker.last.as_deref(), Some("0.0911"));
        assert_eq!(ticker.high.as_deref(), Some("0.1069"));
        assert_eq!(ticker.low.as_deref(), Some("0.09"));
        assert!(ticker.bid.is_none());
        assert!(ticker.ask.is_none());
        assert!(ticker.timestamp.is_none());
    }

    #[test]
    fn test_parse_ticker_out_of_range_exponent() {
        let raw = json!({"first": "1e-2147483648", "last": "1"});
        let ticker = Coinone::parse_ticker(&raw, ParseContext::default());
        assert!(ticker.open.is_none());
        assert_eq!(ticker.last.as_deref(), Some("1"));
        assert!(ticker.change.is_none());
    }

    #[test]
    fn test_parse_trade_sides() {
        let market = xec_market();
        let ctx = ParseContext::default().with_market(Some(&market));

        let sell = Coinone::parse_trade(
            &json!({"timestamp": "1416893212", "price": "420000.0", "qty": "0.1", "is_ask": "1"}),
            ctx,
        );
        assert_eq!(sell.side, Some(OrderSide::Sell));
        assert_eq!(sell.cost.as_deref(), Some("42000"));
        assert_eq!(sell.timestamp, Some(1_416_893_212_000));

        let buy = Coinone::parse_trade(
            &json!({"price": "2", "qty": "3", "type": "bid", "fee": "-0.0015", "feeRate": "-0.0005", "orderId": "abc"}),
            ctx,
        );
        assert_eq!(buy.side, Some(OrderSide::Buy));
        assert_eq!(buy.order.as_deref(), Some("abc"));
        let fee = buy.fee.unwrap();
        assert_eq!(fee.cost.as_deref(), Some("0.0015"));
        assert_eq!(fee.rate.as_deref(), Some("0.0005"));
        assert_eq!(fee.currency.as_deref(), Some("XEC"));

        let sell_fee = Coinone::parse_trade(
            &json!({"price": "2", "qty": "3", "type": "ask", "fee": "0.006", "feeRate": "0.001"}),
            ctx,
        );
        assert_eq!(sell_fee.side, Some(OrderSide::Sell));
        let fee = sell_fee.fee.unwrap();
        assert_eq!(fee.cost.as_deref(), Some("0.006"));
        assert_eq!(fee.currency.as_deref(), Some("KRW"));

        let unknown = Coinone::parse_trade(&json!({"is_ask": "2"}), ctx);
        assert!(unknown.side.is_none());
    }

    #[test]
    fn test_parse_order_live_partial_is_canceled() {
        let order = Coinone::parse_order(
            &json!({
                "orderId": "1",
                "status": "live",
                "type": "ask",
                "price": "100",
                "qty": "2",
                "remainQty": "0.5",
                "currency": "BTC",
                "timestamp": "1416561032"
            }),
            ParseContext::default(),
        );
        assert_eq!(order.status, Some(OrderStatus::Canceled));
        assert_eq!(order.side, Some(OrderSide::Sell));
        assert_eq!(order.symbol.as_deref(), Some("BTC/KRW"));
        assert_eq!(order.filled.as_deref(), Some("1.5"));

        let open = Coinone::parse_order(
            &json!({"status": "live", "qty": "2", "remainQty": "2"}),
            ParseContext::default(),
        );
        assert_eq!(open.status, Some(OrderStatus::Open));

        let partial = Coinone::parse_order(
            &json!({"status": "partially_filled", "qty": "2", "remainQty": "1"}),
            ParseContext::default(),
        );
        assert_eq!(partial.status, Some(OrderStatus::Open));
    }

    #[test]
    fn test_parse_balance_skips_metadata() {
        let balances = Coinone::parse_balance(
            &json!({
                "result": "success",
                "errorCode": "0",
                "normalWallets": [],
                "krw": {"avail": "700", "balance": "1000"},
                "soc": {"avail": "1", "balance": "1"}
            }),
            ParseContext::new(None, COMMON_CURRENCIES),
        );
        assert_eq!(balances.currencies.len(), 2);
        assert_eq!(balances.get("KRW").unwrap().used.as_deref(), Some("300"));
        assert!(balances.get("Soda Coin").is_some());
    }

    #[test]
    fn test_parse_deposit_addresses() {
        let addresses = Coinone::parse_deposit_addresses(
            &json!({
                "result": "success",
                "walletAddress": {
                    "btc": "3EbBiQ9ef4B6EMrcm9ccTcWqW8HcRbYNgf",
                    "xrp": "rp2diYfVtpbgEMyaoWnuaWgFCAkqCAEg28",
                    "xrp_tag": "3091276090",
                    "eos": "-1",
                    "eos_memo": "-1",
                    "etc": ""
                }
            }),
            ParseContext::default(),
        )
        .unwrap();

        assert_eq!(addresses.len(), 2);
        let xrp = &addresses["XRP"];
        assert_eq!(xrp.address, "rp2diYfVtpbgEMyaoWnuaWgFCAkqCAEg28");
        assert_eq!(xrp.tag.as_deref(), Some("3091276090"));
        assert!(addresses["BTC"].tag.is_none());
    }

    #[test]
    fn test_parse_markets() {
        let markets = Coinone::parse_markets(
            &json!({
                "result": "success",
                "timestamp": "1644537600",
                "btc": {"currency": "btc", "last": "50000000"},
                "xec": {"currency": "xec", "last": "0.09"}
            }),
            ParseContext::default(),
        );
        let symbols: Vec<_> = markets.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(symbols, ["BTC/KRW", "XEC/KRW"]);
        assert_eq!(markets[0].quote_id, "krw");
        assert!(markets[0].active.is_none());
        assert_eq!(markets[0].taker.as_deref(), Some("0.002"));
    }

    #[test]
    fn test_parse_markets_is_idempotent() {
        let raw = json!({
            "result": "success",
            "btc": {"currency": "btc", "last": "50000000"},
            "xec": {"currency": "xec", "last": "0.09"}
        });
        let first = Coinone::parse_markets(&raw, ParseContext::default());
        let second = Coinone::parse_markets(&raw, ParseContext::default());
        assert_eq!(first, second);

        let table = MarketTable::new(first);
        assert_eq!(table, MarketTable::new(second));
        assert_eq!(table.market("XEC/KRW").unwrap().id, "xec");
    }

    #[tokio::test]
    async fn test_market_orders_not_supported() {
        let exchange = exchange();
        let err = exchange
            .create_order(OrderRequest::market("BTC/KRW", OrderSide::Buy, rust_decimal_macros::dec!(1)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_SUPPORTED");
    }
}
