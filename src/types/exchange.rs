//! Exchange trait - Unified exchange interface
//!
//! Every connector implements the same call pipeline:
//! `BuildRequest -> Sign -> Transmit -> Classify -> Normalize`.
//! Only `Transmit` suspends; it is delegated to the caller's `Transport`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    Balances, DepositAddress, Market, MarketTable, Order, OrderBook, OrderRequest, OrderSide,
    OrderType, Params, Ticker, Trade, TradingFee, Transaction,
};
use crate::client::{Api, ApiRequest, RawResponse, Session, Signer, Transport};
use crate::errors::{CcxtError, CcxtResult, ExceptionTable};
use crate::utils::parse::safe_currency_code;

/// Exchange ID - identifies the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    Coinone,
    Coinspot,
    Bitflyer,
}

impl ExchangeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Coinone => "coinone",
            ExchangeId::Coinspot => "coinspot",
            ExchangeId::Bitflyer => "bitflyer",
        }
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Exchange feature flags - indicates supported functionality
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeFeatures {
    // === Market Types ===
    pub spot: bool,
    pub margin: bool,
    pub swap: bool,
    pub future: bool,
    pub option: bool,

    // === Public API ===
    pub fetch_markets: bool,
    pub fetch_ticker: bool,
    pub fetch_tickers: bool,
    pub fetch_order_book: bool,
    pub fetch_trades: bool,

    // === Private Trading API ===
    pub fetch_balance: bool,
    pub create_order: bool,
    pub cancel_order: bool,
    pub fetch_order: bool,
    pub fetch_orders: bool,
    pub fetch_open_orders: bool,
    pub fetch_closed_orders: bool,
    pub fetch_my_trades: bool,
    pub fetch_trading_fee: bool,

    // === Account/Wallet ===
    pub fetch_deposits: bool,
    pub fetch_withdrawals: bool,
    pub fetch_deposit_addresses: bool,
    pub withdraw: bool,

    // === Derivatives ===
    pub fetch_positions: bool,
}

/// 거래소 URL 정보
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeUrls {
    /// Public API base
    pub public: String,
    /// Private API base
    pub private: String,
    pub www: Option<String>,
    pub doc: Vec<String>,
}

impl ExchangeUrls {
    /// Base URL for an API section
    pub fn api(&self, api: Api) -> &str {
        match api {
            Api::Public => &self.public,
            Api::Private => &self.private,
        }
    }
}

/// HTTP 메서드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 서명된 요청
///
/// The only artifact the transport needs. `Debug` lists header names but not
/// their values, which carry keys and signatures.
#[derive(Clone, PartialEq)]
pub struct SignedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl SignedRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

impl fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body", &self.body.as_ref().map(|b| b.len()))
            .finish()
    }
}

/// Operations that dispatch to side/type specific endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateOrder,
    CancelOrder,
    FetchPositions,
}

/// One row of a venue's endpoint table
///
/// `side` / `order_type` of `None` match any value.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointRoute {
    pub action: Action,
    pub side: Option<OrderSide>,
    pub order_type: Option<OrderType>,
    pub api: Api,
    pub method: HttpMethod,
    pub path: &'static str,
}

impl EndpointRoute {
    fn matches(&self, action: Action, side: Option<OrderSide>, order_type: Option<&OrderType>) -> bool {
        self.action == action
            && self.side.map_or(true, |s| Some(s) == side)
            && self
                .order_type
                .as_ref()
                .map_or(true, |t| Some(t) == order_type)
    }

    /// Unsigned request for this endpoint
    pub fn request(&self, params: Params) -> ApiRequest {
        ApiRequest::new(self.api, self.method, self.path, params)
    }
}

/// First matching route, or `NotSupported`
pub fn find_route<'a>(
    routes: &'a [EndpointRoute],
    action: Action,
    side: Option<OrderSide>,
    order_type: Option<&OrderType>,
) -> CcxtResult<&'a EndpointRoute> {
    routes
        .iter()
        .find(|r| r.matches(action, side, order_type))
        .ok_or_else(|| {
            let mut feature = format!("{action:?}");
            if let Some(side) = side {
                feature.push_str(&format!(" {side}"));
            }
            if let Some(t) = order_type {
                feature.push_str(&format!(" {t}"));
            }
            CcxtError::NotSupported { feature }
        })
}

/// Static per-venue configuration, immutable for the session
#[derive(Debug, Clone)]
pub struct VenueDescriptor {
    pub id: ExchangeId,
    pub name: &'static str,
    pub countries: &'static [&'static str],
    pub version: &'static str,
    /// Minimum delay between requests the venue asks for (ms)
    pub rate_limit_ms: u64,
    pub urls: ExchangeUrls,
    pub has: ExchangeFeatures,
    pub exceptions: ExceptionTable,
    pub routes: &'static [EndpointRoute],
    /// Venue currency id → common code
    pub common_currencies: &'static [(&'static str, &'static str)],
    pub taker_fee: Option<&'static str>,
    pub maker_fee: Option<&'static str>,
}

fn not_supported<T>(feature: &str) -> CcxtResult<T> {
    Err(CcxtError::NotSupported {
        feature: feature.to_string(),
    })
}

/// 거래소 통합 인터페이스
#[async_trait]
pub trait Exchange: Send + Sync {
    // === 구성 요소 ===

    fn descriptor(&self) -> &VenueDescriptor;

    fn session(&self) -> &Session;

    fn transport(&self) -> &dyn Transport;

    fn signer(&self) -> &dyn Signer;

    // === 메타데이터 ===

    /// 거래소 ID
    fn id(&self) -> ExchangeId {
        self.descriptor().id
    }

    /// 거래소 이름
    fn name(&self) -> &str {
        self.descriptor().name
    }

    /// 지원 기능
    fn has(&self) -> &ExchangeFeatures {
        &self.descriptor().has
    }

    /// 특정 기능 지원 여부
    fn has_feature(&self, feature: &str) -> bool {
        let features = self.has();
        match feature {
            "fetchMarkets" => features.fetch_markets,
            "fetchTicker" => features.fetch_ticker,
            "fetchTickers" => features.fetch_tickers,
            "fetchOrderBook" => features.fetch_order_book,
            "fetchTrades" => features.fetch_trades,
            "fetchBalance" => features.fetch_balance,
            "createOrder" => features.create_order,
            "cancelOrder" => features.cancel_order,
            "fetchOrder" => features.fetch_order,
            "fetchOrders" => features.fetch_orders,
            "fetchOpenOrders" => features.fetch_open_orders,
            "fetchClosedOrders" => features.fetch_closed_orders,
            "fetchMyTrades" => features.fetch_my_trades,
            "fetchTradingFee" => features.fetch_trading_fee,
            "fetchDeposits" => features.fetch_deposits,
            "fetchWithdrawals" => features.fetch_withdrawals,
            "fetchDepositAddresses" => features.fetch_deposit_addresses,
            "withdraw" => features.withdraw,
            "fetchPositions" => features.fetch_positions,
            _ => false,
        }
    }

    /// URL 정보
    fn urls(&self) -> &ExchangeUrls {
        &self.descriptor().urls
    }

    /// Common currency code for a venue currency id
    fn safe_currency_code(&self, currency_id: Option<&str>) -> Option<String> {
        safe_currency_code(currency_id, self.descriptor().common_currencies)
    }

    /// Endpoint for a side/type specific action
    fn route(
        &self,
        action: Action,
        side: Option<OrderSide>,
        order_type: Option<&OrderType>,
    ) -> CcxtResult<&EndpointRoute> {
        find_route(self.descriptor().routes, action, side, order_type)
    }

    // === 요청 파이프라인 ===

    /// Venue-level failure detection on a parsed body
    ///
    /// Runs before the HTTP-status fallback and before any normalization.
    fn handle_errors(&self, status: u16, body: &Value) -> CcxtResult<()> {
        let _ = (status, body);
        Ok(())
    }

    /// Sign, transmit and classify one request; returns the success payload
    async fn request(&self, request: ApiRequest) -> CcxtResult<Value> {
        let session = self.session();
        let signed = self
            .signer()
            .sign(&request, session.credentials(), session.nonce())?;
        debug!(
            exchange = %self.id(),
            api = %request.api,
            method = %signed.method,
            url = %signed.url,
            "sending request"
        );

        let response: RawResponse = self.transport().execute(signed).await?;
        let body = response.parsed_body();

        if let Some(body) = &body {
            if let Err(err) = self.handle_errors(response.status, body) {
                warn!(exchange = %self.id(), status = response.status, code = err.code(), "venue reported failure");
                return Err(err);
            }
        }
        if let Some(err) = ExceptionTable::classify_http(response.status, response.body.clone()) {
            warn!(exchange = %self.id(), status = response.status, code = err.code(), "http failure");
            return Err(err);
        }

        match body {
            Some(body) => Ok(body),
            // empty acknowledgement
            None if response.body.trim().is_empty() => Ok(Value::Null),
            None => Err(CcxtError::BadResponse {
                message: format!("{} returned a non-JSON body", self.id()),
            }),
        }
    }

    // === 마켓 ===

    /// 마켓 목록 조회 (uncached)
    async fn fetch_markets(&self, params: Params) -> CcxtResult<Vec<Market>>;

    /// 마켓 로드 (세션 캐시, 최대 1회)
    async fn load_markets(&self, reload: bool) -> CcxtResult<Arc<MarketTable>> {
        self.session()
            .load_markets(reload, || async {
                let markets = self.fetch_markets(Params::new()).await?;
                Ok(MarketTable::new(markets))
            })
            .await
    }

    /// Market for a unified symbol, loading markets first if needed
    async fn market(&self, symbol: &str) -> CcxtResult<Market> {
        let markets = self.load_markets(false).await?;
        markets.market(symbol).cloned()
    }

    // === Public API ===

    /// 시세 조회
    async fn fetch_ticker(&self, symbol: &str, params: Params) -> CcxtResult<Ticker> {
        let _ = (symbol, params);
        not_supported("fetchTicker")
    }

    /// 복수 시세 조회
    async fn fetch_tickers(
        &self,
        symbols: Option<&[&str]>,
        params: Params,
    ) -> CcxtResult<BTreeMap<String, Ticker>> {
        let _ = (symbols, params);
        not_supported("fetchTickers")
    }

    /// 호가창 조회
    async fn fetch_order_book(
        &self,
        symbol: &str,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<OrderBook> {
        let _ = (symbol, limit, params);
        not_supported("fetchOrderBook")
    }

    /// 체결 내역 조회
    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Trade>> {
        let _ = (symbol, since, limit, params);
        not_supported("fetchTrades")
    }

    // === Private API ===

    /// 잔고 조회
    async fn fetch_balance(&self, params: Params) -> CcxtResult<Balances> {
        let _ = params;
        not_supported("fetchBalance")
    }

    /// 주문 생성
    async fn create_order(&self, request: OrderRequest) -> CcxtResult<Order> {
        let _ = request;
        not_supported("createOrder")
    }

    /// 주문 취소
    async fn cancel_order(&self, id: &str, symbol: Option<&str>, params: Params) -> CcxtResult<Order> {
        let _ = (id, symbol, params);
        not_supported("cancelOrder")
    }

    /// 주문 조회
    async fn fetch_order(&self, id: &str, symbol: Option<&str>, params: Params) -> CcxtResult<Order> {
        let _ = (id, symbol, params);
        not_supported("fetchOrder")
    }

    /// 주문 목록
    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Order>> {
        let _ = (symbol, since, limit, params);
        not_supported("fetchOrders")
    }

    /// 미체결 주문 목록
    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Order>> {
        let _ = (symbol, since, limit, params);
        not_supported("fetchOpenOrders")
    }

    /// 체결 완료 주문 목록
    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Order>> {
        let _ = (symbol, since, limit, params);
        not_supported("fetchClosedOrders")
    }

    /// 내 체결 내역
    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Trade>> {
        let _ = (symbol, since, limit, params);
        not_supported("fetchMyTrades")
    }

    /// 거래 수수료 조회
    async fn fetch_trading_fee(&self, symbol: &str, params: Params) -> CcxtResult<TradingFee> {
        let _ = (symbol, params);
        not_supported("fetchTradingFee")
    }

    // === 입출금 ===

    /// 입금 주소 목록
    async fn fetch_deposit_addresses(
        &self,
        codes: Option<&[&str]>,
        params: Params,
    ) -> CcxtResult<BTreeMap<String, DepositAddress>> {
        let _ = (codes, params);
        not_supported("fetchDepositAddresses")
    }

    /// 입금 내역
    async fn fetch_deposits(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Transaction>> {
        let _ = (code, since, limit, params);
        not_supported("fetchDeposits")
    }

    /// 출금 내역
    async fn fetch_withdrawals(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: Params,
    ) -> CcxtResult<Vec<Transaction>> {
        let _ = (code, since, limit, params);
        not_supported("fetchWithdrawals")
    }

    /// 출금
    async fn withdraw(
        &self,
        code: &str,
        amount: Decimal,
        address: &str,
        tag: Option<&str>,
        params: Params,
    ) -> CcxtResult<Transaction> {
        let _ = (code, amount, address, tag, params);
        not_supported("withdraw")
    }

    /// 포지션 조회, 원본 레코드 그대로
    async fn fetch_positions(&self, symbols: Option<&[&str]>, params: Params) -> CcxtResult<Vec<Value>> {
        let _ = (symbols, params);
        not_supported("fetchPositions")
    }
}
