//! Connector session
//!
//! Owns everything a connector mutates across calls: credentials, the nonce
//! counter and the market cache. The cache is loaded at most once; callers that
//! arrive while a load is in flight wait for it instead of issuing their own.

use std::future::Future;
use std::sync::{Arc, RwLock};

use tokio::sync::OnceCell;
use tracing::debug;

use super::{Credentials, ExchangeConfig, NonceGenerator};
use crate::errors::CcxtResult;
use crate::types::MarketTable;

type MarketCell = Arc<OnceCell<Arc<MarketTable>>>;

/// Per-connector session state
#[derive(Debug)]
pub struct Session {
    config: ExchangeConfig,
    nonce: NonceGenerator,
    markets: RwLock<MarketCell>,
}

impl Session {
    pub fn new(config: ExchangeConfig) -> Self {
        Self {
            config,
            nonce: NonceGenerator::new(),
            markets: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        self.config.credentials()
    }

    pub fn nonce(&self) -> &NonceGenerator {
        &self.nonce
    }

    fn current_cell(&self) -> MarketCell {
        let guard = self.markets.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Cached markets, if a load has completed
    pub fn markets(&self) -> Option<Arc<MarketTable>> {
        self.current_cell().get().cloned()
    }

    /// Populate the cache with `loader` unless already loaded
    ///
    /// A failed load leaves the cache empty, so the next call retries.
    pub async fn load_markets<F, Fut>(&self, reload: bool, loader: F) -> CcxtResult<Arc<MarketTable>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CcxtResult<MarketTable>>,
    {
        if reload {
            self.invalidate_markets();
        }
        let cell = self.current_cell();
        let table = cell
            .get_or_try_init(|| async {
                let table = loader().await?;
                debug!(markets = table.len(), "market cache loaded");
                Ok::<_, crate::errors::CcxtError>(Arc::new(table))
            })
            .await?;
        Ok(Arc::clone(table))
    }

    /// Drop the cached markets; the next `load_markets` fetches again
    pub fn invalidate_markets(&self) {
        let mut guard = self.markets.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(OnceCell::new());
        debug!("market cache invalidated");
    }
}
