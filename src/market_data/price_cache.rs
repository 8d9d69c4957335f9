use chrono::Utc;
use dashmap::DashMap;
use log::{debug, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::settings::CollectorSettings;

use super::market_data_provider::{with_provider_timeout, MarketDataProvider};
use super::market_data_traits::PriceHistoryRepositoryTrait;
use super::MarketDataError;

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    price: f64,
    fetched_at: Instant,
}

/// Read-through cache for current prices, keyed by asset id.
///
/// All callers that need "the current price" go through here instead of
/// reading an ad-hoc column, so staleness is decided in exactly one
/// place. Entries older than the configured TTL are re-fetched from the
/// provider on the next read.
pub struct PriceCache {
    provider: Arc<dyn MarketDataProvider>,
    history: Arc<dyn PriceHistoryRepositoryTrait>,
    entries: DashMap<String, CachedPrice>,
    ttl: Duration,
    provider_timeout_secs: u64,
}

impl PriceCache {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        history: Arc<dyn PriceHistoryRepositoryTrait>,
        settings: &CollectorSettings,
    ) -> Self {
        Self {
            provider,
            history,
            entries: DashMap::new(),
            ttl: Duration::from_secs(settings.price_ttl_secs),
            provider_timeout_secs: settings.provider_timeout_secs,
        }
    }

    /// Fresh cached price, if any.
    pub fn get(&self, asset_id: &str) -> Option<f64> {
        self.entries
            .get(asset_id)
            .filter(|entry| entry.fetched_at.elapsed() <= self.ttl)
            .map(|entry| entry.price)
    }

    /// Seed the cache with a price obtained elsewhere (e.g. the realtime
    /// price feed).
    pub fn prime(&self, asset_id: &str, price: f64) {
        self.entries.insert(
            asset_id.to_string(),
            CachedPrice {
                price,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, asset_id: &str) {
        self.entries.remove(asset_id);
    }

    /// Return a fresh cached price, fetching from the provider when the
    /// entry is missing or stale. A successful fetch is also recorded as
    /// today's observation in the price history log.
    pub async fn get_or_fetch(
        &self,
        asset_id: &str,
        symbol: &str,
        asset_class: Option<&str>,
    ) -> Result<f64, MarketDataError> {
        if let Some(price) = self.get(asset_id) {
            debug!("Price cache hit for {}", asset_id);
            return Ok(price);
        }

        let price = with_provider_timeout(
            self.provider_timeout_secs,
            self.provider.get_current_price(symbol, asset_class),
        )
        .await?;

        if !price.is_finite() || price <= 0.0 {
            return Err(MarketDataError::InvalidData(format!(
                "Provider returned unusable price {} for {}",
                price, symbol
            )));
        }

        self.prime(asset_id, price);

        // The history write rides along with the fetch; losing it costs
        // one observation, not the caller's price.
        if let Err(e) = self
            .history
            .upsert_point(asset_id, Utc::now().date_naive(), price)
        {
            warn!("Failed to record live price for {}: {}", asset_id, e);
        }

        Ok(price)
    }
}
