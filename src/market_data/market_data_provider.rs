use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use super::market_data_model::{LookbackRange, PricePoint};
use super::MarketDataError;

/// Consumed market-data capability. The concrete integration (HTTP
/// transport, vendor quirks) lives with the host application; the
/// collection jobs only see this trait.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Current local-currency units per USD.
    async fn get_fx_rate(&self) -> Result<f64, MarketDataError>;

    /// Current price for one symbol.
    async fn get_current_price(
        &self,
        symbol: &str,
        asset_class: Option<&str>,
    ) -> Result<f64, MarketDataError>;

    /// Historical daily closing prices over the requested window. The
    /// returned series may contain invalid entries for individual days.
    async fn get_historical_daily_prices(
        &self,
        symbol: &str,
        range: LookbackRange,
    ) -> Result<Vec<PricePoint>, MarketDataError>;
}

/// Bounds a provider call so one unreachable upstream cannot block a
/// drain loop indefinitely.
pub(crate) async fn with_provider_timeout<T, F>(
    timeout_secs: u64,
    fut: F,
) -> Result<T, MarketDataError>
where
    F: Future<Output = Result<T, MarketDataError>> + Send,
{
    tokio::time::timeout(Duration::from_secs(timeout_secs), fut)
        .await
        .unwrap_or_else(|_| Err(MarketDataError::Timeout(timeout_secs)))
}
