use chrono::{NaiveDate, Utc};
use log::{debug, error, warn};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::errors::{Error, Result, ValidationError};
use crate::holdings::HoldingsRepositoryTrait;
use crate::ledger::{RunLedgerRepositoryTrait, RunStatus, StartRun, RUN_TYPE_DAILY_SNAPSHOT};
use crate::market_data::market_data_provider::with_provider_timeout;
use crate::market_data::{MarketDataProvider, PriceCache};
use crate::settings::CollectorSettings;

use super::snapshot_model::{
    NewPortfolioSnapshot, PortfolioSnapshot, SnapshotOutcome, BASE_CURRENCY,
};
use super::snapshot_traits::SnapshotRepositoryTrait;

/// Computes and persists one portfolio valuation point per day.
pub struct SnapshotService {
    ledger: Arc<dyn RunLedgerRepositoryTrait>,
    holdings: Arc<dyn HoldingsRepositoryTrait>,
    snapshots: Arc<dyn SnapshotRepositoryTrait>,
    price_cache: Arc<PriceCache>,
    provider: Arc<dyn MarketDataProvider>,
    settings: CollectorSettings,
}

impl SnapshotService {
    pub fn new(
        ledger: Arc<dyn RunLedgerRepositoryTrait>,
        holdings: Arc<dyn HoldingsRepositoryTrait>,
        snapshots: Arc<dyn SnapshotRepositoryTrait>,
        price_cache: Arc<PriceCache>,
        provider: Arc<dyn MarketDataProvider>,
        settings: CollectorSettings,
    ) -> Self {
        Self {
            ledger,
            holdings,
            snapshots,
            price_cache,
            provider,
            settings,
        }
    }

    /// Record today's portfolio valuation for the owner.
    ///
    /// The ledger guard runs before any provider or holdings work, so a
    /// duplicate trigger returns `AlreadyRecorded` without side effects.
    /// Once a run is started it is always finalized: `success` together
    /// with the snapshot insert, `failed` with the error message before
    /// the error propagates.
    pub async fn record_daily_snapshot(&self, owner_id: &str) -> Result<SnapshotOutcome> {
        // UTC calendar date keeps the run key deterministic across hosts.
        let today = Utc::now().date_naive();
        let run_key = today.format("%Y-%m-%d").to_string();

        let run = match self
            .ledger
            .try_start_run(owner_id, RUN_TYPE_DAILY_SNAPSHOT, &run_key)?
        {
            StartRun::Started(run) => run,
            StartRun::AlreadyRun => {
                debug!("Snapshot for {} already recorded on {}", owner_id, run_key);
                return Ok(SnapshotOutcome::AlreadyRecorded);
            }
        };

        let new_snapshot = match self.compute_valuation(owner_id, today).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // The valuation error is the one the caller needs; a
                // finalize failure on top of it is only logged.
                if let Err(finish_err) =
                    self.ledger
                        .finish_run(&run.id, RunStatus::Failed, Some(&e.to_string()))
                {
                    error!("Failed to finalize run {}: {}", run.id, finish_err);
                }
                return Err(e);
            }
        };

        match self.snapshots.insert_with_run_completion(&new_snapshot, &run.id) {
            Ok(snapshot) => Ok(SnapshotOutcome::Recorded(snapshot)),
            Err(e) => {
                // Close the run before surfacing the persistence failure
                // to keep the stuck-run window as small as possible.
                if let Err(finish_err) =
                    self.ledger
                        .finish_run(&run.id, RunStatus::Failed, Some(&e.to_string()))
                {
                    error!("Failed to finalize run {}: {}", run.id, finish_err);
                }
                Err(e)
            }
        }
    }

    async fn compute_valuation(
        &self,
        owner_id: &str,
        today: NaiveDate,
    ) -> Result<NewPortfolioSnapshot> {
        let positions = self.holdings.get_holdings_with_assets(owner_id)?;
        let fx_rate = self.resolve_fx_rate().await;

        let mut total_value = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;

        for position in &positions {
            let price = match self
                .price_cache
                .get_or_fetch(
                    &position.asset_id,
                    &position.symbol,
                    position.asset_class.as_deref(),
                )
                .await
            {
                Ok(price) => price,
                Err(e) => {
                    // One unpriceable holding drops out of the total;
                    // the rest of the valuation still lands.
                    warn!(
                        "Excluding holding {} from snapshot: {}",
                        position.asset_id, e
                    );
                    continue;
                }
            };

            let quantity = to_decimal(position.quantity, "quantity", &position.asset_id)?;
            let unit_cost = to_decimal(position.average_cost, "average cost", &position.asset_id)?;
            let unit_price = to_decimal(price, "price", &position.asset_id)?;

            let mut value = quantity * unit_price;
            let mut cost = quantity * unit_cost;
            if position.currency != BASE_CURRENCY {
                value /= fx_rate;
                cost /= fx_rate;
            }

            total_value += value;
            total_cost += cost;
        }

        Ok(NewPortfolioSnapshot {
            owner_id: owner_id.to_string(),
            snapshot_date: today,
            total_value_usd: total_value.to_f64().unwrap_or(0.0),
            total_cost_usd: total_cost.to_f64().unwrap_or(0.0),
            total_pnl_usd: (total_value - total_cost).to_f64().unwrap_or(0.0),
            fx_rate: fx_rate.to_f64().unwrap_or(0.0),
        })
    }

    /// Current local-per-USD rate, falling back to the configured default
    /// when the provider is unreachable or returns garbage. A stale rate
    /// still produces a valuation; aborting would produce none.
    async fn resolve_fx_rate(&self) -> Decimal {
        let fetched = with_provider_timeout(
            self.settings.provider_timeout_secs,
            self.provider.get_fx_rate(),
        )
        .await;

        match fetched {
            Ok(rate) if rate.is_finite() && rate > 0.0 => {
                Decimal::from_f64(rate).unwrap_or(self.settings.fallback_fx_rate)
            }
            Ok(rate) => {
                warn!(
                    "Provider returned unusable FX rate {}; using fallback {}",
                    rate, self.settings.fallback_fx_rate
                );
                self.settings.fallback_fx_rate
            }
            Err(e) => {
                warn!(
                    "FX rate fetch failed ({}); using fallback {}",
                    e, self.settings.fallback_fx_rate
                );
                self.settings.fallback_fx_rate
            }
        }
    }

    pub fn get_snapshots(&self, owner_id: &str) -> Result<Vec<PortfolioSnapshot>> {
        self.snapshots.get_snapshots(owner_id)
    }
}

fn to_decimal(value: f64, field: &str, asset_id: &str) -> Result<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| {
        Error::Validation(ValidationError::InvalidInput(format!(
            "Non-finite {} for asset {}",
            field, asset_id
        )))
    })
}
