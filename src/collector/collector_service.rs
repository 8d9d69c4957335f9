use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::backfill::{BackfillJob, BackfillRepository, BackfillService};
use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::holdings::HoldingsRepository;
use crate::ledger::RunLedgerRepository;
use crate::maintenance::{
    CleanupSummary, CollectorStats, MaintenanceRepository, MaintenanceService,
};
use crate::market_data::{
    LookbackRange, MarketDataError, MarketDataProvider, PriceCache, PriceHistoryRepository,
    PriceHistoryRepositoryTrait,
};
use crate::settings::CollectorSettings;
use crate::snapshot::{
    PortfolioSnapshot, SnapshotOutcome, SnapshotRepository, SnapshotService,
};

/// Entry point for the data-collection core.
///
/// Owns the repositories, the price cache, and the domain services, and
/// exposes the handful of operations callers drive: the daily snapshot
/// run, the backfill queue, live price ingestion, and maintenance.
pub struct CollectorService {
    snapshot_service: SnapshotService,
    backfill_service: BackfillService,
    maintenance_service: MaintenanceService,
    price_cache: Arc<PriceCache>,
    history: Arc<dyn PriceHistoryRepositoryTrait>,
}

impl CollectorService {
    pub fn new(
        pool: Arc<DbPool>,
        provider: Arc<dyn MarketDataProvider>,
        settings: CollectorSettings,
    ) -> Self {
        let ledger = Arc::new(RunLedgerRepository::new(pool.clone()));
        let holdings = Arc::new(HoldingsRepository::new(pool.clone()));
        let snapshots = Arc::new(SnapshotRepository::new(pool.clone()));
        let history: Arc<dyn PriceHistoryRepositoryTrait> =
            Arc::new(PriceHistoryRepository::new(pool.clone()));
        let backfills = Arc::new(BackfillRepository::new(pool.clone()));
        let maintenance = Arc::new(MaintenanceRepository::new(pool));

        let price_cache = Arc::new(PriceCache::new(
            provider.clone(),
            history.clone(),
            &settings,
        ));

        let snapshot_service = SnapshotService::new(
            ledger,
            holdings.clone(),
            snapshots.clone(),
            price_cache.clone(),
            provider.clone(),
            settings.clone(),
        );
        let backfill_service = BackfillService::new(
            backfills,
            holdings,
            history.clone(),
            provider,
            settings.clone(),
        );
        let maintenance_service =
            MaintenanceService::new(maintenance, snapshots, history.clone(), settings);

        Self {
            snapshot_service,
            backfill_service,
            maintenance_service,
            price_cache,
            history,
        }
    }

    /// Record today's portfolio snapshot for the owner, at most once per
    /// UTC day.
    pub async fn run_daily_snapshot(&self, owner_id: &str) -> Result<SnapshotOutcome> {
        self.snapshot_service.record_daily_snapshot(owner_id).await
    }

    pub fn get_snapshots(&self, owner_id: &str) -> Result<Vec<PortfolioSnapshot>> {
        self.snapshot_service.get_snapshots(owner_id)
    }

    /// Enqueue a historical-data request; duplicates return the existing
    /// job.
    pub fn request_backfill(
        &self,
        owner_id: &str,
        asset_id: &str,
        lookback: LookbackRange,
    ) -> Result<BackfillJob> {
        self.backfill_service
            .request_backfill(owner_id, asset_id, lookback)
    }

    /// Process every queued backfill job for the owner.
    pub async fn run_queued_backfills(&self, owner_id: &str) -> Result<Vec<BackfillJob>> {
        self.backfill_service.drain_queued_backfills(owner_id).await
    }

    pub fn retry_backfill(&self, job_id: &str) -> Result<BackfillJob> {
        self.backfill_service.retry_failed_backfill(job_id)
    }

    pub fn get_backfill_job(&self, job_id: &str) -> Result<Option<BackfillJob>> {
        self.backfill_service.get_job(job_id)
    }

    /// Ingest a price observed outside the scheduled collection paths
    /// (e.g. a realtime feed). The point lands in the history log and
    /// primes the cache so the next valuation reuses it.
    pub fn record_live_price(&self, asset_id: &str, price: f64) -> Result<()> {
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::MarketData(MarketDataError::InvalidData(format!(
                "Unusable live price {} for {}",
                price, asset_id
            ))));
        }

        self.history
            .upsert_point(asset_id, Utc::now().date_naive(), price)?;
        self.price_cache.prime(asset_id, price);
        info!("Live price {} recorded for {}", price, asset_id);
        Ok(())
    }

    pub fn cleanup_old_data(&self, owner_id: &str, retention_days: i64) -> Result<CleanupSummary> {
        self.maintenance_service
            .cleanup_old_data(owner_id, retention_days)
    }

    pub fn get_collector_stats(&self, owner_id: &str) -> Result<CollectorStats> {
        self.maintenance_service.get_collector_stats(owner_id)
    }
}
