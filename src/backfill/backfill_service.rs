use log::{debug, info, warn};
use std::sync::Arc;

use crate::errors::Result;
use crate::holdings::HoldingsRepositoryTrait;
use crate::market_data::market_data_provider::with_provider_timeout;
use crate::market_data::{
    LookbackRange, MarketDataProvider, PriceHistoryRepositoryTrait, PricePoint,
};
use crate::settings::CollectorSettings;

use super::backfill_model::{BackfillJob, JobStatus};
use super::backfill_traits::BackfillRepositoryTrait;

/// Durable queue of per-asset historical-data requests.
///
/// Jobs are drained sequentially per owner to bound provider rate-limit
/// pressure; the claim and the finalization are separate writes because
/// the provider call in between may take seconds.
pub struct BackfillService {
    repository: Arc<dyn BackfillRepositoryTrait>,
    holdings: Arc<dyn HoldingsRepositoryTrait>,
    history: Arc<dyn PriceHistoryRepositoryTrait>,
    provider: Arc<dyn MarketDataProvider>,
    settings: CollectorSettings,
}

impl BackfillService {
    pub fn new(
        repository: Arc<dyn BackfillRepositoryTrait>,
        holdings: Arc<dyn HoldingsRepositoryTrait>,
        history: Arc<dyn PriceHistoryRepositoryTrait>,
        provider: Arc<dyn MarketDataProvider>,
        settings: CollectorSettings,
    ) -> Self {
        Self {
            repository,
            holdings,
            history,
            provider,
            settings,
        }
    }

    /// Enqueue a backfill, or hand back the existing job for the same
    /// (owner, asset, lookback) key.
    pub fn request_backfill(
        &self,
        owner_id: &str,
        asset_id: &str,
        lookback: LookbackRange,
    ) -> Result<BackfillJob> {
        self.repository.insert_or_get(owner_id, asset_id, lookback)
    }

    /// Process every queued job for the owner, one at a time. Failed
    /// jobs stay failed; only an explicit retry puts them back in line.
    pub async fn drain_queued_backfills(&self, owner_id: &str) -> Result<Vec<BackfillJob>> {
        let queued = self.repository.list_queued(owner_id)?;
        info!(
            "Draining {} queued backfill job(s) for {}",
            queued.len(),
            owner_id
        );

        let mut finished = Vec::with_capacity(queued.len());
        for job in queued {
            let claimed = match self.repository.claim(&job.id)? {
                Some(claimed) => claimed,
                None => {
                    debug!("Job {} was claimed elsewhere; skipping", job.id);
                    continue;
                }
            };
            finished.push(self.execute_job(&claimed).await?);
        }
        Ok(finished)
    }

    /// Explicit operator action that makes a failed job eligible again.
    pub fn retry_failed_backfill(&self, job_id: &str) -> Result<BackfillJob> {
        let job = self.repository.requeue_failed(job_id)?;
        info!("Backfill job {} re-queued", job.id);
        Ok(job)
    }

    pub fn get_job(&self, job_id: &str) -> Result<Option<BackfillJob>> {
        self.repository.get(job_id)
    }

    async fn execute_job(&self, job: &BackfillJob) -> Result<BackfillJob> {
        let symbol = match self.holdings.get_asset(&job.asset_id)? {
            Some(asset) => asset.symbol,
            None => {
                let message = format!("Unknown asset {}", job.asset_id);
                warn!("Backfill job {} failed: {}", job.id, message);
                return self
                    .repository
                    .finalize(&job.id, JobStatus::Failed, Some(&message));
            }
        };

        let series = match with_provider_timeout(
            self.settings.provider_timeout_secs,
            self.provider
                .get_historical_daily_prices(&symbol, job.lookback),
        )
        .await
        {
            Ok(series) => series,
            Err(e) => {
                warn!("Backfill job {} failed: {}", job.id, e);
                return self
                    .repository
                    .finalize(&job.id, JobStatus::Failed, Some(&e.to_string()));
            }
        };

        if series.is_empty() {
            return self.repository.finalize(
                &job.id,
                JobStatus::Failed,
                Some("Provider returned no data points"),
            );
        }

        let (valid, dropped) = partition_points(series);

        if let Err(e) = self.history.upsert_points(&job.asset_id, &valid) {
            // Persistence failures propagate; close the job first so it
            // does not linger as a stuck `running` row.
            self.repository
                .finalize(&job.id, JobStatus::Failed, Some(&e.to_string()))?;
            return Err(e);
        }

        if dropped == 0 {
            info!(
                "Backfill job {} completed: {} point(s) persisted",
                job.id,
                valid.len()
            );
            self.repository.finalize(&job.id, JobStatus::Completed, None)
        } else {
            let message = format!("{} invalid point(s) dropped", dropped);
            info!(
                "Backfill job {} partial: {} persisted, {}",
                job.id,
                valid.len(),
                message
            );
            self.repository
                .finalize(&job.id, JobStatus::Partial, Some(&message))
        }
    }
}

/// Split a provider series into persistable points and a dropped count.
/// Validity lives on `PricePoint`; this only applies it.
pub(crate) fn partition_points(points: Vec<PricePoint>) -> (Vec<PricePoint>, usize) {
    let total = points.len();
    let valid: Vec<PricePoint> = points.into_iter().filter(PricePoint::is_valid).collect();
    let dropped = total - valid.len();
    (valid, dropped)
}
