use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use log::info;
use std::sync::Arc;

use crate::errors::Result;
use crate::market_data::PriceHistoryRepositoryTrait;
use crate::settings::CollectorSettings;
use crate::snapshot::SnapshotRepositoryTrait;

use super::maintenance_model::{CleanupSummary, CollectorStats};
use super::maintenance_traits::MaintenanceRepositoryTrait;

/// Retention over the growing time-series tables, plus the aggregate
/// counters operational tooling polls.
pub struct MaintenanceService {
    repository: Arc<dyn MaintenanceRepositoryTrait>,
    snapshots: Arc<dyn SnapshotRepositoryTrait>,
    history: Arc<dyn PriceHistoryRepositoryTrait>,
    settings: CollectorSettings,
}

impl MaintenanceService {
    pub fn new(
        repository: Arc<dyn MaintenanceRepositoryTrait>,
        snapshots: Arc<dyn SnapshotRepositoryTrait>,
        history: Arc<dyn PriceHistoryRepositoryTrait>,
        settings: CollectorSettings,
    ) -> Self {
        Self {
            repository,
            snapshots,
            history,
            settings,
        }
    }

    /// Prune snapshots and price points older than the retention window.
    ///
    /// Run and job rows are the audit trail; they are only pruned past
    /// the separate `audit_retention_days` window, and not at all when
    /// that window is unset.
    pub fn cleanup_old_data(&self, owner_id: &str, retention_days: i64) -> Result<CleanupSummary> {
        let today = Utc::now().date_naive();
        let cutoff = today - Duration::days(retention_days);

        let snapshots_removed = self.snapshots.delete_older_than(owner_id, cutoff)?;
        let price_points_removed = self.history.delete_older_than(cutoff)?;

        let (runs_removed, jobs_removed) = match self.settings.audit_retention_days {
            Some(audit_days) => {
                let audit_cutoff = audit_cutoff_datetime(today, audit_days);
                (
                    self.repository
                        .delete_terminal_runs_before(owner_id, audit_cutoff)?,
                    self.repository
                        .delete_terminal_jobs_before(owner_id, audit_cutoff)?,
                )
            }
            None => (0, 0),
        };

        let summary = CleanupSummary {
            snapshots_removed,
            price_points_removed,
            runs_removed,
            jobs_removed,
        };
        info!(
            "Cleanup for {} (cutoff {}): {:?}",
            owner_id, cutoff, summary
        );
        Ok(summary)
    }

    pub fn get_collector_stats(&self, owner_id: &str) -> Result<CollectorStats> {
        self.repository.get_collector_stats(owner_id)
    }
}

fn audit_cutoff_datetime(today: NaiveDate, audit_days: i64) -> chrono::NaiveDateTime {
    (today - Duration::days(audit_days)).and_time(NaiveTime::MIN)
}
