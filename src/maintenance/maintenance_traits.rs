use chrono::NaiveDateTime;

use crate::errors::Result;

use super::maintenance_model::CollectorStats;

pub trait MaintenanceRepositoryTrait: Send + Sync {
    /// Delete terminal run records finished before the cutoff. Running
    /// records are never touched.
    fn delete_terminal_runs_before(&self, owner_id: &str, cutoff: NaiveDateTime) -> Result<usize>;

    /// Delete terminal backfill jobs completed before the cutoff.
    fn delete_terminal_jobs_before(&self, owner_id: &str, cutoff: NaiveDateTime) -> Result<usize>;

    /// Read-only aggregate counts; no side effects.
    fn get_collector_stats(&self, owner_id: &str) -> Result<CollectorStats>;
}
