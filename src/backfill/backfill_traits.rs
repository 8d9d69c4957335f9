use crate::errors::Result;
use crate::market_data::LookbackRange;

use super::backfill_model::{BackfillJob, JobStatus};

pub trait BackfillRepositoryTrait: Send + Sync {
    /// Insert a `queued` job, or return the existing job for the same
    /// (owner, asset, lookback) key untouched. The UNIQUE constraint
    /// decides the race, not application logic.
    fn insert_or_get(
        &self,
        owner_id: &str,
        asset_id: &str,
        lookback: LookbackRange,
    ) -> Result<BackfillJob>;

    fn get(&self, job_id: &str) -> Result<Option<BackfillJob>>;

    fn list_queued(&self, owner_id: &str) -> Result<Vec<BackfillJob>>;

    /// Move a `queued` job to `running`. Returns `None` when the job is
    /// no longer queued (claimed elsewhere or already terminal).
    fn claim(&self, job_id: &str) -> Result<Option<BackfillJob>>;

    /// Stamp a terminal status and `completed_at` on a running job.
    fn finalize(
        &self,
        job_id: &str,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<BackfillJob>;

    /// Reset a `failed` job to `queued`. Any other state is rejected.
    fn requeue_failed(&self, job_id: &str) -> Result<BackfillJob>;
}
