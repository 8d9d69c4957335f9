use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::market_data::LookbackRange;

pub const JOB_STATUS_QUEUED: &str = "queued";
pub const JOB_STATUS_RUNNING: &str = "running";
pub const JOB_STATUS_COMPLETED: &str = "completed";
pub const JOB_STATUS_PARTIAL: &str = "partial";
pub const JOB_STATUS_FAILED: &str = "failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Partial,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => JOB_STATUS_QUEUED,
            JobStatus::Running => JOB_STATUS_RUNNING,
            JobStatus::Completed => JOB_STATUS_COMPLETED,
            JobStatus::Partial => JOB_STATUS_PARTIAL,
            JobStatus::Failed => JOB_STATUS_FAILED,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Partial | JobStatus::Failed
        )
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            JOB_STATUS_RUNNING => JobStatus::Running,
            JOB_STATUS_COMPLETED => JobStatus::Completed,
            JOB_STATUS_PARTIAL => JobStatus::Partial,
            JOB_STATUS_FAILED => JobStatus::Failed,
            _ => JobStatus::Queued,
        }
    }
}

/// A durable request to populate historical prices for one asset over
/// one lookback window. Unique per (owner, asset, window); re-requesting
/// an identical backfill reuses the existing job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillJob {
    pub id: String,
    pub owner_id: String,
    pub asset_id: String,
    pub lookback: LookbackRange,
    pub status: JobStatus,
    pub requested_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
}

/// Database model for backfill jobs
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::backfill_jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BackfillJobDB {
    pub id: String,
    pub owner_id: String,
    pub asset_id: String,
    pub lookback: String,
    pub status: String,
    pub requested_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
}

impl From<BackfillJobDB> for BackfillJob {
    fn from(db: BackfillJobDB) -> Self {
        BackfillJob {
            id: db.id,
            owner_id: db.owner_id,
            asset_id: db.asset_id,
            lookback: LookbackRange::from(db.lookback.as_str()),
            status: JobStatus::from(db.status.as_str()),
            requested_at: db.requested_at,
            completed_at: db.completed_at,
            error_message: db.error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in [
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Completed,
            JobStatus::Partial,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::from(status.as_str()), status);
        }
    }

    #[test]
    fn terminal_states() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Partial.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }
}
