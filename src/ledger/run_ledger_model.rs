use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

pub const RUN_TYPE_DAILY_SNAPSHOT: &str = "daily-snapshot";

pub const RUN_STATUS_RUNNING: &str = "running";
pub const RUN_STATUS_SUCCESS: &str = "success";
pub const RUN_STATUS_FAILED: &str = "failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => RUN_STATUS_RUNNING,
            RunStatus::Success => RUN_STATUS_SUCCESS,
            RunStatus::Failed => RUN_STATUS_FAILED,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl From<&str> for RunStatus {
    fn from(s: &str) -> Self {
        match s {
            RUN_STATUS_SUCCESS => RunStatus::Success,
            RUN_STATUS_FAILED => RunStatus::Failed,
            _ => RunStatus::Running,
        }
    }
}

/// One attempt of a named periodic job. The (owner, run type, run key)
/// triple is unique in the store; the key identifies the logical period
/// (for the daily snapshot, the calendar date).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub id: String,
    pub owner_id: String,
    pub run_type: String,
    pub run_key: String,
    pub status: RunStatus,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
}

/// Outcome of an attempt to start a run. `AlreadyRun` is the normal
/// idempotency short-circuit, not an error.
#[derive(Debug, Clone)]
pub enum StartRun {
    Started(RunRecord),
    AlreadyRun,
}

/// Database model for run records
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::collector_runs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RunRecordDB {
    pub id: String,
    pub owner_id: String,
    pub run_type: String,
    pub run_key: String,
    pub status: String,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
}

impl From<RunRecordDB> for RunRecord {
    fn from(db: RunRecordDB) -> Self {
        RunRecord {
            id: db.id,
            owner_id: db.owner_id,
            run_type: db.run_type,
            run_key: db.run_key,
            status: RunStatus::from(db.status.as_str()),
            started_at: db.started_at,
            finished_at: db.finished_at,
            error_message: db.error_message,
        }
    }
}
