use serde::{Deserialize, Serialize};

/// Rows removed by one retention pass, per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupSummary {
    pub snapshots_removed: usize,
    pub price_points_removed: usize,
    pub runs_removed: usize,
    pub jobs_removed: usize,
}

/// Aggregate counters for operational tooling. Stuck runs show up as
/// `total_runs - successful_runs - failed_runs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorStats {
    pub pending_jobs: i64,
    pub completed_jobs: i64,
    pub total_runs: i64,
    pub successful_runs: i64,
    pub failed_runs: i64,
}
