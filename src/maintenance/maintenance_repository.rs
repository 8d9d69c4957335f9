use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::backfill::backfill_model::{
    JOB_STATUS_COMPLETED, JOB_STATUS_FAILED, JOB_STATUS_PARTIAL, JOB_STATUS_QUEUED,
};
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::ledger::run_ledger_model::{RUN_STATUS_FAILED, RUN_STATUS_RUNNING, RUN_STATUS_SUCCESS};
use crate::schema::{backfill_jobs, collector_runs};

use super::maintenance_model::CollectorStats;
use super::maintenance_traits::MaintenanceRepositoryTrait;

pub struct MaintenanceRepository {
    pool: Arc<DbPool>,
}

impl MaintenanceRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl MaintenanceRepositoryTrait for MaintenanceRepository {
    fn delete_terminal_runs_before(&self, owner_id: &str, cutoff: NaiveDateTime) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        diesel::delete(
            collector_runs::table
                .filter(collector_runs::owner_id.eq(owner_id))
                .filter(collector_runs::status.ne(RUN_STATUS_RUNNING))
                .filter(collector_runs::finished_at.lt(cutoff)),
        )
        .execute(&mut conn)
        .map_err(Into::into)
    }

    fn delete_terminal_jobs_before(&self, owner_id: &str, cutoff: NaiveDateTime) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        diesel::delete(
            backfill_jobs::table
                .filter(backfill_jobs::owner_id.eq(owner_id))
                .filter(backfill_jobs::status.eq_any([
                    JOB_STATUS_COMPLETED,
                    JOB_STATUS_PARTIAL,
                    JOB_STATUS_FAILED,
                ]))
                .filter(backfill_jobs::completed_at.lt(cutoff)),
        )
        .execute(&mut conn)
        .map_err(Into::into)
    }

    fn get_collector_stats(&self, owner_id: &str) -> Result<CollectorStats> {
        let mut conn = get_connection(&self.pool)?;

        let count_jobs = |conn: &mut SqliteConnection, status: &str| {
            backfill_jobs::table
                .filter(backfill_jobs::owner_id.eq(owner_id))
                .filter(backfill_jobs::status.eq(status))
                .count()
                .get_result::<i64>(conn)
        };

        let pending_jobs = count_jobs(&mut conn, JOB_STATUS_QUEUED)?;
        let completed_jobs = count_jobs(&mut conn, JOB_STATUS_COMPLETED)?;

        let total_runs = collector_runs::table
            .filter(collector_runs::owner_id.eq(owner_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        let count_runs = |conn: &mut SqliteConnection, status: &str| {
            collector_runs::table
                .filter(collector_runs::owner_id.eq(owner_id))
                .filter(collector_runs::status.eq(status))
                .count()
                .get_result::<i64>(conn)
        };

        let successful_runs = count_runs(&mut conn, RUN_STATUS_SUCCESS)?;
        let failed_runs = count_runs(&mut conn, RUN_STATUS_FAILED)?;

        Ok(CollectorStats {
            pending_jobs,
            completed_jobs,
            total_runs,
            successful_runs,
            failed_runs,
        })
    }
}
