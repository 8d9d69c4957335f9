use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use log::warn;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::collector_runs;

use super::run_ledger_model::{RunRecord, RunRecordDB, RunStatus, StartRun};
use super::run_ledger_traits::RunLedgerRepositoryTrait;

pub struct RunLedgerRepository {
    pool: Arc<DbPool>,
}

impl RunLedgerRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl RunLedgerRepositoryTrait for RunLedgerRepository {
    fn try_start_run(&self, owner_id: &str, run_type: &str, run_key: &str) -> Result<StartRun> {
        let mut conn = get_connection(&self.pool)?;

        let record = RunRecordDB {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            run_type: run_type.to_string(),
            run_key: run_key.to_string(),
            status: RunStatus::Running.as_str().to_string(),
            started_at: Utc::now().naive_utc(),
            finished_at: None,
            error_message: None,
        };

        // The insert either wins the (owner, run_type, run_key) race or
        // conflicts; a conflict means the period was already claimed.
        match diesel::insert_into(collector_runs::table)
            .values(&record)
            .execute(&mut conn)
        {
            Ok(_) => Ok(StartRun::Started(RunRecord::from(record))),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Ok(StartRun::AlreadyRun)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn finish_run(
        &self,
        run_id: &str,
        status: RunStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        let updated = diesel::update(
            collector_runs::table
                .filter(collector_runs::id.eq(run_id))
                .filter(collector_runs::status.eq(RunStatus::Running.as_str())),
        )
        .set((
            collector_runs::status.eq(status.as_str()),
            collector_runs::finished_at.eq(Some(Utc::now().naive_utc())),
            collector_runs::error_message.eq(error_message),
        ))
        .execute(&mut conn)?;

        if updated == 0 {
            warn!(
                "finish_run({}) matched no running record; run is missing or already terminal",
                run_id
            );
        }

        Ok(())
    }
}
