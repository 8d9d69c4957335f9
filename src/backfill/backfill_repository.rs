use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{get_connection, DbPool};
use crate::errors::{CollectorError, Error, Result};
use crate::market_data::LookbackRange;
use crate::schema::backfill_jobs;

use super::backfill_model::{BackfillJob, BackfillJobDB, JobStatus};
use super::backfill_traits::BackfillRepositoryTrait;

pub struct BackfillRepository {
    pool: Arc<DbPool>,
}

impl BackfillRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl BackfillRepositoryTrait for BackfillRepository {
    fn insert_or_get(
        &self,
        owner_id: &str,
        asset_id: &str,
        lookback: LookbackRange,
    ) -> Result<BackfillJob> {
        let mut conn = get_connection(&self.pool)?;

        let record = BackfillJobDB {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            asset_id: asset_id.to_string(),
            lookback: lookback.as_str().to_string(),
            status: JobStatus::Queued.as_str().to_string(),
            requested_at: Utc::now().naive_utc(),
            completed_at: None,
            error_message: None,
        };

        diesel::insert_into(backfill_jobs::table)
            .values(&record)
            .on_conflict((
                backfill_jobs::owner_id,
                backfill_jobs::asset_id,
                backfill_jobs::lookback,
            ))
            .do_nothing()
            .execute(&mut conn)?;

        // Either our insert won or a job already existed; read back the
        // canonical row in both cases.
        backfill_jobs::table
            .filter(backfill_jobs::owner_id.eq(owner_id))
            .filter(backfill_jobs::asset_id.eq(asset_id))
            .filter(backfill_jobs::lookback.eq(lookback.as_str()))
            .first::<BackfillJobDB>(&mut conn)
            .map(BackfillJob::from)
            .map_err(Into::into)
    }

    fn get(&self, job_id: &str) -> Result<Option<BackfillJob>> {
        let mut conn = get_connection(&self.pool)?;

        backfill_jobs::table
            .find(job_id)
            .first::<BackfillJobDB>(&mut conn)
            .optional()
            .map(|job| job.map(BackfillJob::from))
            .map_err(Into::into)
    }

    fn list_queued(&self, owner_id: &str) -> Result<Vec<BackfillJob>> {
        let mut conn = get_connection(&self.pool)?;

        backfill_jobs::table
            .filter(backfill_jobs::owner_id.eq(owner_id))
            .filter(backfill_jobs::status.eq(JobStatus::Queued.as_str()))
            .order(backfill_jobs::requested_at.asc())
            .load::<BackfillJobDB>(&mut conn)
            .map(|jobs| jobs.into_iter().map(BackfillJob::from).collect())
            .map_err(Into::into)
    }

    fn claim(&self, job_id: &str) -> Result<Option<BackfillJob>> {
        let mut conn = get_connection(&self.pool)?;

        diesel::update(
            backfill_jobs::table
                .filter(backfill_jobs::id.eq(job_id))
                .filter(backfill_jobs::status.eq(JobStatus::Queued.as_str())),
        )
        .set(backfill_jobs::status.eq(JobStatus::Running.as_str()))
        .get_result::<BackfillJobDB>(&mut conn)
        .optional()
        .map(|job| job.map(BackfillJob::from))
        .map_err(Into::into)
    }

    fn finalize(
        &self,
        job_id: &str,
        terminal: JobStatus,
        error_message: Option<&str>,
    ) -> Result<BackfillJob> {
        let mut conn = get_connection(&self.pool)?;

        let updated = diesel::update(
            backfill_jobs::table
                .filter(backfill_jobs::id.eq(job_id))
                .filter(backfill_jobs::status.eq(JobStatus::Running.as_str())),
        )
        .set((
            backfill_jobs::status.eq(terminal.as_str()),
            backfill_jobs::completed_at.eq(Some(Utc::now().naive_utc())),
            backfill_jobs::error_message.eq(error_message),
        ))
        .get_result::<BackfillJobDB>(&mut conn)
        .optional()?;

        match updated {
            Some(job) => Ok(BackfillJob::from(job)),
            None => Err(Error::Collector(CollectorError::InvalidTransition(format!(
                "Job {} is not running; cannot finalize as {}",
                job_id,
                terminal.as_str()
            )))),
        }
    }

    fn requeue_failed(&self, job_id: &str) -> Result<BackfillJob> {
        let mut conn = get_connection(&self.pool)?;

        let updated = diesel::update(
            backfill_jobs::table
                .filter(backfill_jobs::id.eq(job_id))
                .filter(backfill_jobs::status.eq(JobStatus::Failed.as_str())),
        )
        .set((
            backfill_jobs::status.eq(JobStatus::Queued.as_str()),
            backfill_jobs::completed_at.eq(None::<NaiveDateTime>),
            backfill_jobs::error_message.eq(None::<String>),
        ))
        .get_result::<BackfillJobDB>(&mut conn)
        .optional()?;

        match updated {
            Some(job) => Ok(BackfillJob::from(job)),
            None => match self.get(job_id)? {
                Some(job) => Err(Error::Collector(CollectorError::InvalidTransition(
                    format!(
                        "Job {} has status {}; only failed jobs can be re-queued",
                        job_id,
                        job.status.as_str()
                    ),
                ))),
                None => Err(Error::Collector(CollectorError::NotFound(format!(
                    "Backfill job {}",
                    job_id
                )))),
            },
        }
    }
}
