use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{get_connection, DbPool, DbTransactionExecutor};
use crate::errors::Result;
use crate::ledger::RunStatus;
use crate::schema::{collector_runs, portfolio_snapshots};

use super::snapshot_model::{NewPortfolioSnapshot, PortfolioSnapshot, PortfolioSnapshotDB};
use super::snapshot_traits::SnapshotRepositoryTrait;

pub struct SnapshotRepository {
    pool: Arc<DbPool>,
}

impl SnapshotRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl SnapshotRepositoryTrait for SnapshotRepository {
    fn insert_with_run_completion(
        &self,
        new_snapshot: &NewPortfolioSnapshot,
        run_id: &str,
    ) -> Result<PortfolioSnapshot> {
        let record = PortfolioSnapshotDB {
            id: Uuid::new_v4().to_string(),
            owner_id: new_snapshot.owner_id.clone(),
            snapshot_date: new_snapshot.snapshot_date,
            total_value_usd: new_snapshot.total_value_usd,
            total_cost_usd: new_snapshot.total_cost_usd,
            total_pnl_usd: new_snapshot.total_pnl_usd,
            fx_rate: new_snapshot.fx_rate,
            created_at: Utc::now().naive_utc(),
        };

        let run_id = run_id.to_string();
        let inserted = self.pool.execute(move |conn| {
            diesel::insert_into(portfolio_snapshots::table)
                .values(&record)
                .execute(conn)?;

            diesel::update(
                collector_runs::table
                    .filter(collector_runs::id.eq(&run_id))
                    .filter(collector_runs::status.eq(RunStatus::Running.as_str())),
            )
            .set((
                collector_runs::status.eq(RunStatus::Success.as_str()),
                collector_runs::finished_at.eq(Some(Utc::now().naive_utc())),
            ))
            .execute(conn)?;

            Ok::<PortfolioSnapshotDB, diesel::result::Error>(record)
        })?;

        Ok(PortfolioSnapshot::from(inserted))
    }

    fn get_snapshots(&self, owner_id: &str) -> Result<Vec<PortfolioSnapshot>> {
        let mut conn = get_connection(&self.pool)?;

        portfolio_snapshots::table
            .filter(portfolio_snapshots::owner_id.eq(owner_id))
            .order(portfolio_snapshots::snapshot_date.asc())
            .load::<PortfolioSnapshotDB>(&mut conn)
            .map(|rows| rows.into_iter().map(PortfolioSnapshot::from).collect())
            .map_err(Into::into)
    }

    fn delete_older_than(&self, owner_id: &str, cutoff: NaiveDate) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        diesel::delete(
            portfolio_snapshots::table
                .filter(portfolio_snapshots::owner_id.eq(owner_id))
                .filter(portfolio_snapshots::snapshot_date.lt(cutoff)),
        )
        .execute(&mut conn)
        .map_err(Into::into)
    }
}
