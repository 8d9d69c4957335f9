use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

pub const BASE_CURRENCY: &str = "USD";

/// One persisted daily portfolio valuation. Written at most once per
/// (owner, date); later writers may only insert new days, never rewrite
/// a past one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub id: String,
    pub owner_id: String,
    pub snapshot_date: NaiveDate,
    pub total_value_usd: f64,
    pub total_cost_usd: f64,
    pub total_pnl_usd: f64,
    pub fx_rate: f64,
    pub created_at: NaiveDateTime,
}

/// Input model for a snapshot about to be persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolioSnapshot {
    pub owner_id: String,
    pub snapshot_date: NaiveDate,
    pub total_value_usd: f64,
    pub total_cost_usd: f64,
    pub total_pnl_usd: f64,
    pub fx_rate: f64,
}

/// Result of a daily snapshot trigger. `AlreadyRecorded` is the dedup
/// short-circuit for a repeated trigger on the same day.
#[derive(Debug, Clone)]
pub enum SnapshotOutcome {
    Recorded(PortfolioSnapshot),
    AlreadyRecorded,
}

/// Database model for snapshots
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolio_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioSnapshotDB {
    pub id: String,
    pub owner_id: String,
    pub snapshot_date: NaiveDate,
    pub total_value_usd: f64,
    pub total_cost_usd: f64,
    pub total_pnl_usd: f64,
    pub fx_rate: f64,
    pub created_at: NaiveDateTime,
}

impl From<PortfolioSnapshotDB> for PortfolioSnapshot {
    fn from(db: PortfolioSnapshotDB) -> Self {
        PortfolioSnapshot {
            id: db.id,
            owner_id: db.owner_id,
            snapshot_date: db.snapshot_date,
            total_value_usd: db.total_value_usd,
            total_cost_usd: db.total_cost_usd,
            total_pnl_usd: db.total_pnl_usd,
            fx_rate: db.fx_rate,
            created_at: db.created_at,
        }
    }
}
