use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use ledgerfolio_core::db::{self, DbPool};
use ledgerfolio_core::schema::{assets, holdings, portfolio_snapshots};

/// Fresh on-disk database with migrations applied. The TempDir must be
/// kept alive for the duration of the test.
pub fn setup_pool() -> (tempfile::TempDir, Arc<DbPool>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let db_path = db::init(dir.path().to_str().expect("temp dir path"))
        .expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    (dir, pool)
}

pub fn seed_asset(pool: &DbPool, id: &str, currency: &str) {
    let mut conn = pool.get().expect("Failed to get database connection");
    let now = Utc::now().naive_utc();

    diesel::insert_into(assets::table)
        .values((
            assets::id.eq(id),
            assets::symbol.eq(id),
            assets::currency.eq(currency),
            assets::created_at.eq(now),
            assets::updated_at.eq(now),
        ))
        .execute(&mut conn)
        .expect("Failed to seed asset");
}

pub fn seed_snapshot(pool: &DbPool, owner_id: &str, snapshot_date: NaiveDate) {
    let mut conn = pool.get().expect("Failed to get database connection");

    diesel::insert_into(portfolio_snapshots::table)
        .values((
            portfolio_snapshots::id.eq(Uuid::new_v4().to_string()),
            portfolio_snapshots::owner_id.eq(owner_id),
            portfolio_snapshots::snapshot_date.eq(snapshot_date),
            portfolio_snapshots::total_value_usd.eq(1000.0),
            portfolio_snapshots::total_cost_usd.eq(800.0),
            portfolio_snapshots::total_pnl_usd.eq(200.0),
            portfolio_snapshots::fx_rate.eq(7.2),
            portfolio_snapshots::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)
        .expect("Failed to seed snapshot");
}

pub fn seed_holding(
    pool: &DbPool,
    owner_id: &str,
    asset_id: &str,
    quantity: f64,
    average_cost: f64,
) {
    let mut conn = pool.get().expect("Failed to get database connection");
    let now = Utc::now().naive_utc();

    diesel::insert_into(holdings::table)
        .values((
            holdings::id.eq(Uuid::new_v4().to_string()),
            holdings::owner_id.eq(owner_id),
            holdings::asset_id.eq(asset_id),
            holdings::quantity.eq(quantity),
            holdings::average_cost.eq(average_cost),
            holdings::created_at.eq(now),
            holdings::updated_at.eq(now),
        ))
        .execute(&mut conn)
        .expect("Failed to seed holding");
}
