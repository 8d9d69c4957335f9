use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{get_connection, DbConnection, DbPool, DbTransactionExecutor};
use crate::errors::Result;
use crate::schema::price_history;

use super::market_data_model::{PriceHistoryPoint, PriceHistoryPointDB, PricePoint};
use super::market_data_traits::PriceHistoryRepositoryTrait;

pub struct PriceHistoryRepository {
    pool: Arc<DbPool>,
}

impl PriceHistoryRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn upsert_row(
        conn: &mut DbConnection,
        asset_id: &str,
        point: &PricePoint,
    ) -> std::result::Result<(), diesel::result::Error> {
        diesel::insert_into(price_history::table)
            .values((
                price_history::id.eq(Uuid::new_v4().to_string()),
                price_history::asset_id.eq(asset_id),
                price_history::date.eq(point.date),
                price_history::price.eq(point.price),
                price_history::created_at.eq(Utc::now().naive_utc()),
            ))
            .on_conflict((price_history::asset_id, price_history::date))
            .do_update()
            .set(price_history::price.eq(point.price))
            .execute(conn)?;
        Ok(())
    }
}

impl PriceHistoryRepositoryTrait for PriceHistoryRepository {
    fn upsert_points(&self, asset_id: &str, points: &[PricePoint]) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }

        // One transaction: a backfill either lands completely or not at all.
        self.pool.execute(|conn| {
            for point in points {
                Self::upsert_row(conn, asset_id, point)?;
            }
            Ok::<usize, diesel::result::Error>(points.len())
        })
    }

    fn upsert_point(&self, asset_id: &str, date: NaiveDate, price: f64) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        Self::upsert_row(&mut conn, asset_id, &PricePoint::new(date, price))?;
        Ok(())
    }

    fn get_history(&self, asset_id: &str) -> Result<Vec<PriceHistoryPoint>> {
        let mut conn = get_connection(&self.pool)?;

        price_history::table
            .filter(price_history::asset_id.eq(asset_id))
            .order(price_history::date.asc())
            .load::<PriceHistoryPointDB>(&mut conn)
            .map(|points| points.into_iter().map(PriceHistoryPoint::from).collect())
            .map_err(Into::into)
    }

    fn delete_older_than(&self, cutoff: NaiveDate) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        diesel::delete(price_history::table.filter(price_history::date.lt(cutoff)))
            .execute(&mut conn)
            .map_err(Into::into)
    }
}
