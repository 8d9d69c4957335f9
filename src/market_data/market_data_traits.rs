use chrono::NaiveDate;

use crate::errors::Result;

use super::market_data_model::{PriceHistoryPoint, PricePoint};

/// Persistence surface for the append-only (asset, date) price log.
/// Writes deduplicate by upsert-on-conflict rather than call order.
pub trait PriceHistoryRepositoryTrait: Send + Sync {
    /// Persist a batch of points as one all-or-nothing write.
    /// Returns the number of points written.
    fn upsert_points(&self, asset_id: &str, points: &[PricePoint]) -> Result<usize>;

    fn upsert_point(&self, asset_id: &str, date: NaiveDate, price: f64) -> Result<()>;

    fn get_history(&self, asset_id: &str) -> Result<Vec<PriceHistoryPoint>>;

    /// Delete all points strictly older than the cutoff date, across
    /// assets. Returns the number of rows removed.
    fn delete_older_than(&self, cutoff: NaiveDate) -> Result<usize>;
}
