use chrono::NaiveDate;

use crate::errors::Result;

use super::snapshot_model::{NewPortfolioSnapshot, PortfolioSnapshot};

pub trait SnapshotRepositoryTrait: Send + Sync {
    /// Insert the snapshot row and mark the owning ledger run successful
    /// in one transaction, so a partial commit can never leave a
    /// `success` run without its snapshot.
    fn insert_with_run_completion(
        &self,
        new_snapshot: &NewPortfolioSnapshot,
        run_id: &str,
    ) -> Result<PortfolioSnapshot>;

    fn get_snapshots(&self, owner_id: &str) -> Result<Vec<PortfolioSnapshot>>;

    /// Delete the owner's snapshots strictly older than the cutoff date.
    /// Returns the number of rows removed.
    fn delete_older_than(&self, owner_id: &str, cutoff: NaiveDate) -> Result<usize>;
}
