use crate::errors::Result;

use super::holdings_model::{Asset, HoldingPosition};

pub trait HoldingsRepositoryTrait: Send + Sync {
    /// Every holding for the owner, joined with its asset's symbol,
    /// class and currency.
    fn get_holdings_with_assets(&self, owner_id: &str) -> Result<Vec<HoldingPosition>>;

    fn get_asset(&self, asset_id: &str) -> Result<Option<Asset>>;
}
