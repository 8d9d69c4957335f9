use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::{assets, holdings};

use super::holdings_model::{Asset, AssetDB, HoldingPosition};
use super::holdings_traits::HoldingsRepositoryTrait;

pub struct HoldingsRepository {
    pool: Arc<DbPool>,
}

impl HoldingsRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl HoldingsRepositoryTrait for HoldingsRepository {
    fn get_holdings_with_assets(&self, owner_id: &str) -> Result<Vec<HoldingPosition>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = holdings::table
            .inner_join(assets::table)
            .filter(holdings::owner_id.eq(owner_id))
            .select((
                holdings::asset_id,
                assets::symbol,
                assets::asset_class,
                assets::currency,
                holdings::quantity,
                holdings::average_cost,
            ))
            .load::<(String, String, Option<String>, String, f64, f64)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(
                |(asset_id, symbol, asset_class, currency, quantity, average_cost)| {
                    HoldingPosition {
                        asset_id,
                        symbol,
                        asset_class,
                        currency,
                        quantity,
                        average_cost,
                    }
                },
            )
            .collect())
    }

    fn get_asset(&self, asset_id: &str) -> Result<Option<Asset>> {
        let mut conn = get_connection(&self.pool)?;

        assets::table
            .find(asset_id)
            .first::<AssetDB>(&mut conn)
            .optional()
            .map(|asset| asset.map(Asset::from))
            .map_err(Into::into)
    }
}
