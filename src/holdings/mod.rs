pub(crate) mod holdings_model;
pub(crate) mod holdings_repository;
pub(crate) mod holdings_traits;

pub use holdings_model::{Asset, HoldingPosition};
pub use holdings_repository::HoldingsRepository;
pub use holdings_traits::HoldingsRepositoryTrait;
