pub(crate) mod market_data_errors;
pub(crate) mod market_data_model;
pub(crate) mod market_data_provider;
pub(crate) mod market_data_traits;
pub(crate) mod price_cache;
pub(crate) mod price_history_repository;

// Re-export the public interface
pub use market_data_errors::MarketDataError;
pub use market_data_model::{LookbackRange, PriceHistoryPoint, PricePoint};
pub use market_data_provider::MarketDataProvider;
pub use market_data_traits::PriceHistoryRepositoryTrait;
pub use price_cache::PriceCache;
pub use price_history_repository::PriceHistoryRepository;
