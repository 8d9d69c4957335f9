pub mod db;

pub mod backfill;
pub mod collector;
pub mod errors;
pub mod holdings;
pub mod ledger;
pub mod maintenance;
pub mod market_data;
pub mod schema;
pub mod settings;
pub mod snapshot;

pub use collector::CollectorService;
pub use errors::{Error, Result};
pub use settings::CollectorSettings;
