pub(crate) mod snapshot_model;
pub(crate) mod snapshot_repository;
pub(crate) mod snapshot_service;
pub(crate) mod snapshot_traits;

pub use snapshot_model::{NewPortfolioSnapshot, PortfolioSnapshot, SnapshotOutcome};
pub use snapshot_repository::SnapshotRepository;
pub use snapshot_service::SnapshotService;
pub use snapshot_traits::SnapshotRepositoryTrait;
