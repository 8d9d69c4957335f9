pub(crate) mod maintenance_model;
pub(crate) mod maintenance_repository;
pub(crate) mod maintenance_service;
pub(crate) mod maintenance_traits;

pub use maintenance_model::{CleanupSummary, CollectorStats};
pub use maintenance_repository::MaintenanceRepository;
pub use maintenance_service::MaintenanceService;
pub use maintenance_traits::MaintenanceRepositoryTrait;
