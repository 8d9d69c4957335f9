pub(crate) mod backfill_model;
pub(crate) mod backfill_repository;
pub(crate) mod backfill_service;
#[cfg(test)]
mod backfill_service_tests;
pub(crate) mod backfill_traits;

pub use backfill_model::{BackfillJob, JobStatus};
pub use backfill_repository::BackfillRepository;
pub use backfill_service::BackfillService;
pub use backfill_traits::BackfillRepositoryTrait;
