pub(crate) mod run_ledger_model;
pub(crate) mod run_ledger_repository;
pub(crate) mod run_ledger_traits;

pub use run_ledger_model::{RunRecord, RunStatus, StartRun, RUN_TYPE_DAILY_SNAPSHOT};
pub use run_ledger_repository::RunLedgerRepository;
pub use run_ledger_traits::RunLedgerRepositoryTrait;
