use crate::errors::Result;

use super::run_ledger_model::{RunStatus, StartRun};

/// Idempotent run tracking for periodic jobs. The store's UNIQUE
/// constraint on (owner, run type, run key) is the only concurrency
/// control: a duplicate trigger loses the insert race and gets
/// `StartRun::AlreadyRun`, even from another process.
pub trait RunLedgerRepositoryTrait: Send + Sync {
    fn try_start_run(&self, owner_id: &str, run_type: &str, run_key: &str) -> Result<StartRun>;

    /// Transition a running record to a terminal status and stamp the
    /// finish time. Calling this on an already-terminal record is a
    /// warn-and-no-op.
    fn finish_run(
        &self,
        run_id: &str,
        status: RunStatus,
        error_message: Option<&str>,
    ) -> Result<()>;
}
