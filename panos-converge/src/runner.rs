//! Post-Apply Action Runner.
//!
//! Commits when something changed and the caller asked for it, then turns
//! the reconciliation outcome into the terminal [`ModuleResult`].

use tracing::{info, warn};

use crate::error::ConvergeError;
use crate::modules::ModuleDef;
use crate::result::{ModuleResult, ReconciliationResult};
use crate::session::DeviceSession;

pub const DONE: &str = "Done";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitRequest {
    pub commit: bool,
    pub check_mode: bool,
}

impl CommitRequest {
    fn wanted(&self, changed: bool) -> bool {
        changed && self.commit && !self.check_mode
    }
}

pub fn finalize(
    session: &mut dyn DeviceSession,
    module: &ModuleDef,
    outcome: ReconciliationResult,
    request: CommitRequest,
) -> ModuleResult {
    let mut result = ModuleResult {
        changed: outcome.changed,
        msg: DONE.to_string(),
        diff: outcome.diff,
        changes: outcome.changes,
        gathered: outcome
            .gathered
            .map(|objects| objects.iter().map(|obj| module.export(obj)).collect()),
        invocation_error: None,
        error_kind: None,
    };

    if !request.wanted(outcome.changed) {
        return result;
    }

    match session.commit() {
        Ok(receipt) => info!(job_id = receipt.job_id, "commit finished"),
        Err(err) => {
            // The change is already on the candidate configuration.
            let err = ConvergeError::Commit(err);
            warn!(%err, "commit failed");
            result.changed = true;
            result.msg = err.to_string();
            result.invocation_error = Some(err.to_string());
            result.error_kind = Some(err.kind());
        }
    }
    result
}
