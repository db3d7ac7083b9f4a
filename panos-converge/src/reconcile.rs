//! State Reconciler.
//!
//! One listing, one decision, at most one operation:
//!
//! | intent    | object missing | object exists and differs | exists and equal |
//! |-----------|----------------|---------------------------|------------------|
//! | `Replace` | create         | update with desired       | no-op            |
//! | `Merge`   | create         | update with overlay       | no-op            |
//! | `Delete`  | no-op          | delete                    | delete           |
//! | `Gather`  | read only      | read only                 | read only        |

use tracing::{debug, info};

use crate::builder::DesiredTree;
use crate::diff::{self, diff_objects};
use crate::error::{ConvergeError, ConvergeResult};
use crate::gather_filter::GatherQuery;
use crate::object::{ConfigObject, ObjectSpec};
use crate::result::{ObjectDiff, OperationKind, ReconciliationResult};
use crate::session::{DeviceSession, Operation, Scope};

/// What the caller wants to happen to the object.
#[derive(Debug, Clone)]
pub enum Intent {
    /// Make the object exactly `DesiredTree`.
    Replace(DesiredTree),
    /// Overlay `patch` on the existing object, or create `create`.
    Merge {
        patch: DesiredTree,
        create: DesiredTree,
    },
    /// Remove the object identified by the tree.
    Delete(DesiredTree),
    /// Report matching objects without changing anything.
    Gather(GatherQuery),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    check_mode: bool,
}

impl Reconciler {
    pub fn new(check_mode: bool) -> Self {
        Self { check_mode }
    }

    pub fn reconcile(
        &self,
        session: &mut dyn DeviceSession,
        spec: &'static ObjectSpec,
        scope: &Scope,
        intent: Intent,
    ) -> ConvergeResult<ReconciliationResult> {
        let mut snapshot = session
            .list(spec, scope)
            .map_err(ConvergeError::RemoteFetch)?;

        let (before, op) = match intent {
            Intent::Gather(query) => {
                let gathered: Vec<ConfigObject> = snapshot
                    .instances
                    .into_iter()
                    .filter(|obj| query.matches(obj))
                    .collect();
                info!(kind = %spec.kind, %scope, count = gathered.len(), "gathered objects");
                return Ok(ReconciliationResult {
                    gathered: Some(gathered),
                    ..ReconciliationResult::unchanged()
                });
            }
            Intent::Replace(tree) => {
                let desired = tree.into_root();
                snapshot.normalize(&desired);
                match snapshot.find(&desired).cloned() {
                    None => (None, Some(Operation::Create(desired))),
                    Some(existing) if existing == desired => (Some(existing), None),
                    Some(existing) => (Some(existing), Some(Operation::Update(desired))),
                }
            }
            Intent::Merge { patch, create } => {
                let patch = patch.into_root();
                match snapshot.find(&patch).cloned() {
                    None => (None, Some(Operation::Create(create.into_root()))),
                    Some(mut merged) => {
                        merged.overlay(&patch);
                        snapshot.normalize(&merged);
                        let existing = snapshot.find(&merged).cloned();
                        match existing {
                            Some(existing) if existing == merged => (Some(existing), None),
                            existing => (existing, Some(Operation::Update(merged))),
                        }
                    }
                }
            }
            Intent::Delete(tree) => match snapshot.find(tree.root()).cloned() {
                None => (None, None),
                Some(existing) => (Some(existing.clone()), Some(Operation::Delete(existing))),
            },
        };

        let Some(op) = op else {
            debug!(kind = %spec.kind, %scope, "object already in desired state");
            return Ok(ReconciliationResult::unchanged());
        };

        let after = match &op {
            Operation::Create(obj) | Operation::Update(obj) => Some(obj),
            Operation::Delete(_) => None,
        };
        let changes = diff_objects(before.as_ref(), after);
        let result = ReconciliationResult {
            changed: true,
            operation: match op {
                Operation::Create(_) => OperationKind::Create,
                Operation::Update(_) => OperationKind::Update,
                Operation::Delete(_) => OperationKind::Delete,
            },
            diff: Some(ObjectDiff::between(before.as_ref(), after)),
            changes,
            gathered: None,
        };

        if self.check_mode {
            info!(
                op = op.verb(),
                object = %diff::label(op.object()),
                "check mode, not applying"
            );
        } else {
            session.apply(scope, &op).map_err(ConvergeError::Apply)?;
        }
        Ok(result)
    }
}
