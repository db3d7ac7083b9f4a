//! Outcome types of a reconciliation and of a whole module run.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::diff::Change;
use crate::error::ErrorKind;
use crate::object::{codec, ConfigObject};

/// Rendered XML of the object before and after the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectDiff {
    pub before: Option<String>,
    pub after: Option<String>,
}

impl ObjectDiff {
    pub fn between(before: Option<&ConfigObject>, after: Option<&ConfigObject>) -> Self {
        let render = |obj: &ConfigObject| panos_xml::render_fragment(&codec::encode(obj));
        Self {
            before: before.map(render),
            after: after.map(render),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    None,
}

/// What the reconciler decided and, unless in check mode, applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationResult {
    pub changed: bool,
    pub operation: OperationKind,
    pub diff: Option<ObjectDiff>,
    pub changes: Vec<Change>,
    /// Matching objects, for read-only gathers.
    pub gathered: Option<Vec<ConfigObject>>,
}

impl ReconciliationResult {
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            operation: OperationKind::None,
            diff: None,
            changes: Vec::new(),
            gathered: None,
        }
    }
}

/// Terminal result of one module invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleResult {
    pub changed: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<ObjectDiff>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Change>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gathered: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ModuleResult {
    pub fn failed(&self) -> bool {
        self.error_kind.is_some()
    }
}
