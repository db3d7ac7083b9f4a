//! Field-level differences between two configuration objects.

use serde::Serialize;

use crate::object::{ConfigObject, Slot};
use crate::value::Value;

/// One difference between the current and the desired object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    /// Field exists on both sides with different values.
    Modified {
        path: String,
        before: Value,
        after: Value,
    },
    /// Object or child only on the desired side.
    Added { path: String },
    /// Object or child only on the current side.
    Removed { path: String },
}

impl Change {
    pub fn path(&self) -> &str {
        match self {
            Change::Modified { path, .. } | Change::Added { path } | Change::Removed { path } => {
                path
            }
        }
    }
}

/// Path label of an object: `GreTunnel[t1]` or `HighAvailability`.
pub fn label(obj: &ConfigObject) -> String {
    match obj.name() {
        Some(name) => format!("{}[{}]", obj.kind(), name),
        None => obj.kind().to_string(),
    }
}

/// Diff `before` (current) against `after` (desired).
pub fn diff_objects(before: Option<&ConfigObject>, after: Option<&ConfigObject>) -> Vec<Change> {
    let mut out = Vec::new();
    match (before, after) {
        (Some(b), Some(a)) => diff_fields(b, a, &label(a), &mut out),
        (None, Some(a)) => out.push(Change::Added { path: label(a) }),
        (Some(b), None) => out.push(Change::Removed { path: label(b) }),
        (None, None) => {}
    }
    out
}

fn diff_fields(before: &ConfigObject, after: &ConfigObject, path: &str, out: &mut Vec<Change>) {
    for (field, after_value) in after.fields() {
        let before_value = before.get(field);
        if before_value != after_value {
            out.push(Change::Modified {
                path: format!("{path}.{field}"),
                before: before_value.clone(),
                after: after_value.clone(),
            });
        }
    }

    for (name, after_slot) in after.slots() {
        let child_path = format!("{path}.{name}");
        match (before.slot(name), after_slot) {
            (Slot::Present(b), Slot::Present(a)) => diff_fields(b, a, &child_path, out),
            (Slot::Absent, Slot::Present(_)) => out.push(Change::Added { path: child_path }),
            (Slot::Present(_), Slot::Absent) => out.push(Change::Removed { path: child_path }),
            (Slot::Absent, Slot::Absent) => {}
        }
    }
}

/// Format changes as plain text, one line per change.
pub fn format_text(changes: &[Change]) -> String {
    let mut lines = Vec::with_capacity(changes.len());
    for change in changes {
        match change {
            Change::Modified {
                path,
                before,
                after,
            } => lines.push(format!("~ {path}: {before} -> {after}")),
            Change::Added { path } => lines.push(format!("+ {path}")),
            Change::Removed { path } => lines.push(format!("- {path}")),
        }
    }
    lines.join("\n")
}

/// Count changes by type.
pub fn format_summary(changes: &[Change]) -> String {
    let mut modified = 0;
    let mut added = 0;
    let mut removed = 0;

    for change in changes {
        match change {
            Change::Modified { .. } => modified += 1,
            Change::Added { .. } => added += 1,
            Change::Removed { .. } => removed += 1,
        }
    }

    format!("modified={modified} added={added} removed={removed}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{diff_objects, format_summary, format_text, Change};
    use crate::modules::gre_tunnel::GRE_TUNNEL;
    use crate::modules::ha::{HA1, HA3, HIGH_AVAILABILITY};
    use crate::object::{ConfigObject, Slot};
    use crate::value::Value;

    #[test]
    fn reports_modified_fields_with_paths() {
        let before = ConfigObject::named(&GRE_TUNNEL, "t1").with("ttl", 64);
        let after = ConfigObject::named(&GRE_TUNNEL, "t1")
            .with("ttl", 42)
            .with("copy_tos", true);

        let changes = diff_objects(Some(&before), Some(&after));
        assert_eq!(
            changes,
            vec![
                Change::Modified {
                    path: "GreTunnel[t1].ttl".into(),
                    before: Value::Int(64),
                    after: Value::Int(42),
                },
                Change::Modified {
                    path: "GreTunnel[t1].copy_tos".into(),
                    before: Value::Absent,
                    after: Value::Bool(true),
                },
            ]
        );
        assert_eq!(format_summary(&changes), "modified=2 added=0 removed=0");
    }

    #[test]
    fn recurses_into_child_slots() {
        let mut before = ConfigObject::new(&HIGH_AVAILABILITY);
        before.set_slot(
            "ha1",
            Slot::Present(Box::new(ConfigObject::new(&HA1).with("port", "ethernet1/1"))),
        );
        before.set_slot(
            "ha3",
            Slot::Present(Box::new(ConfigObject::new(&HA3).with("port", "ae1"))),
        );
        let mut after = ConfigObject::new(&HIGH_AVAILABILITY);
        after.set_slot(
            "ha1",
            Slot::Present(Box::new(ConfigObject::new(&HA1).with("port", "ethernet1/2"))),
        );

        let changes = diff_objects(Some(&before), Some(&after));
        assert_eq!(
            format_text(&changes),
            "~ HighAvailability.ha1.port: \"ethernet1/1\" -> \"ethernet1/2\"\n- HighAvailability.ha3"
        );
    }

    #[test]
    fn whole_object_creation_and_removal() {
        let t1 = ConfigObject::named(&GRE_TUNNEL, "t1");
        assert_eq!(diff_objects(None, Some(&t1))[0].path(), "GreTunnel[t1]");
        assert!(matches!(
            diff_objects(Some(&t1), None)[0],
            Change::Removed { .. }
        ));
    }
}
