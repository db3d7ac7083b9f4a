//! Parameter Mapper: flat options to per-object field maps.
//!
//! Each module declares a [`Binding`] table. Every validated option lands in
//! exactly one place: the root object's identity, a root field, a field of
//! one child slot, or the excluded control options.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::SchemaError;
use crate::modules::ModuleDef;
use crate::params::ParameterSet;
use crate::schema::{is_control_option, Target};

/// Where one option was assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Identity,
    Root,
    Slot(&'static str),
    Excluded,
    Unknown,
}

/// Disjoint split of a module's options.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub identity: Option<String>,
    /// Root fields keyed by field name.
    pub root: ParameterSet,
    /// One field map per declared slot, in declaration order.
    pub slots: Vec<(&'static str, ParameterSet)>,
    pub excluded: Vec<String>,
    /// Options with neither a binding nor a control role.
    pub unknown: Vec<String>,
    pub assignments: Vec<(String, Assignment)>,
}

impl Partition {
    pub fn slot(&self, name: &str) -> Option<&ParameterSet> {
        self.slots
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, fields)| fields)
    }

    pub fn assignment(&self, param: &str) -> Option<Assignment> {
        self.assignments
            .iter()
            .find(|(name, _)| name == param)
            .map(|(_, a)| *a)
    }
}

/// Split `params` according to `module`'s bindings.
pub fn partition(module: &ModuleDef, params: &ParameterSet) -> Partition {
    let mut out = Partition {
        slots: module
            .root
            .slots
            .iter()
            .map(|slot| (slot.name, ParameterSet::new()))
            .collect(),
        ..Partition::default()
    };

    for (param, value) in params.iter() {
        let assignment = match module.binding(param) {
            Some(binding) => match binding.target {
                Target::Identity => {
                    out.identity = value.as_str().map(ToString::to_string);
                    Assignment::Identity
                }
                Target::Root => {
                    out.root.insert(binding.field, value.clone());
                    Assignment::Root
                }
                Target::Slot(slot) => {
                    if let Some((_, fields)) = out.slots.iter_mut().find(|(name, _)| *name == slot)
                    {
                        fields.insert(binding.field, value.clone());
                    }
                    Assignment::Slot(slot)
                }
            },
            None if is_control_option(param) => {
                out.excluded.push(param.to_string());
                Assignment::Excluded
            }
            None => {
                out.unknown.push(param.to_string());
                Assignment::Unknown
            }
        };
        out.assignments.push((param.to_string(), assignment));
    }

    debug!(
        module = module.name,
        root = out.root.len(),
        excluded = out.excluded.len(),
        "partitioned parameters"
    );
    out
}

/// Audit a module's binding table.
///
/// Every object option must be bound exactly once to a field that exists on
/// its target and has the option's type; no two options may share a field
/// and no binding may use a control option's name.
pub fn verify_bindings(module: &ModuleDef) -> Result<(), SchemaError> {
    let fail = |message: String| SchemaError::Binding {
        module: module.name.to_string(),
        message,
    };

    let mut params = BTreeSet::new();
    let mut fields = BTreeSet::new();
    for binding in module.bindings {
        if is_control_option(binding.param) {
            return Err(fail(format!("{} shadows a control option", binding.param)));
        }
        if !params.insert(binding.param) {
            return Err(fail(format!("{} is bound more than once", binding.param)));
        }
        if !fields.insert((binding.target, binding.field)) {
            return Err(fail(format!(
                "field {} is bound more than once ({})",
                binding.field, binding.param
            )));
        }

        let option = module
            .option(binding.param)
            .ok_or_else(|| fail(format!("{} is bound but not declared", binding.param)))?;

        let field = match binding.target {
            Target::Identity => {
                if !module.root.is_named() {
                    return Err(fail(format!(
                        "{} binds an identity but {} is not named",
                        binding.param, module.root.kind
                    )));
                }
                continue;
            }
            Target::Root => module.root.field(binding.field),
            Target::Slot(slot) => {
                let spec = module
                    .root
                    .slot(slot)
                    .ok_or_else(|| fail(format!("{} targets unknown slot {slot}", binding.param)))?;
                spec.object.field(binding.field)
            }
        }
        .ok_or_else(|| fail(format!("{} targets unknown field {}", binding.param, binding.field)))?;

        if field.ty != option.ty {
            return Err(fail(format!(
                "{} is {} but field {} is {}",
                binding.param, option.ty, binding.field, field.ty
            )));
        }
    }

    if let Some(unbound) = module.options.iter().find(|o| !params.contains(o.name)) {
        return Err(fail(format!("{} has no binding", unbound.name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{partition, verify_bindings, Assignment};
    use crate::error::SchemaError;
    use crate::modules::gre_tunnel::GRE_TUNNEL;
    use crate::modules::{find_module, ModuleDef};
    use crate::params::ParameterSet;
    use crate::schema::{validate, Binding, OptionSpec, State};
    use crate::value::{ParamType, Value};

    #[test]
    fn partitions_into_root_slots_and_excluded() {
        let ha = find_module("ha").expect("ha");
        let params = ParameterSet::new()
            .with("ha_peer_ip", "10.0.0.1")
            .with("ha1_port", "ethernet1/1")
            .with("ha1b_port", "ethernet1/2")
            .with("state", "present")
            .with("commit", false);

        let split = partition(ha, &params);
        assert_eq!(split.root.get("peer_ip"), &Value::str("10.0.0.1"));
        assert_eq!(
            split.slot("ha1").map(|f| f.get("port").clone()),
            Some(Value::str("ethernet1/1"))
        );
        assert_eq!(
            split.slot("ha1_backup").map(|f| f.get("port").clone()),
            Some(Value::str("ethernet1/2"))
        );
        assert!(split.slot("ha3").is_some_and(ParameterSet::is_empty));
        assert_eq!(split.excluded, vec!["state", "commit"]);
        assert_eq!(split.assignment("ha1b_port"), Some(Assignment::Slot("ha1_backup")));
    }

    #[test]
    fn identity_is_taken_from_the_name_option() {
        let gre = find_module("gre_tunnel").expect("gre");
        let split = partition(gre, &ParameterSet::new().with("name", "t1").with("ttl", 42));
        assert_eq!(split.identity.as_deref(), Some("t1"));
        assert!(split.root.get("name").is_absent());
        assert_eq!(split.root.get("ttl"), &Value::Int(42));
    }

    #[test]
    fn every_validated_option_lands_in_one_partition() {
        for (module, raw) in [
            ("gre_tunnel", ParameterSet::new().with("name", "t1")),
            ("ha", ParameterSet::new()),
        ] {
            let module = find_module(module).expect("module");
            let validated = validate(module, &raw).expect("validate");
            let split = partition(module, &validated.params);

            for name in validated.params.names() {
                let hits = split.assignments.iter().filter(|(n, _)| n == name).count();
                assert_eq!(hits, 1, "{}: {name} assigned {hits} times", module.name);
            }
            assert!(split.unknown.is_empty(), "{}: {:?}", module.name, split.unknown);

            let identity = usize::from(split.identity.is_some());
            let slotted: usize = split.slots.iter().map(|(_, fields)| fields.len()).sum();
            assert_eq!(
                identity + split.root.len() + slotted + split.excluded.len(),
                validated.params.len(),
                "{}",
                module.name
            );
        }
    }

    static DUPLICATE_FIELD: ModuleDef = ModuleDef {
        name: "broken",
        summary: "",
        root: &GRE_TUNNEL,
        options: &[
            OptionSpec::new("ttl", ParamType::Int, ""),
            OptionSpec::new("hops", ParamType::Int, ""),
        ],
        bindings: &[Binding::root("ttl", "ttl"), Binding::root("hops", "ttl")],
        states: &[State::Present],
        default_state: State::Present,
        gathered_filter: false,
        min_version: None,
    };

    static SHADOWED: ModuleDef = ModuleDef {
        name: "broken",
        summary: "",
        root: &GRE_TUNNEL,
        options: &[OptionSpec::new("commit", ParamType::Bool, "")],
        bindings: &[Binding::root("commit", "disabled")],
        states: &[State::Present],
        default_state: State::Present,
        gathered_filter: false,
        min_version: None,
    };

    static WRONG_TYPE: ModuleDef = ModuleDef {
        name: "broken",
        summary: "",
        root: &GRE_TUNNEL,
        options: &[OptionSpec::new("ttl", ParamType::Str, "")],
        bindings: &[Binding::root("ttl", "ttl")],
        states: &[State::Present],
        default_state: State::Present,
        gathered_filter: false,
        min_version: None,
    };

    #[test]
    fn audit_rejects_broken_tables() {
        for module in [&DUPLICATE_FIELD, &SHADOWED, &WRONG_TYPE] {
            assert!(matches!(
                verify_bindings(module),
                Err(SchemaError::Binding { .. })
            ));
        }
    }
}
