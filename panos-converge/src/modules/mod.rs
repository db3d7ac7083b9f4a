//! Module registry.
//!
//! A module couples a flat option schema with the object it configures. Each
//! module file declares its object specs, options, bindings and builders,
//! then registers a [`ModuleDef`] with `inventory::submit!`.

use serde_json::{Map, Value as JsonValue};

use crate::object::instance::ConfigObject;
use crate::object::spec::ObjectSpec;
use crate::schema::{Binding, OptionSpec, State, Target};
use crate::session::version::SoftwareVersion;
use crate::value::Value;

pub mod gre_tunnel;
pub mod ha;

/// A registered configuration module.
#[derive(Debug)]
pub struct ModuleDef {
    pub name: &'static str,
    pub summary: &'static str,
    pub root: &'static ObjectSpec,
    /// Object options; control options are added by [`crate::schema`].
    pub options: &'static [OptionSpec],
    pub bindings: &'static [Binding],
    pub states: &'static [State],
    pub default_state: State,
    pub gathered_filter: bool,
    pub min_version: Option<SoftwareVersion>,
}

inventory::collect!(ModuleDef);

/// All registered modules, sorted by name.
pub fn all_modules() -> Vec<&'static ModuleDef> {
    let mut modules: Vec<&'static ModuleDef> = inventory::iter::<ModuleDef>.into_iter().collect();
    modules.sort_by_key(|m| m.name);
    modules
}

pub fn find_module(name: &str) -> Option<&'static ModuleDef> {
    inventory::iter::<ModuleDef>
        .into_iter()
        .find(|m| m.name == name || m.name.replace('_', "-") == name)
}

impl ModuleDef {
    pub fn option(&self, name: &str) -> Option<&'static OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn binding(&self, param: &str) -> Option<&'static Binding> {
        self.bindings.iter().find(|b| b.param == param)
    }

    pub fn supports(&self, state: State) -> bool {
        self.states.contains(&state)
    }

    /// Flatten an object back into this module's option names.
    ///
    /// Used to report gathered objects in the same vocabulary the caller
    /// writes desired state in.
    pub fn export(&self, obj: &ConfigObject) -> JsonValue {
        let mut out = Map::new();
        for binding in self.bindings {
            let value = match binding.target {
                Target::Identity => obj.name().map(Value::str).unwrap_or_default(),
                Target::Root => obj.get(binding.field).clone(),
                Target::Slot(slot) => obj
                    .child(slot)
                    .map(|child| child.get(binding.field).clone())
                    .unwrap_or_default(),
            };
            let json = serde_json::to_value(&value).unwrap_or(JsonValue::Null);
            out.insert(binding.param.to_string(), json);
        }
        JsonValue::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{all_modules, find_module};
    use crate::mapper::verify_bindings;

    #[test]
    fn registry_contains_shipped_modules() {
        let names: Vec<&str> = all_modules().iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["gre_tunnel", "ha"]);
    }

    #[test]
    fn lookup_accepts_dashed_names() {
        assert!(find_module("gre-tunnel").is_some());
        assert!(find_module("vlan").is_none());
    }

    #[test]
    fn every_module_passes_binding_audit() {
        for module in all_modules() {
            verify_bindings(module).unwrap_or_else(|e| panic!("{}: {e}", module.name));
        }
    }
}
