//! Option schema and validation.
//!
//! Validation turns the caller's raw options into a typed [`Validated`] set
//! before anything else happens: unknown names, wrong types, bad choices,
//! out-of-range integers, missing required options and conflicting scope
//! options are all [`SchemaError`]s raised without touching the device.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::error::SchemaError;
use crate::modules::ModuleDef;
use crate::params::ParameterSet;
use crate::session::Scope;
use crate::value::{ParamType, Value};

/// Requested end state of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Present,
    Absent,
    Merged,
    Replaced,
    Deleted,
    Gathered,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Present => "present",
            State::Absent => "absent",
            State::Merged => "merged",
            State::Replaced => "replaced",
            State::Deleted => "deleted",
            State::Gathered => "gathered",
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(State::Present),
            "absent" => Ok(State::Absent),
            "merged" => Ok(State::Merged),
            "replaced" => Ok(State::Replaced),
            "deleted" => Ok(State::Deleted),
            "gathered" => Ok(State::Gathered),
            other => Err(other.to_string()),
        }
    }
}

/// Static default of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Str(s) => Value::str(s),
            DefaultValue::Int(i) => Value::Int(i),
            DefaultValue::Bool(b) => Value::Bool(b),
        }
    }
}

/// Allowed values of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choices {
    Any,
    Str(&'static [&'static str]),
    Int(&'static [i64]),
}

/// One flat option accepted by a module.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub default: Option<DefaultValue>,
    pub choices: Choices,
    pub range: Option<(i64, i64)>,
    pub required: bool,
    pub help: &'static str,
}

impl OptionSpec {
    /// An optional, unconstrained option without default.
    pub const fn new(name: &'static str, ty: ParamType, help: &'static str) -> Self {
        Self {
            name,
            ty,
            default: None,
            choices: Choices::Any,
            range: None,
            required: false,
            help,
        }
    }

    pub const fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn choices(mut self, choices: Choices) -> Self {
        self.choices = choices;
        self
    }

    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn check(&self, value: Value) -> Result<Value, SchemaError> {
        let value = value
            .coerce(self.ty)
            .map_err(|found| SchemaError::InvalidType {
                option: self.name.to_string(),
                expected: self.ty,
                found: found.to_string(),
            })?;

        match (&self.choices, &value) {
            (Choices::Str(allowed), Value::Str(s)) if !allowed.contains(&s.as_str()) => {
                return Err(SchemaError::InvalidChoice {
                    option: self.name.to_string(),
                    choices: allowed.join(", "),
                    got: s.clone(),
                });
            }
            (Choices::Int(allowed), Value::Int(i)) if !allowed.contains(i) => {
                let choices: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                return Err(SchemaError::InvalidChoice {
                    option: self.name.to_string(),
                    choices: choices.join(", "),
                    got: i.to_string(),
                });
            }
            _ => {}
        }

        if let (Some((min, max)), Value::Int(i)) = (self.range, &value) {
            if *i < min || *i > max {
                return Err(SchemaError::OutOfRange {
                    option: self.name.to_string(),
                    min,
                    max,
                    got: *i,
                });
            }
        }

        Ok(value)
    }
}

/// Where a bound option lands in the object tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Target {
    /// The root object's `entry` name.
    Identity,
    /// A field of the root object.
    Root,
    /// A field of the named child slot.
    Slot(&'static str),
}

/// Maps one flat option onto one object field.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub param: &'static str,
    pub target: Target,
    pub field: &'static str,
}

impl Binding {
    pub const fn identity(param: &'static str) -> Self {
        Self {
            param,
            target: Target::Identity,
            field: "name",
        }
    }

    pub const fn root(param: &'static str, field: &'static str) -> Self {
        Self {
            param,
            target: Target::Root,
            field,
        }
    }

    pub const fn slot(param: &'static str, slot: &'static str, field: &'static str) -> Self {
        Self {
            param,
            target: Target::Slot(slot),
            field,
        }
    }
}

pub const STATE: &str = "state";
pub const COMMIT: &str = "commit";
pub const TEMPLATE: &str = "template";
pub const TEMPLATE_STACK: &str = "template_stack";
pub const GATHERED_FILTER: &str = "gathered_filter";

/// Options that steer the invocation instead of configuring the object.
pub const CONTROL_OPTIONS: &[OptionSpec] = &[
    OptionSpec::new(STATE, ParamType::Str, "Desired state of the object."),
    OptionSpec::new(COMMIT, ParamType::Bool, "Commit the configuration if changed.")
        .default_value(DefaultValue::Bool(false)),
    OptionSpec::new(TEMPLATE, ParamType::Str, "Panorama template to operate in."),
    OptionSpec::new(TEMPLATE_STACK, ParamType::Str, "Panorama template stack to operate in."),
    OptionSpec::new(
        GATHERED_FILTER,
        ParamType::Str,
        "Select gathered objects: '*' or clauses like \"ttl > 10 and disabled == false\".",
    ),
];

pub fn is_control_option(name: &str) -> bool {
    CONTROL_OPTIONS.iter().any(|o| o.name == name)
}

/// Every option `module` accepts, object options first.
pub fn all_options(module: &ModuleDef) -> Vec<&'static OptionSpec> {
    module
        .options
        .iter()
        .chain(
            CONTROL_OPTIONS
                .iter()
                .filter(|o| o.name != GATHERED_FILTER || module.gathered_filter),
        )
        .collect()
}

/// Whether absent options receive their schema default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPolicy {
    Apply,
    Skip,
}

/// Options that passed validation, with the control options decoded.
#[derive(Debug, Clone)]
pub struct Validated {
    /// Every option of the module, defaults applied.
    pub params: ParameterSet,
    /// Names the caller supplied explicitly.
    pub explicit: BTreeSet<String>,
    pub state: State,
    pub commit: bool,
    pub scope: Scope,
    pub gathered_filter: Option<String>,
}

impl Validated {
    /// The parameters with every defaulted option reset to absent.
    pub fn explicit_only(&self) -> ParameterSet {
        self.params
            .iter()
            .map(|(name, value)| {
                let value = if self.explicit.contains(name) {
                    value.clone()
                } else {
                    Value::Absent
                };
                (name.to_string(), value)
            })
            .collect()
    }
}

/// Validate raw options against `module`'s schema.
pub fn validate(module: &ModuleDef, raw: &ParameterSet) -> Result<Validated, SchemaError> {
    let options = all_options(module);

    if let Some(unknown) = raw
        .names()
        .find(|name| !options.iter().any(|o| o.name == *name))
    {
        return Err(SchemaError::UnknownOption(unknown.to_string()));
    }

    let mut params = ParameterSet::new();
    let mut explicit = BTreeSet::new();
    for option in &options {
        let supplied = raw.get(option.name).clone();
        let value = if supplied.is_set() {
            explicit.insert(option.name.to_string());
            option.check(supplied)?
        } else {
            option.default.map(DefaultValue::to_value).unwrap_or_default()
        };
        params.insert(option.name, value);
    }

    let state = resolve_state(module, params.get(STATE))?;
    params.insert(STATE, state.as_str());

    if state != State::Gathered {
        let missing: Vec<&str> = module
            .options
            .iter()
            .filter(|o| o.required && params.get(o.name).is_absent())
            .map(|o| o.name)
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingRequired(missing.join(", ")));
        }
    }

    let scope = match (params.get(TEMPLATE), params.get(TEMPLATE_STACK)) {
        (Value::Str(_), Value::Str(_)) => {
            return Err(SchemaError::MutuallyExclusive(format!(
                "{TEMPLATE}, {TEMPLATE_STACK}"
            )));
        }
        (Value::Str(template), _) => Scope::Template(template.clone()),
        (_, Value::Str(stack)) => Scope::TemplateStack(stack.clone()),
        _ => Scope::Device,
    };

    let gathered_filter = params.get(GATHERED_FILTER).as_str().map(ToString::to_string);
    if gathered_filter.is_some() && state != State::Gathered {
        return Err(SchemaError::InvalidFilter(format!(
            "{GATHERED_FILTER} requires state=gathered"
        )));
    }

    Ok(Validated {
        commit: params.get(COMMIT).as_bool().unwrap_or(false),
        params,
        explicit,
        state,
        scope,
        gathered_filter,
    })
}

fn resolve_state(module: &ModuleDef, raw: &Value) -> Result<State, SchemaError> {
    let unsupported = |state: &str| SchemaError::UnsupportedState {
        module: module.name.to_string(),
        state: state.to_string(),
        supported: module
            .states
            .iter()
            .map(State::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    };

    let state = match raw.as_str() {
        None => module.default_state,
        Some(text) => text.parse::<State>().map_err(|s| unsupported(&s))?,
    };
    if !module.supports(state) {
        return Err(unsupported(state.as_str()));
    }
    Ok(state)
}
