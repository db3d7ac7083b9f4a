use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Declared type of an option or object field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Str,
    Int,
    Bool,
}

impl Display for ParamType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Str => "str",
            ParamType::Int => "int",
            ParamType::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A typed option or field value.
///
/// `Absent` means "not set" and never compares equal to `false`, `0`, or `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Absent,
    Str(String),
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn is_set(&self) -> bool {
        !self.is_absent()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Name of the value's runtime type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "null",
            Value::Str(_) => "str",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
        }
    }

    /// Convert a loosely typed value into `ty`.
    ///
    /// Strings are accepted for every type (`"42"`, `"yes"`, `"false"`), and
    /// scalars are accepted for strings, matching how flat option files and
    /// `--set key=value` overrides are written. `Absent` stays `Absent`.
    pub fn coerce(self, ty: ParamType) -> Result<Value, Value> {
        match (ty, self) {
            (_, Value::Absent) => Ok(Value::Absent),
            (ParamType::Str, Value::Str(s)) => Ok(Value::Str(s)),
            (ParamType::Str, Value::Int(i)) => Ok(Value::Str(i.to_string())),
            (ParamType::Str, Value::Bool(b)) => Ok(Value::Str(b.to_string())),
            (ParamType::Int, Value::Int(i)) => Ok(Value::Int(i)),
            (ParamType::Int, Value::Str(s)) => match s.trim().parse::<i64>() {
                Ok(i) => Ok(Value::Int(i)),
                Err(_) => Err(Value::Str(s)),
            },
            (ParamType::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
            (ParamType::Bool, Value::Str(s)) => match parse_bool(&s) {
                Some(b) => Ok(Value::Bool(b)),
                None => Err(Value::Str(s)),
            },
            (_, other) => Err(other),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => f.write_str("<unset>"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
