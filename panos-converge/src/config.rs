//! Parameter files and `--set` overrides.
//!
//! A parameter file is a flat TOML or JSON table of option names to scalar
//! values. Values are kept loosely typed here and converted to each option's
//! declared type during validation.

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;
use thiserror::Error;
use toml::Value as TomlValue;

use crate::params::ParameterSet;
use crate::value::Value;

/// Errors returned when loading parameters.
#[derive(Debug, Error)]
pub enum ParamsLoadError {
    #[error("failed to read parameters file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse parameters file {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("failed to parse parameters file {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("parameters file {path} must be a table of options")]
    NotATable { path: String },
    #[error("unsupported parameters file format: {path} (expected .toml or .json)")]
    UnknownFormat { path: String },
    #[error("option {name} in {path} must be a string, integer, or boolean")]
    NotScalar { path: String, name: String },
    #[error("invalid override {0:?} (expected key=value)")]
    InvalidOverride(String),
}

/// Load a flat option table from a `.toml` or `.json` file.
pub fn load_params(path: &Path) -> Result<ParameterSet, ParamsLoadError> {
    let display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ParamsLoadError::Io {
        path: display.clone(),
        source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => parse_toml(&raw, display),
        Some("json") => parse_json(&raw, display),
        _ => Err(ParamsLoadError::UnknownFormat { path: display }),
    }
}

fn parse_toml(raw: &str, path: String) -> Result<ParameterSet, ParamsLoadError> {
    let table: toml::Table = toml::from_str(raw).map_err(|source| ParamsLoadError::Toml {
        path: path.clone(),
        source,
    })?;

    let mut params = ParameterSet::new();
    for (name, value) in table {
        let value = match value {
            TomlValue::String(s) => Value::Str(s),
            TomlValue::Integer(i) => Value::Int(i),
            TomlValue::Boolean(b) => Value::Bool(b),
            _ => return Err(ParamsLoadError::NotScalar { path, name }),
        };
        params.insert(name, value);
    }
    Ok(params)
}

fn parse_json(raw: &str, path: String) -> Result<ParameterSet, ParamsLoadError> {
    let parsed: JsonValue = serde_json::from_str(raw).map_err(|source| ParamsLoadError::Json {
        path: path.clone(),
        source,
    })?;
    let JsonValue::Object(map) = parsed else {
        return Err(ParamsLoadError::NotATable { path });
    };

    let mut params = ParameterSet::new();
    for (name, value) in map {
        let value = match value {
            JsonValue::Null => Value::Absent,
            JsonValue::String(s) => Value::Str(s),
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => return Err(ParamsLoadError::NotScalar { path, name }),
            },
            _ => return Err(ParamsLoadError::NotScalar { path, name }),
        };
        params.insert(name, value);
    }
    Ok(params)
}

/// Parse `--set key=value` overrides. Values stay strings until validation.
pub fn parse_overrides(raw: &[String]) -> Result<ParameterSet, ParamsLoadError> {
    let mut params = ParameterSet::new();
    for item in raw {
        let (key, value) = item
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| ParamsLoadError::InvalidOverride(item.clone()))?;
        params.insert(key.trim(), Value::str(value));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{load_params, parse_overrides, ParamsLoadError};
    use crate::value::Value;

    #[test]
    fn loads_toml_scalars() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("gre.toml");
        fs::write(&path, "name = \"t1\"\nttl = 42\ncopy_tos = true\n").expect("write");

        let params = load_params(&path).expect("load");
        assert_eq!(params.get("name"), &Value::str("t1"));
        assert_eq!(params.get("ttl"), &Value::Int(42));
        assert_eq!(params.get("copy_tos"), &Value::Bool(true));
    }

    #[test]
    fn loads_json_and_treats_null_as_absent() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ha.json");
        fs::write(&path, r#"{"ha1_port": "ethernet1/1", "ha_peer_ip": null}"#).expect("write");

        let params = load_params(&path).expect("load");
        assert_eq!(params.get("ha1_port"), &Value::str("ethernet1/1"));
        assert!(params.get("ha_peer_ip").is_absent());
    }

    #[test]
    fn rejects_nested_values_and_unknown_extensions() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("nested.toml");
        fs::write(&nested, "[group]\nid = 1\n").expect("write");
        assert!(matches!(
            load_params(&nested),
            Err(ParamsLoadError::NotScalar { .. })
        ));

        let yaml = dir.path().join("params.yaml");
        fs::write(&yaml, "name: t1\n").expect("write");
        assert!(matches!(
            load_params(&yaml),
            Err(ParamsLoadError::UnknownFormat { .. })
        ));
    }

    #[test]
    fn overrides_split_on_first_equals() {
        let params =
            parse_overrides(&["ttl=42".to_string(), "name=a=b".to_string()]).expect("parse");
        assert_eq!(params.get("ttl"), &Value::str("42"));
        assert_eq!(params.get("name"), &Value::str("a=b"));
        assert!(parse_overrides(&["=x".to_string()]).is_err());
        assert!(parse_overrides(&["ttl".to_string()]).is_err());
    }
}
