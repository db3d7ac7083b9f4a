//! Error taxonomy for one module invocation.
//!
//! Each layer owns a `thiserror` enum. [`ConvergeError`] wraps them and
//! records which pipeline step failed, which decides whether a change may
//! already be live on the device (only for [`ErrorKind::CommitError`]).

use panos_xml::{ParseError, WriteError};
use serde::Serialize;
use thiserror::Error;

use crate::value::ParamType;

/// Invalid option combination, detected before any device contact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown module: {0}")]
    UnknownModule(String),
    #[error("unsupported parameter: {0}")]
    UnknownOption(String),
    #[error("argument {option} is of type {found} and could not be converted to {expected}")]
    InvalidType {
        option: String,
        expected: ParamType,
        found: String,
    },
    #[error("value of {option} must be one of: {choices}, got: {got}")]
    InvalidChoice {
        option: String,
        choices: String,
        got: String,
    },
    #[error("value of {option} must be between {min} and {max}, got: {got}")]
    OutOfRange {
        option: String,
        min: i64,
        max: i64,
        got: i64,
    },
    #[error("missing required arguments: {0}")]
    MissingRequired(String),
    #[error("parameters are mutually exclusive: {0}")]
    MutuallyExclusive(String),
    #[error("state '{state}' is not supported by {module}; expected one of: {supported}")]
    UnsupportedState {
        module: String,
        state: String,
        supported: String,
    },
    #[error("invalid gathered_filter: {0}")]
    InvalidFilter(String),
    #[error("invalid parameter binding in {module}: {message}")]
    Binding { module: String, message: String },
}

/// Failure reported by a device session.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("configuration is locked by another session ({path})")]
    Locked { path: String },
    #[error("scope {0} does not exist on the device")]
    MissingScope(String),
    #[error("cannot decode {kind}.{field}: {message}")]
    Decode {
        kind: String,
        field: String,
        message: String,
    },
    #[error("device rejected the request: {0}")]
    Rejected(String),
}

/// Which pipeline step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SchemaError,
    SessionError,
    RemoteFetchError,
    ApplyError,
    CommitError,
}

/// Fatal or reportable failure of a module invocation.
#[derive(Debug, Error)]
pub enum ConvergeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("session setup failed: {0}")]
    Session(String),
    #[error("Failed refresh: {0}")]
    RemoteFetch(DeviceError),
    #[error("Failed apply: {0}")]
    Apply(DeviceError),
    #[error("Failed commit: {0}")]
    Commit(DeviceError),
}

impl ConvergeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvergeError::Schema(_) => ErrorKind::SchemaError,
            ConvergeError::Session(_) => ErrorKind::SessionError,
            ConvergeError::RemoteFetch(_) => ErrorKind::RemoteFetchError,
            ConvergeError::Apply(_) => ErrorKind::ApplyError,
            ConvergeError::Commit(_) => ErrorKind::CommitError,
        }
    }
}

pub type ConvergeResult<T> = Result<T, ConvergeError>;
