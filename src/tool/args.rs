use crate::types::PodIdentity;
use rmcp::model::JsonObject;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("required argument {0:?} not found")]
    Missing(&'static str),
    #[error("argument {0:?} is not a string")]
    NotAString(&'static str),
    #[error("argument {0:?} must not be empty")]
    Empty(&'static str),
}

/// Arguments shared by both pod tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodArgs {
    pub pod: PodIdentity,
    pub container: Option<String>,
}

impl PodArgs {
    pub fn extract(args: Option<&JsonObject>) -> Result<Self, ArgumentError> {
        let namespace = require_string(args, "namespace")?;
        let name = require_string(args, "pod")?;
        let container = optional_string(args, "container")?;
        Ok(Self {
            pod: PodIdentity::new(namespace, name),
            container: container.map(str::to_string),
        })
    }
}

pub fn require_string<'a>(
    args: Option<&'a JsonObject>,
    key: &'static str,
) -> Result<&'a str, ArgumentError> {
    match args.and_then(|a| a.get(key)) {
        None => Err(ArgumentError::Missing(key)),
        Some(Value::String(s)) if s.is_empty() => Err(ArgumentError::Empty(key)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ArgumentError::NotAString(key)),
    }
}

/// Absent, `null` and empty values all mean "not given".
pub fn optional_string<'a>(
    args: Option<&'a JsonObject>,
    key: &'static str,
) -> Result<Option<&'a str>, ArgumentError> {
    match args.and_then(|a| a.get(key)) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ArgumentError::NotAString(key)),
    }
}
