use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace and name of the pod a tool call targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PodIdentity {
    pub namespace: String,
    pub name: String,
}

impl PodIdentity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Trimmed view of a `core/v1` Event as returned to tool callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub reason: String,
    pub message: String,
    pub event_time: String,
    pub action: String,
    pub reporting_controller: String,
    pub reporting_instance: String,
    pub related: String,
    pub first_timestamp: String,
    pub last_timestamp: String,
}
