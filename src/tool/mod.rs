mod args;
mod server;

pub use args::PodArgs;
pub use server::PodToolServer;

use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::json;
use std::sync::Arc;

/// The tools this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodTool {
    Logs,
    Events,
}

impl PodTool {
    pub const ALL: [PodTool; 2] = [PodTool::Logs, PodTool::Events];

    pub fn name(self) -> &'static str {
        match self {
            PodTool::Logs => "get_pod_logs",
            PodTool::Events => "get_pod_events",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            PodTool::Logs => {
                "Read the logs of the given container of the given Kubernetes pod in the given namespace."
            }
            PodTool::Events => "Read the events of the given Kubernetes pod in the given namespace.",
        }
    }

    pub fn definition(self) -> Tool {
        Tool::new(self.name(), self.description(), pod_input_schema())
    }
}

fn pod_input_schema() -> Arc<JsonObject> {
    let schema = json!({
        "type": "object",
        "properties": {
            "namespace": {
                "type": "string",
                "description": "The Kubernetes namespace of the pod"
            },
            "pod": {
                "type": "string",
                "description": "The name of the Kubernetes pod"
            },
            "container": {
                "type": "string",
                "description": "The name of the container of the pod whose logs are being read"
            }
        },
        "required": ["namespace", "pod"]
    });
    Arc::new(schema.as_object().cloned().unwrap_or_default())
}

/// Outcome of a tool call. Errors travel in-band as a successful protocol
/// response flagged `isError`, never as a transport fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResponse {
    Text(String),
    Error(String),
}

impl From<ToolResponse> for CallToolResult {
    fn from(response: ToolResponse) -> Self {
        match response {
            ToolResponse::Text(text) => CallToolResult::success(vec![Content::text(text)]),
            ToolResponse::Error(message) => CallToolResult::error(vec![Content::text(message)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_round_trip() {
        assert_eq!(PodTool::from_name("get_pod_logs"), Some(PodTool::Logs));
        assert_eq!(PodTool::from_name("get_pod_events"), Some(PodTool::Events));
        assert_eq!(PodTool::from_name("delete_pod"), None);
    }

    #[test]
    fn test_definition_schema() {
        let tool = PodTool::Events.definition();
        assert_eq!(tool.name, "get_pod_events");

        let schema = &tool.input_schema;
        assert_eq!(schema["required"], json!(["namespace", "pod"]));
        let properties = schema["properties"].as_object().unwrap();
        for key in ["namespace", "pod", "container"] {
            assert_eq!(properties[key]["type"], "string", "{}", key);
        }
    }

    #[test]
    fn test_error_response_is_flagged() {
        let result: CallToolResult = ToolResponse::Error("failed to look up pod".into()).into();
        let encoded = serde_json::to_value(&result).unwrap();
        assert_eq!(encoded["isError"], true);
        assert_eq!(encoded["content"][0]["type"], "text");
        assert_eq!(encoded["content"][0]["text"], "failed to look up pod");
    }

    #[test]
    fn test_text_response() {
        let result: CallToolResult = ToolResponse::Text("fake logs".into()).into();
        let encoded = serde_json::to_value(&result).unwrap();
        assert_ne!(encoded["isError"], true);
        assert_eq!(encoded["content"][0]["text"], "fake logs");
    }
}
