use super::{PodArgs, PodTool, ToolResponse};
use crate::kubernetes::ClusterApi;
use crate::pod::PodAccessor;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// MCP handler for the pod tools. Stateless apart from the shared accessor,
/// so every transport session can hold its own clone.
pub struct PodToolServer<C> {
    pods: Arc<PodAccessor<C>>,
}

impl<C> Clone for PodToolServer<C> {
    fn clone(&self) -> Self {
        Self {
            pods: Arc::clone(&self.pods),
        }
    }
}

impl<C: ClusterApi> PodToolServer<C> {
    pub fn new(pods: Arc<PodAccessor<C>>) -> Self {
        Self { pods }
    }

    pub fn tools() -> Vec<Tool> {
        PodTool::ALL.into_iter().map(PodTool::definition).collect()
    }

    /// Run one tool call. Bad arguments and cluster failures both come back
    /// as [`ToolResponse::Error`].
    pub async fn dispatch(&self, tool: PodTool, args: Option<&JsonObject>) -> ToolResponse {
        let handler = tool.name();
        debug!(handler, "received request");

        let args = match PodArgs::extract(args) {
            Ok(args) => args,
            Err(e) => {
                debug!(handler, "rejecting arguments: {}", e);
                return ToolResponse::Error(e.to_string());
            }
        };

        let result = match tool {
            PodTool::Logs => {
                self.pods
                    .get_logs(&args.pod, args.container.as_deref())
                    .await
            }
            // Events are pod scoped, a container narrows nothing here.
            PodTool::Events => self.pods.get_events(&args.pod).await,
        };

        match result {
            Ok(payload) => ToolResponse::Text(String::from_utf8_lossy(&payload).into_owned()),
            Err(e) => {
                debug!(handler, pod = %args.pod, "request failed: {:#}", e);
                ToolResponse::Error(format!("{:#}", e))
            }
        }
    }

    /// Like [`dispatch`](Self::dispatch), but abandons the cluster call as
    /// soon as `ct` fires.
    pub async fn dispatch_until_cancelled(
        &self,
        tool: PodTool,
        args: Option<&JsonObject>,
        ct: &CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        tokio::select! {
            biased;
            _ = ct.cancelled() => {
                debug!(handler = tool.name(), "request cancelled");
                Err(McpError::internal_error("request cancelled", None))
            }
            response = self.dispatch(tool, args) => Ok(response.into()),
        }
    }
}

impl<C: ClusterApi + 'static> ServerHandler for PodToolServer<C> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Read-only Kubernetes diagnostics. Use get_pod_logs for the tail of a pod's \
                 log and get_pod_events for the events recorded against a pod."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(Self::tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = PodTool::from_name(&request.name).ok_or_else(|| {
            McpError::invalid_params(format!("unknown tool: {}", request.name), None)
        })?;
        // rmcp only cancels the token; the handler future keeps running otherwise.
        self.dispatch_until_cancelled(tool, request.arguments.as_ref(), &context.ct)
            .await
    }
}
