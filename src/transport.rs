use crate::kubernetes::ClusterApi;
use crate::tool::PodToolServer;
use anyhow::Context;
use rmcp::ServiceExt;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Serve the tools over streamable HTTP at `http://<addr>/mcp` until ctrl-c.
pub async fn serve_http<C: ClusterApi + 'static>(
    server: PodToolServer<C>,
    addr: &str,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to listen on {}", addr))?;

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    serve_listener(server, listener, shutdown).await
}

/// Serve on an already bound listener until `shutdown` fires. Cancelling
/// also ends open SSE streams, so lingering clients cannot stall shutdown.
pub async fn serve_listener<C: ClusterApi + 'static>(
    server: PodToolServer<C>,
    listener: TcpListener,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            cancellation_token: shutdown.child_token(),
            ..Default::default()
        },
    );
    let router = axum::Router::new().nest_service("/mcp", service);

    info!(
        "Streamable HTTP server starting at http://{}/mcp",
        listener.local_addr()?
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("failed to start HTTP server")
}

/// Serve a single client over stdin/stdout. Logs must stay on stderr.
pub async fn serve_stdio<C: ClusterApi + 'static>(server: PodToolServer<C>) -> anyhow::Result<()> {
    info!("Starting MCP server with stdio transport");
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to initialize stdio session")?;
    let reason = service.waiting().await?;
    info!("stdio session ended: {:?}", reason);
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        return;
    }
    info!("Shutting down");
    shutdown.cancel();
}
