mod cli;
mod kubernetes;
mod pod;
mod tool;
mod transport;
mod types;
mod utils;

use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Transport};
use kubernetes::{KubeCluster, initialize_client};
use pod::PodAccessor;
use tool::PodToolServer;
use transport::{serve_http, serve_stdio};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli);

    let client = initialize_client(cli.kubeconfig.as_deref(), cli.context.as_deref()).await?;
    let accessor = PodAccessor::new(KubeCluster::new(client), cli.accessor_config());
    info!(
        "Returning at most {} events and {} log lines per call",
        accessor.config().max_events,
        accessor.config().max_log_lines
    );

    let server = PodToolServer::new(Arc::new(accessor));
    match cli.transport {
        Transport::Http => serve_http(server, &cli.listen_addr()).await,
        Transport::Stdio => serve_stdio(server).await,
    }
}

fn init_tracing(cli: &Cli) {
    // stdout belongs to the stdio transport, so logs always go to stderr.
    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(cli.dev_mode)
        .with_ansi(cli.dev_mode)
        .with_file(cli.dev_mode)
        .with_line_number(cli.dev_mode)
        .with_writer(std::io::stderr)
        .init();
}
