use crate::pod::{AccessorConfig, DEFAULT_MAX_EVENTS, DEFAULT_MAX_LOG_LINES};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "podlens")]
#[command(version)]
#[command(about = "MCP server for reading Kubernetes pod logs and events")]
pub struct Cli {
    /// Run with debug logging
    #[arg(short, long, env = "DEBUG")]
    pub debug: bool,

    /// Enables logging dev mode (colours, targets, source locations)
    #[arg(long, env = "DEV_MODE")]
    pub dev_mode: bool,

    /// Address to listen on; a bare `:port` listens on all interfaces
    #[arg(short, long, default_value = ":8081")]
    pub port: String,

    /// Kubeconfig to use for the API clients. Defaults to in-cluster config,
    /// then the usual kubeconfig locations.
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context
    #[arg(long)]
    pub context: Option<String>,

    /// How MCP clients connect
    #[arg(long, value_enum, default_value_t = Transport::Http)]
    pub transport: Transport,

    /// Maximum number of events returned per call
    #[arg(long, default_value_t = DEFAULT_MAX_EVENTS)]
    pub max_events: usize,

    /// Maximum number of log lines returned per call
    #[arg(long, default_value_t = DEFAULT_MAX_LOG_LINES)]
    pub max_log_lines: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Streamable HTTP at /mcp
    Http,
    /// stdin/stdout
    Stdio,
}

impl Cli {
    pub fn listen_addr(&self) -> String {
        if self.port.starts_with(':') {
            format!("0.0.0.0{}", self.port)
        } else {
            self.port.clone()
        }
    }

    pub fn accessor_config(&self) -> AccessorConfig {
        AccessorConfig::default()
            .with_max_events(self.max_events)
            .with_max_log_lines(self.max_log_lines)
    }
}
