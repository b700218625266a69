use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use repsrv_server::{ServerConfig, TlsConfig};

#[derive(Parser)]
#[command(
    name = "repsrv",
    about = "Single-actor object server for federation conformance reports",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the server
    Serve(ServerArgs),
    /// Print the effective configuration as TOML
    Config(ServerArgs),
}

/// Flags layered over the configuration file, if any.
#[derive(Args, Debug, Default)]
pub struct ServerArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Mint https identifiers
    #[arg(long)]
    pub https: bool,
    /// Host (optionally host:port) this server is authoritative for
    #[arg(long)]
    pub host: Option<String>,
    /// Path under which new objects are named
    #[arg(long = "new-path")]
    pub new_path: Option<String>,
    /// TLS certificate (PEM); serve https directly
    #[arg(long, requires = "key")]
    pub cert: Option<PathBuf>,
    /// TLS private key file
    #[arg(long, requires = "cert")]
    pub key: Option<PathBuf>,
    /// Listen address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

impl ServerArgs {
    /// Load the configuration file (or defaults) and apply the flags on top.
    pub fn resolve(&self) -> anyhow::Result<ServerConfig> {
        let config = match &self.config {
            Some(path) => ServerConfig::from_path(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ServerConfig::default(),
        };
        let config = self.apply(config);
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if self.https {
            config.https = true;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(new_path) = &self.new_path {
            config.new_path = new_path.clone();
        }
        if let (Some(cert), Some(key)) = (&self.cert, &self.key) {
            config.tls = Some(TlsConfig {
                cert_path: cert.clone(),
                key_path: key.clone(),
            });
        }
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        config
    }
}
