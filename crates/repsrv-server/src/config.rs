use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use repsrv_types::Iri;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

const HTTP_SCHEME: &str = "http";
const HTTPS_SCHEME: &str = "https";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Mint `https` identifiers instead of `http`.
    pub https: bool,
    /// Host (optionally `host:port`) this server is authoritative for.
    pub host: String,
    /// Path under which newly created objects are named.
    pub new_path: String,
    pub tls: Option<TlsConfig>,
    pub actor_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            https: false,
            host: "localhost:8080".into(),
            new_path: "/new".into(),
            tls: None,
            actor_name: "Implementation Report Account".into(),
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file. Missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.host.trim().is_empty() {
            return Err(ServerError::Config("host must not be empty".into()));
        }
        if !self.new_path.starts_with('/') {
            return Err(ServerError::Config(format!(
                "new_path must start with '/', got {:?}",
                self.new_path
            )));
        }
        if self.tls.is_some() && !self.https {
            return Err(ServerError::Config(
                "a TLS certificate is configured but https is off".into(),
            ));
        }
        self.origin().map(|_| ())
    }

    pub fn scheme(&self) -> &'static str {
        if self.https {
            HTTPS_SCHEME
        } else {
            HTTP_SCHEME
        }
    }

    /// `{scheme}://{host}/`, the prefix shared by every identifier this
    /// server owns.
    pub fn origin(&self) -> ServerResult<Iri> {
        Ok(Iri::from_parts(self.scheme(), self.host.trim(), "/")?)
    }
}

/// PEM files for serving https directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}
