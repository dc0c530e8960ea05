//! Server configuration.

use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::server::error::Error;

/// How accepted connections are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMode {
    /// Accept, handle and close one connection at a time.
    #[default]
    #[value(alias = "single")]
    #[serde(alias = "single")]
    Sequential,
    /// Hand every accepted connection to its own task and keep accepting.
    #[value(alias = "forking")]
    #[serde(alias = "forking")]
    Forked,
}

/// HTTP server configuration.
///
/// Built once at startup and shared read-only with every connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The maximum number of connections handled at once in forked mode.
    pub max_connections: usize,
    /// The read buffer size, also the longest accepted request line.
    pub read_buffer_size: usize,
    /// Directory served as the document root.
    pub root: PathBuf,
    /// Path to a `mime.types` table.
    pub mime_types_path: PathBuf,
    /// Content type used when the table has no entry for an extension.
    pub default_mime_type: String,
    /// Connection scheduling strategy.
    pub mode: ConcurrencyMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9898)),
            max_connections: 1024,
            read_buffer_size: 8192,
            root: PathBuf::from("www"),
            mime_types_path: PathBuf::from("/etc/mime.types"),
            default_mime_type: "text/plain".to_string(),
            mode: ConcurrencyMode::Sequential,
        }
    }
}

impl ServerConfig {
    /// Load a configuration from a JSON file; missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Replace the listening port, keeping the bind address.
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    /// Check the values that cannot be expressed in the types alone.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_connections == 0 {
            return Err(Error::Config("max_connections must be at least 1".to_string()));
        }
        if self.read_buffer_size < 16 {
            return Err(Error::Config("read_buffer_size must be at least 16 bytes".to_string()));
        }
        if self.default_mime_type.trim().is_empty() {
            return Err(Error::Config("default_mime_type must not be empty".to_string()));
        }
        Ok(())
    }
}
