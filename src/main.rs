//! Command-line entry point for the spidey HTTP server.

use std::path::PathBuf;

use clap::Parser;
use log::error;

use spidey_rs::{ConcurrencyMode, HttpServer, ServerConfig};

/// Simple HTTP/1.0 server for directories, files and CGI scripts.
///
/// Flags override values read from `--config`; anything unset keeps its
/// built-in default.
#[derive(Debug, Parser)]
#[command(name = "spidey", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(long, env = "SPIDEY_CONFIG")]
    config: Option<PathBuf>,

    /// Concurrency mode
    #[arg(short = 'c', long = "concurrency", value_enum, ignore_case = true, env = "SPIDEY_MODE")]
    mode: Option<ConcurrencyMode>,

    /// Path to the mimetypes table
    #[arg(short = 'm', long = "mime-types", env = "SPIDEY_MIME_TYPES")]
    mime_types: Option<PathBuf>,

    /// Content type used when the table has no match
    #[arg(short = 'M', long = "default-mime", env = "SPIDEY_DEFAULT_MIME")]
    default_mime: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SPIDEY_PORT")]
    port: Option<u16>,

    /// Document root directory
    #[arg(short, long, env = "SPIDEY_ROOT")]
    root: Option<PathBuf>,

    /// Most connections handled at once in forked mode
    #[arg(long = "max-connections", env = "SPIDEY_MAX_CONNECTIONS")]
    max_connections: Option<usize>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, spidey_rs::ServerError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(path) = self.mime_types {
            config.mime_types_path = path;
        }
        if let Some(mime) = self.default_mime {
            config.default_mime_type = mime;
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(max) = self.max_connections {
            config.max_connections = max;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config()?;

    let server = match HttpServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!("{e}");
            return Err(e.into());
        }
    };

    server.start().await?;
    Ok(())
}
