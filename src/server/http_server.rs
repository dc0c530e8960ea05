//! HTTP server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::signal;
use log::{debug, info, warn, error};

use crate::parser::{Error as ParserError, HttpRequest, read_request};
use crate::server::config::{ConcurrencyMode, ServerConfig};
use crate::server::error::Error;
use crate::server::handler;
use crate::server::mimetypes::MimeTypes;
use crate::server::resolver::{self, ResourceKind};
use crate::server::response::{ResponseWriter, StatusCode};

/// An HTTP server.
pub struct HttpServer {
    /// The server configuration, with `root` canonicalized.
    pub config: Arc<ServerConfig>,
    /// The content-type table.
    pub mime_types: Arc<MimeTypes>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Canonicalizes the document root and loads the mimetype table; a missing
    /// root is fatal, a missing table is not.
    pub fn new(mut config: ServerConfig) -> Result<Self, Error> {
        config.validate()?;
        config.root = std::fs::canonicalize(&config.root)
            .map_err(|e| Error::Config(format!("root {}: {e}", config.root.display())))?;
        if !config.root.is_dir() {
            return Err(Error::Config(format!("root {} is not a directory", config.root.display())));
        }

        let mime_types = MimeTypes::load_or_default(&config.mime_types_path, config.default_mime_type.clone());
        Ok(Self::with_mime_types(config, mime_types))
    }

    /// Create a server from an already canonical configuration and table.
    pub fn with_mime_types(config: ServerConfig, mime_types: MimeTypes) -> Self {
        Self {
            config: Arc::new(config),
            mime_types: Arc::new(mime_types),
        }
    }

    /// Log the effective configuration.
    fn display_server_info(&self) {
        info!("spidey-rs {version}", version = env!("CARGO_PKG_VERSION"));
        info!("  Root:         {}", self.config.root.display());
        info!("  Mode:         {:?}", self.config.mode);
        info!(
            "  Mimetypes:    {} ({} extensions, default {})",
            self.config.mime_types_path.display(),
            self.mime_types.len(),
            self.mime_types.default_type()
        );
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Server listening on http://{addr}", addr = self.config.addr);
        Ok(listener)
    }

    /// Handle accept errors; the acceptor always keeps going.
    async fn handle_accept_error(e: std::io::Error) {
        error!("Error accepting connection: {e}");

        // Typically descriptor exhaustion; give handlers a moment to finish
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }

    /// Start the server and listen for incoming connections.
    ///
    /// Sequential mode runs until the process is killed; forked mode also
    /// stops on Ctrl+C after draining active connections.
    pub async fn start(&self) -> Result<(), Error> {
        self.display_server_info();

        let listener = self.setup_listener().await?;

        match self.config.mode {
            ConcurrencyMode::Sequential => self.run_sequential(listener).await,
            ConcurrencyMode::Forked => {
                let shutdown = async {
                    match signal::ctrl_c().await {
                        Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
                        Err(e) => {
                            error!("Error setting up Ctrl+C handler: {e}");
                            std::future::pending::<()>().await;
                        }
                    }
                };
                self.run_forked(listener, shutdown).await
            }
        }
    }

    /// Accept, fully handle and close one connection at a time.
    pub async fn run_sequential(&self, listener: TcpListener) -> Result<(), Error> {
        loop {
            match listener.accept().await {
                Ok((socket, addr)) => {
                    info!("Accepted connection from {addr}");
                    if let Err(e) = Self::handle_connection(socket, addr, self.config.clone(), self.mime_types.clone()).await {
                        error!("Error handling connection from {addr}: {e}");
                    }
                }
                Err(e) => Self::handle_accept_error(e).await,
            }
        }
    }

    /// Hand every accepted connection to its own task until `shutdown`
    /// resolves, then wait for the tasks still running.
    ///
    /// At most `max_connections` tasks run at once; a connection arriving
    /// while all slots are taken is closed without a response.
    pub async fn run_forked<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down server...");
                    break;
                }

                Some(res) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = res {
                        error!("Connection task failed: {e}");
                    }
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => self.spawn_connection(socket, addr, &semaphore, &mut tasks),
                        Err(e) => Self::handle_accept_error(e).await,
                    }
                }
            }
        }

        Self::perform_shutdown(&mut tasks).await;
        Ok(())
    }

    /// Spawn a task for one connection, or drop it when no slot is free.
    fn spawn_connection(
        &self,
        socket: TcpStream,
        addr: SocketAddr,
        semaphore: &Arc<Semaphore>,
        tasks: &mut JoinSet<()>,
    ) {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, dropping connection from {addr}");
                drop(socket);
                return;
            }
        };

        info!("Accepted connection from {addr}");
        let config = self.config.clone();
        let mime_types = self.mime_types.clone();

        tasks.spawn(async move {
            // The permit is dropped when the task completes, releasing the slot
            let _permit = permit;

            if let Err(e) = Self::handle_connection(socket, addr, config, mime_types).await {
                error!("Error handling connection from {addr}: {e}");
            }
        });
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let _ = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        }).await;

        info!("Server shutdown complete");
    }

    /// Handle a single connection: parse, resolve, respond, close.
    ///
    /// Returns the status sent, or `None` when the peer disconnected without
    /// sending a request. Exactly one status line is written per request.
    pub async fn handle_connection<S>(
        socket: S,
        peer: SocketAddr,
        config: Arc<ServerConfig>,
        mime_types: Arc<MimeTypes>,
    ) -> Result<Option<StatusCode>, Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut stream = BufReader::new(socket);

        let parsed = read_request(&mut stream, config.read_buffer_size).await;
        let mut writer = ResponseWriter::new(&mut stream);

        let status = match parsed {
            Ok(mut request) => {
                request.set_peer(peer);
                let status = match Self::dispatch(&mut request, &mut writer, &config, &mime_types).await {
                    Ok(status) => status,
                    Err(e) => {
                        if writer.is_committed() {
                            warn!("{peer}: response to {uri} cut short: {e}", uri = request.uri);
                        } else {
                            debug!("{peer}: {e}");
                        }
                        handler::handle_error(&mut writer, e.status()).await
                    }
                };
                info!("{peer} \"{method} {uri}\" {code}", method = request.method, uri = request.target(), code = status.as_u16());
                status
            }
            Err(ParserError::EmptyRequest) => {
                debug!("{peer} closed the connection without sending a request");
                return Ok(None);
            }
            Err(e) => {
                warn!("{peer}: {e}");
                handler::handle_error(&mut writer, Error::from(e).status()).await
            }
        };

        // Teardown; a peer that already went away is not an error here
        if let Err(e) = writer.flush().await {
            debug!("{peer}: flush failed: {e}");
        }
        if let Err(e) = stream.shutdown().await {
            debug!("{peer}: shutdown failed: {e}");
        }

        Ok(Some(status))
    }

    /// Resolve the request and run the generator for its resource kind.
    async fn dispatch<W>(
        request: &mut HttpRequest,
        writer: &mut ResponseWriter<'_, W>,
        config: &ServerConfig,
        mime_types: &MimeTypes,
    ) -> Result<StatusCode, Error>
    where
        W: AsyncWrite + Unpin,
    {
        let path = resolver::resolve(&config.root, &request.uri).await?;
        let kind = resolver::classify(&path).await;
        request.path = Some(path.clone());
        debug!("{uri} -> {path} ({kind:?})", uri = request.uri, path = path.display());

        match kind {
            ResourceKind::Directory => handler::handle_browse(request, &path, writer).await,
            ResourceKind::File => handler::handle_file(request, &path, mime_types, writer).await,
            ResourceKind::Executable => handler::handle_cgi(request, &path, config, writer).await,
            ResourceKind::Invalid => Err(Error::NotFound(request.uri.clone())),
        }
    }
}
