//! A minimal HTTP/1.0 origin server.
//!
//! spidey-rs serves a document root over plain HTTP: directories are listed,
//! regular files are streamed with a content type from a `mime.types` table,
//! and executable files are run as CGI scripts whose output goes straight to
//! the client.
//!
//! # Features
//!
//! - Line-oriented request parsing that keeps headers in wire order
//! - Containment of every request inside the document root
//! - Sequential or task-per-connection ("forked") concurrency
//! - CGI/1.1 environment for scripts
//!
//! # Examples
//!
//! ## Parsing a request
//!
//! ```
//! use spidey_rs::parse_request;
//!
//! let request = parse_request(b"GET /cgi-bin/env.sh?q=foo HTTP/1.0\r\nHost: localhost\r\n\r\n").unwrap();
//! assert_eq!(request.uri, "/cgi-bin/env.sh");
//! assert_eq!(request.query, "q=foo");
//! assert_eq!(request.get_header("host"), Some("localhost"));
//! ```
//!
//! ## Running the server
//!
//! ```no_run
//! use spidey_rs::{ConcurrencyMode, HttpServer, ServerConfig};
//!
//! # async fn run() -> Result<(), spidey_rs::ServerError> {
//! let config = ServerConfig {
//!     root: "www".into(),
//!     mode: ConcurrencyMode::Forked,
//!     ..ServerConfig::default()
//! };
//!
//! HttpServer::new(config)?.start().await
//! # }
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, Header, HttpRequest, Method, parse_request, read_request};
pub use server::{
    ConcurrencyMode, Error as ServerError, HttpResponse, HttpServer, MimeTypes, ResourceKind, ServerConfig,
    StatusCode,
};
