//! HTTP server implementation for spidey-rs.
//!
//! Connections are parsed with the [`crate::parser`] module, the target is
//! resolved under the document root, and one of three generators answers:
//! a directory listing, a static file, or a CGI script.

mod response;
mod config;
mod error;
mod handler;
mod http_server;
mod mimetypes;
mod resolver;

// Re-export public items
pub use response::{HttpResponse, ResponseWriter, StatusCode, CHUNK_SIZE};
pub use config::{ConcurrencyMode, ServerConfig};
pub use error::Error;
pub use handler::{cgi_environment, handle_browse, handle_cgi, handle_error, handle_file, render_listing};
pub use http_server::HttpServer;
pub use mimetypes::MimeTypes;
pub use resolver::{classify, resolve, ResourceKind};
