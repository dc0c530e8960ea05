//! Error types for the HTTP request parser.

use thiserror::Error;

/// Errors that can occur while reading an HTTP request off the wire.
#[derive(Debug, Error)]
pub enum Error {
    /// The peer closed the connection before sending a request line.
    #[error("Empty request")]
    EmptyRequest,

    /// The request method is missing or is not a valid token.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request line is missing its method or target.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// A header line has no `:` separator.
    #[error("Malformed header line: {0}")]
    MalformedHeader(String),

    /// A line exceeded the configured read buffer size.
    #[error("Line exceeds {0} bytes")]
    LineTooLong(usize),

    /// A line was not valid UTF-8.
    #[error("Request line or header is not valid UTF-8")]
    InvalidEncoding,

    /// The stream failed while the request was being read.
    #[error("I/O error while reading request: {0}")]
    Io(#[from] std::io::Error),
}
