//! Error types for the HTTP server.

use std::process::ExitStatus;

use thiserror::Error;

use crate::parser::Error as ParserError;
use crate::server::response::StatusCode;

/// Errors that can occur while serving a request or starting the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The requested resource does not exist or lies outside the root.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The script could not be started.
    #[error("Cannot launch script {0}: {1}")]
    ScriptLaunch(String, #[source] std::io::Error),

    /// The script exited unsuccessfully without producing any output.
    #[error("Script {0} failed with {1}")]
    ScriptFailed(String, ExitStatus),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// Invalid startup configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON configuration error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// The status reported to the client for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::ParseError(_) => StatusCode::BadRequest,
            Error::NotFound(_) => StatusCode::NotFound,
            Error::IoError(_)
            | Error::ScriptLaunch(..)
            | Error::ScriptFailed(..)
            | Error::InternalError(_)
            | Error::Config(_)
            | Error::JsonError(_) => StatusCode::InternalServerError,
        }
    }
}
