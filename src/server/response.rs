//! HTTP response types and utilities.
//!
//! Every response is `HTTP/1.0` with a single `Content-Type` header and no
//! `Content-Length`; the client detects the end of the body when the
//! connection closes.

use std::fmt;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the chunks used when streaming bodies.
pub const CHUNK_SIZE: usize = 8192;

/// HTTP status codes with their standard reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    BadRequest = 400,
    NotFound = 404,
    InternalServerError = 500,
}

impl StatusCode {
    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Serialize a status line and the single content type header.
fn head_bytes(status: StatusCode, content_type: &str) -> Vec<u8> {
    format!("HTTP/1.0 {status}\r\nContent-Type: {content_type}\r\n\r\n").into_bytes()
}

/// A response whose body is fully built in memory.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP status code
    pub status: StatusCode,
    /// The value of the `Content-Type` header
    pub content_type: String,
    /// The response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new HTML response with the given status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: "text/html".to_string(),
            body: Vec::new(),
        }
    }

    /// The minimal HTML page sent for any non-success status.
    pub fn error_page(status: StatusCode) -> Self {
        Self::new(status).with_body_string(format!(
            "<html><head><title>{status}</title></head>\
             <body><h1>{status}</h1><hr><p>spidey-rs</p></body></html>\n"
        ))
    }

    /// Set the response body with a string.
    pub fn with_body_string(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self
    }

    /// Convert the response to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = head_bytes(self.status, &self.content_type);
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Writes one response to a connection and remembers whether any byte of it
/// has gone out, so a failed request never gets a second status line.
pub struct ResponseWriter<'a, W> {
    inner: &'a mut W,
    committed: bool,
}

impl<'a, W> ResponseWriter<'a, W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(inner: &'a mut W) -> Self {
        Self {
            inner,
            committed: false,
        }
    }

    /// Whether anything has been written yet.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Write the status line and headers of a streamed response.
    pub async fn write_head(&mut self, status: StatusCode, content_type: &str) -> io::Result<()> {
        self.write_body(&head_bytes(status, content_type)).await
    }

    /// Write raw bytes.
    pub async fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.committed = true;
        self.inner.write_all(bytes).await
    }

    /// Write a fully buffered response.
    pub async fn send(&mut self, response: &HttpResponse) -> io::Result<()> {
        self.write_body(&response.to_bytes()).await
    }

    /// Copy `reader` to the connection in [`CHUNK_SIZE`] pieces until it is
    /// exhausted, returning the number of bytes copied.
    pub async fn copy_from<R>(&mut self, reader: &mut R) -> io::Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut total = 0u64;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                return Ok(total);
            }
            self.write_body(&buf[..n]).await?;
            total += n as u64;
        }
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().await
    }
}
