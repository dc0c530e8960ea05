//! HTTP request parsing and representation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::parser::error::Error;
use crate::parser::method::Method;

/// A single request header, kept exactly as the client spelled its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target without its query string
    pub uri: String,
    /// Everything after the first `?` in the target, or empty
    pub query: String,
    /// The headers in wire order; duplicates are separate entries
    pub headers: Vec<Header>,
    /// Absolute filesystem path, filled in by the resolver
    pub path: Option<PathBuf>,
    /// Numeric address of the client
    pub peer_host: String,
    /// Numeric port of the client
    pub peer_port: String,
}

impl HttpRequest {
    /// Create a new HTTP request.
    ///
    /// `target` is split at its first `?` into `uri` and `query`.
    pub fn new(method: Method, target: &str, headers: Vec<Header>) -> Self {
        let (uri, query) = match target.split_once('?') {
            Some((uri, query)) => (uri.to_string(), query.to_string()),
            None => (target.to_string(), String::new()),
        };

        Self {
            method,
            uri,
            query,
            headers,
            path: None,
            peer_host: String::new(),
            peer_port: String::new(),
        }
    }

    /// Record the numeric host and port of the client.
    pub fn set_peer(&mut self, addr: SocketAddr) {
        self.peer_host = addr.ip().to_string();
        self.peer_port = addr.port().to_string();
    }

    /// Get the value of the first header with the given name.
    ///
    /// Names are stored as received, so the lookup is case-insensitive.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// The request target as the client sent it, query included.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            self.uri.clone()
        } else {
            format!("{}?{}", self.uri, self.query)
        }
    }
}

/// Outcome of feeding one line to a [`RequestParser`].
enum Progress {
    NeedLine,
    Done,
}

/// Line-at-a-time request parser shared by the slice and stream front ends.
#[derive(Default)]
struct RequestParser {
    request_line: Option<(Method, String)>,
    headers: Vec<Header>,
}

impl RequestParser {
    fn feed(&mut self, line: &[u8]) -> Result<Progress, Error> {
        let line = std::str::from_utf8(line).map_err(|_| Error::InvalidEncoding)?;

        if self.request_line.is_none() {
            self.request_line = Some(parse_request_line(line)?);
            return Ok(Progress::NeedLine);
        }

        // Any line of at most two bytes, terminator included, closes the block.
        if line.len() <= 2 {
            return Ok(Progress::Done);
        }

        self.headers.push(parse_header(strip_line_terminator(line))?);
        Ok(Progress::NeedLine)
    }

    /// Build the request; end of stream inside the header block is accepted.
    fn finish(self) -> Result<HttpRequest, Error> {
        let (method, target) = self.request_line.ok_or(Error::EmptyRequest)?;
        Ok(HttpRequest::new(method, &target, self.headers))
    }
}

fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Split `METHOD TARGET [VERSION]` into its method and target.
///
/// The version token is tolerated but never inspected.
fn parse_request_line(line: &str) -> Result<(Method, String), Error> {
    let mut parts = line.split_whitespace();

    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(Error::MalformedRequestLine(strip_line_terminator(line).to_string()));
    };

    if target.starts_with('?') {
        return Err(Error::MalformedRequestLine(strip_line_terminator(line).to_string()));
    }

    let method = Method::from_str(method)?;
    Ok((method, target.to_string()))
}

/// Split a header line at its first `:`.
fn parse_header(line: &str) -> Result<Header, Error> {
    let Some((name, value)) = line.split_once(':') else {
        return Err(Error::MalformedHeader(line.to_string()));
    };

    let name = name.trim_end();
    if name.is_empty() {
        return Err(Error::MalformedHeader(line.to_string()));
    }

    Ok(Header::new(name, value.trim_start()))
}

/// Parse an HTTP request from a byte slice.
///
/// # Arguments
///
/// * `input` - A byte slice holding the request line and headers
///
/// # Returns
///
/// The parsed HTTP request, or an error if the request is invalid
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    let mut parser = RequestParser::default();

    for line in input.split_inclusive(|&b| b == b'\n') {
        if let Progress::Done = parser.feed(line)? {
            break;
        }
    }

    parser.finish()
}

/// Read an HTTP request from a buffered stream, one line at a time.
///
/// Reading stops at the blank line ending the header block, so any body
/// stays unread in `reader`.
///
/// # Arguments
///
/// * `reader` - The inbound half of the connection
/// * `max_line` - Longest accepted line, terminator included
pub async fn read_request<R>(reader: &mut R, max_line: usize) -> Result<HttpRequest, Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut parser = RequestParser::default();
    let mut line = Vec::with_capacity(256);

    loop {
        line.clear();
        let n = (&mut *reader).take(max_line as u64).read_until(b'\n', &mut line).await?;
        if n == 0 {
            break;
        }
        if n == max_line && !line.ends_with(b"\n") {
            return Err(Error::LineTooLong(max_line));
        }

        if let Progress::Done = parser.feed(&line)? {
            break;
        }
    }

    parser.finish()
}
