//! Response generators for directories, static files and scripts, plus the
//! error responder.
//!
//! A generator either writes a complete response and reports its status, or
//! fails before writing anything so the caller can send an error page. Only a
//! failure after output has started (a broken connection, a crashing script)
//! leaves the response truncated.

use std::path::Path;
use std::process::Stdio;

use log::{debug, warn};
use tokio::fs::File;
use tokio::io::AsyncWrite;
use tokio::process::Command;

use crate::parser::HttpRequest;
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::mimetypes::MimeTypes;
use crate::server::response::{HttpResponse, ResponseWriter, StatusCode};

/// Request headers exported to scripts, with their variable names.
const CGI_HEADERS: [(&str, &str); 6] = [
    ("Host", "HTTP_HOST"),
    ("Accept", "HTTP_ACCEPT"),
    ("Accept-Language", "HTTP_ACCEPT_LANGUAGE"),
    ("Accept-Encoding", "HTTP_ACCEPT_ENCODING"),
    ("Connection", "HTTP_CONNECTION"),
    ("User-Agent", "HTTP_USER_AGENT"),
];

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the listing page for `uri` from entry names.
///
/// Names are sorted here; `.` never appears, `..` is expected to be among
/// `names` when the caller wants a parent link. Links carry the percent-encoded
/// name, the link text the HTML-escaped one.
pub fn render_listing(uri: &str, mut names: Vec<String>) -> String {
    names.sort();

    let base = if uri.ends_with('/') {
        uri.to_string()
    } else {
        format!("{uri}/")
    };

    let mut html = format!("<html><head><title>Index of {0}</title></head><body><h1>Index of {0}</h1><ul>", escape_html(uri));
    let base = escape_html(&base);
    for name in &names {
        let href = urlencoding::encode(name);
        html.push_str(&format!("<li><a href=\"{base}{href}\">{}</a></li>", escape_html(name)));
    }
    html.push_str("</ul></body></html>\n");
    html
}

/// List a directory as HTML.
pub async fn handle_browse<W>(
    request: &HttpRequest,
    path: &Path,
    writer: &mut ResponseWriter<'_, W>,
) -> Result<StatusCode, Error>
where
    W: AsyncWrite + Unpin,
{
    let not_found = |e: std::io::Error| {
        debug!("Cannot list {path}: {e}", path = path.display());
        Error::NotFound(request.uri.clone())
    };

    let mut entries = tokio::fs::read_dir(path).await.map_err(not_found)?;
    let mut names = vec!["..".to_string()];
    while let Some(entry) = entries.next_entry().await.map_err(not_found)? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    let response = HttpResponse::new(StatusCode::Ok).with_body_string(render_listing(&request.uri, names));
    writer.send(&response).await?;
    Ok(StatusCode::Ok)
}

/// Stream a file with the content type its extension maps to.
///
/// `text/plain` files are wrapped in `<pre>` and announced as `text/html`.
pub async fn handle_file<W>(
    request: &HttpRequest,
    path: &Path,
    mime_types: &MimeTypes,
    writer: &mut ResponseWriter<'_, W>,
) -> Result<StatusCode, Error>
where
    W: AsyncWrite + Unpin,
{
    let mut file = File::open(path).await.map_err(|e| {
        debug!("Cannot open {path}: {e}", path = path.display());
        Error::NotFound(request.uri.clone())
    })?;

    let content_type = mime_types.content_type(path);
    let preformatted = content_type == "text/plain";
    let declared = if preformatted { "text/html" } else { content_type };

    writer.write_head(StatusCode::Ok, declared).await?;
    if preformatted {
        writer.write_body(b"<pre>").await?;
    }
    writer.copy_from(&mut file).await?;
    if preformatted {
        writer.write_body(b"</pre>").await?;
    }

    Ok(StatusCode::Ok)
}

/// The environment passed to a script.
pub fn cgi_environment(request: &HttpRequest, path: &Path, config: &ServerConfig) -> Vec<(&'static str, String)> {
    let mut env = vec![
        ("GATEWAY_INTERFACE", "CGI/1.1".to_string()),
        ("SERVER_PROTOCOL", "HTTP/1.0".to_string()),
        ("SERVER_SOFTWARE", concat!("spidey-rs/", env!("CARGO_PKG_VERSION")).to_string()),
        ("DOCUMENT_ROOT", config.root.to_string_lossy().into_owned()),
        ("QUERY_STRING", request.query.clone()),
        ("REMOTE_ADDR", request.peer_host.clone()),
        ("REMOTE_PORT", request.peer_port.clone()),
        ("REQUEST_METHOD", request.method.to_string()),
        ("REQUEST_URI", request.target()),
        ("SCRIPT_FILENAME", path.to_string_lossy().into_owned()),
        ("SERVER_PORT", config.addr.port().to_string()),
    ];

    for header in &request.headers {
        if let Some((_, var)) = CGI_HEADERS.iter().find(|(name, _)| header.name.eq_ignore_ascii_case(name)) {
            env.retain(|(existing, _)| existing != var);
            env.push((*var, header.value.clone()));
        }
    }

    env
}

/// Run an executable and relay its standard output verbatim.
///
/// The script writes its own status line and headers.
pub async fn handle_cgi<W>(
    request: &HttpRequest,
    path: &Path,
    config: &ServerConfig,
    writer: &mut ResponseWriter<'_, W>,
) -> Result<StatusCode, Error>
where
    W: AsyncWrite + Unpin,
{
    let script = path.to_string_lossy().into_owned();

    let mut command = Command::new(path);
    command
        .envs(cgi_environment(request, path, config))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = path.parent() {
        command.current_dir(dir);
    }

    let mut child = command.spawn().map_err(|e| Error::ScriptLaunch(script.clone(), e))?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::InternalError(format!("stdout of {script} was not captured")))?;

    let copied = writer.copy_from(&mut stdout).await;
    drop(stdout);
    let status = child.wait().await?;
    let copied = copied?;

    if !status.success() {
        if copied == 0 {
            return Err(Error::ScriptFailed(script, status));
        }
        warn!("Script {script} exited with {status} after {copied} bytes");
    }

    Ok(StatusCode::Ok)
}

/// Send the error page for `status` unless a response has already started.
///
/// A broken connection is not reported; teardown notices it anyway.
pub async fn handle_error<W>(writer: &mut ResponseWriter<'_, W>, status: StatusCode) -> StatusCode
where
    W: AsyncWrite + Unpin,
{
    if writer.is_committed() {
        debug!("Response already started, not sending {status}");
        return status;
    }

    if let Err(e) = writer.send(&HttpResponse::error_page(status)).await {
        debug!("Could not send {status} page: {e}");
    }
    status
}
