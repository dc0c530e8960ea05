//! Mapping request URIs onto the document root.

use std::path::{Path, PathBuf};

use crate::server::error::Error;

/// What a resolved path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Directory,
    File,
    Executable,
    Invalid,
}

/// Resolve `uri` against `root`, which must already be canonical.
///
/// The URI is percent-decoded and treated as relative to the root. `..`
/// segments that would climb above the root are rejected before touching the
/// filesystem, and the canonical result (symlinks followed) must still lie
/// under the root.
pub async fn resolve(root: &Path, uri: &str) -> Result<PathBuf, Error> {
    let decoded = urlencoding::decode(uri).map_err(|_| Error::NotFound(uri.to_string()))?;
    let mut relative = PathBuf::new();

    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if !relative.pop() {
                    return Err(Error::NotFound(uri.to_string()));
                }
            }
            _ if segment.contains('\0') => return Err(Error::NotFound(uri.to_string())),
            _ => relative.push(segment),
        }
    }

    let path = tokio::fs::canonicalize(root.join(&relative))
        .await
        .map_err(|_| Error::NotFound(uri.to_string()))?;

    if !path.starts_with(root) {
        return Err(Error::NotFound(uri.to_string()));
    }

    Ok(path)
}

/// Classify a path by inspecting the filesystem.
pub async fn classify(path: &Path) -> ResourceKind {
    let Ok(metadata) = tokio::fs::metadata(path).await else {
        return ResourceKind::Invalid;
    };

    if metadata.is_dir() {
        ResourceKind::Directory
    } else if metadata.is_file() {
        if is_executable(&metadata) {
            ResourceKind::Executable
        } else {
            ResourceKind::File
        }
    } else {
        ResourceKind::Invalid
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;

    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    false
}
