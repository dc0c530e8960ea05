//! Extension to content-type lookup backed by a `mime.types` table.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use log::{debug, warn};

/// Content-type table keyed by lowercase file extension.
#[derive(Debug, Clone)]
pub struct MimeTypes {
    by_extension: HashMap<String, String>,
    default_type: String,
}

impl MimeTypes {
    /// Parse a table in the `mime.types` format:
    ///
    /// ```text
    /// # comment
    /// text/html    html htm
    /// image/png    png
    /// ```
    ///
    /// The first type listed for an extension wins.
    pub fn parse(table: &str, default_type: impl Into<String>) -> Self {
        let mut by_extension = HashMap::new();

        for line in table.lines() {
            let line = line.split('#').next().unwrap_or("");
            let mut fields = line.split_whitespace();
            let Some(content_type) = fields.next() else {
                continue;
            };
            for ext in fields {
                by_extension
                    .entry(ext.to_ascii_lowercase())
                    .or_insert_with(|| content_type.to_string());
            }
        }

        Self {
            by_extension,
            default_type: default_type.into(),
        }
    }

    /// Read and parse a table file.
    pub fn load(path: &Path, default_type: impl Into<String>) -> io::Result<Self> {
        let table = std::fs::read_to_string(path)?;
        let types = Self::parse(&table, default_type);
        debug!("Loaded {n} extensions from {path}", n = types.len(), path = path.display());
        Ok(types)
    }

    /// Like [`MimeTypes::load`], but an unreadable table only logs a warning
    /// and leaves every lookup falling back to the default type.
    pub fn load_or_default(path: &Path, default_type: impl Into<String>) -> Self {
        let default_type = default_type.into();
        match Self::load(path, default_type.clone()) {
            Ok(types) => types,
            Err(e) => {
                warn!("Cannot read mimetype table {path}: {e}", path = path.display());
                Self::parse("", default_type)
            }
        }
    }

    /// Content type for `path` judged by its extension, or the default.
    pub fn content_type(&self, path: &Path) -> &str {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.by_extension.get(&ext.to_ascii_lowercase()))
            .map(String::as_str)
            .unwrap_or(self.default_type.as_str())
    }

    pub fn default_type(&self) -> &str {
        &self.default_type
    }

    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}
