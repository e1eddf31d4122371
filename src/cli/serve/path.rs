//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

use crate::config::{ServeConfig, StaticMapping};
use crate::utils::path::is_traversal;

/// Where a request path leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    File(PathBuf),
    /// The decoded path climbs out of its root.
    Forbidden,
    /// Nothing matched. Carries the decoded request path.
    NotFound(String),
}

/// Resolve a request URL against the index, the mappings and the fallback
/// directories, in that order.
///
/// Only the first mapping whose prefix matches is tried. A mapped directory
/// serves its `index.html`; the fallback search accepts files only.
pub fn resolve(url: &str, serve: &ServeConfig) -> Resolution {
    let request_path = normalize_url(url);

    if is_traversal(&request_path) {
        return Resolution::Forbidden;
    }

    if request_path == "/" || request_path == "/index.html" {
        return if serve.index.is_file() {
            Resolution::File(serve.index.clone())
        } else {
            Resolution::NotFound(request_path)
        };
    }

    match lookup_mapped(&request_path, &serve.mappings)
        .or_else(|| lookup_fallback(&request_path, &serve.fallback))
    {
        Some(path) => Resolution::File(path),
        None => Resolution::NotFound(request_path),
    }
}

/// Decode percent escapes and drop the query string.
pub fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8_lossy().into_owned();
    if decoded.starts_with('/') {
        decoded
    } else {
        format!("/{decoded}")
    }
}

fn lookup_mapped(request_path: &str, mappings: &[StaticMapping]) -> Option<PathBuf> {
    let mapping = mappings
        .iter()
        .find(|m| request_path.starts_with(m.prefix.as_str()))?;
    let relative = request_path[mapping.prefix.len()..].trim_start_matches('/');
    let local = mapping.dir.join(relative);

    if local.is_file() {
        return Some(local);
    }
    let index = local.join("index.html");
    (local.is_dir() && index.is_file()).then_some(index)
}

fn lookup_fallback(request_path: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    dirs.iter()
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.is_file())
}
