//! Where dataset payloads come from.
//!
//! The catalog only needs "GET a JSON document by URL path". Two sources
//! implement that:
//!
//! | Source       | Backing                                   |
//! |--------------|-------------------------------------------|
//! | `FsSource`   | a static root directory (`public/`)       |
//! | `HttpSource` | a running site, e.g. the dev server       |

use super::LoadError;
use futures::future::BoxFuture;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Prefix selecting the per-category collection.
pub const CATEGORY_PREFIX: &str = "category_";

/// URL path of the document backing `category`.
///
/// `category_<name>` lives under `/data/categories/`; everything else is a
/// flat named dataset under `/data/`.
pub fn dataset_path(category: &str) -> String {
    match category.strip_prefix(CATEGORY_PREFIX) {
        Some(name) => format!("/data/categories/{name}.json"),
        None => format!("/data/{category}.json"),
    }
}

/// A read-only JSON endpoint.
pub trait DataSource: Send + Sync {
    /// Fetch the raw body at `path` (an absolute URL path like `/data/x.json`).
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>, LoadError>>;
}

// ============================================================================
// filesystem
// ============================================================================

/// Serves URL paths from a directory, `/data/x.json` → `<root>/data/x.json`.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn local_path(&self, path: &str) -> Option<PathBuf> {
        let relative = path.trim_start_matches('/');
        if relative.split(['/', '\\']).any(|part| part == "..") {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl DataSource for FsSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>, LoadError>> {
        Box::pin(async move {
            let local = self.local_path(path).ok_or_else(|| LoadError::Status {
                path: path.to_string(),
                status: 403,
            })?;
            tokio::fs::read(&local).await.map_err(|err| match err.kind() {
                ErrorKind::NotFound => LoadError::not_found(path),
                _ => LoadError::Io {
                    path: path.to_string(),
                    message: err.to_string(),
                },
            })
        })
    }
}

// ============================================================================
// http
// ============================================================================

/// Fetches URL paths relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base: url::Url,
    client: reqwest::Client,
}

impl HttpSource {
    /// The base is treated as a directory, so `https://host/site` and
    /// `https://host/site/` fetch from the same place.
    pub fn new(mut base: url::Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            base,
            client: reqwest::Client::new(),
        }
    }

    /// Parse `base` (e.g. `http://127.0.0.1:3000`) into a source.
    pub fn parse(base: &str) -> Result<Self, url::ParseError> {
        url::Url::parse(base).map(Self::new)
    }

    fn url_for(&self, path: &str) -> Result<url::Url, url::ParseError> {
        self.base.join(path.trim_start_matches('/'))
    }
}

impl DataSource for HttpSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>, LoadError>> {
        Box::pin(async move {
            let http_err = |message: String| LoadError::Http {
                path: path.to_string(),
                message,
            };

            let url = self.url_for(path).map_err(|e| http_err(e.to_string()))?;
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| http_err(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    path: path.to_string(),
                    status: status.as_u16(),
                });
            }

            let body = response.bytes().await.map_err(|e| http_err(e.to_string()))?;
            Ok(body.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dataset_path() {
        assert_eq!(
            dataset_path("category_basic_sciences"),
            "/data/categories/basic_sciences.json"
        );
        assert_eq!(dataset_path("learning_paths"), "/data/learning_paths.json");
        // prefix only counts at the start
        assert_eq!(dataset_path("my_category_x"), "/data/my_category_x.json");
    }

    #[tokio::test]
    async fn test_fs_source_reads_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("data/categories")).unwrap();
        fs::write(dir.path().join("data/categories/a.json"), b"{}").unwrap();

        let source = FsSource::new(dir.path());
        let body = source.fetch("/data/categories/a.json").await.unwrap();
        assert_eq!(body, b"{}");
    }

    #[tokio::test]
    async fn test_fs_source_missing_file_is_404() {
        let dir = TempDir::new().unwrap();
        let source = FsSource::new(dir.path());
        let err = source.fetch("/data/nope.json").await.unwrap_err();
        assert_eq!(err, LoadError::not_found("/data/nope.json"));
    }

    #[tokio::test]
    async fn test_fs_source_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let source = FsSource::new(dir.path());
        let err = source.fetch("/data/../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 403, .. }));
    }

    #[test]
    fn test_http_source_joins_path() {
        let source = HttpSource::parse("http://127.0.0.1:3000").unwrap();
        let url = source.url_for("/data/learning_paths.json").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/data/learning_paths.json");
    }

    #[test]
    fn test_http_source_keeps_site_prefix() {
        for base in [
            "https://example.github.io/medical-learning-guide/",
            "https://example.github.io/medical-learning-guide",
        ] {
            let source = HttpSource::parse(base).unwrap();
            let url = source.url_for("/data/categories/a.json").unwrap();
            assert_eq!(
                url.as_str(),
                "https://example.github.io/medical-learning-guide/data/categories/a.json"
            );
        }
    }
}
