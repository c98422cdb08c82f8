use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::{io, path::Path, path::PathBuf};
use tokio::fs;
use tracing::warn;

use super::address::Address;
use crate::error::Error as CrateError;

/// Name used for an address whose path is empty
const INDEX_SLUG: &str = "index";

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory that receives page and summary documents
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./docs_md"),
        }
    }
}

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<StorageError> for CrateError {
    fn from(err: StorageError) -> Self {
        CrateError::Storage(err.to_string())
    }
}

type Result<T> = std::result::Result<T, StorageError>;

/// Writes page documents and their summaries under the output directory
///
/// Clones share the record of which address wrote each document.
#[derive(Debug, Clone)]
pub struct Storage {
    config: StorageConfig,
    written: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage {
    /// Create a new storage with default configuration
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    /// Create a new storage with custom configuration
    pub fn with_config(config: StorageConfig) -> Self {
        Self {
            config,
            written: Arc::default(),
        }
    }

    /// Path of the page document for an address
    pub fn document_path(&self, address: &Address) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{}.md", slug(address)))
    }

    /// Path of the summary document for an address
    pub fn summary_path(&self, address: &Address) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{}.summary.md", slug(address)))
    }

    /// Writes the Markdown of a page, returning where it went
    ///
    /// Distinct addresses can share a slug; the later document replaces the
    /// earlier one and a warning is logged.
    pub async fn store_document(&self, address: &Address, markdown: &str) -> Result<PathBuf> {
        let path = self.document_path(address);
        if let Some(previous) = self.claim(&path, address) {
            warn!(
                "Overwriting {} (written for {}) with {}",
                path.display(),
                previous,
                address
            );
        }
        write_file(&path, markdown).await?;
        Ok(path)
    }

    /// Record `address` as the writer of `path`, returning the other address
    /// that wrote it earlier in this run, if any
    fn claim(&self, path: &Path, address: &Address) -> Option<String> {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        written
            .insert(path.to_path_buf(), address.as_str().to_string())
            .filter(|previous| previous != address.as_str())
    }

    /// Writes the summary of a page, returning where it went
    pub async fn store_summary(&self, address: &Address, summary: &str) -> Result<PathBuf> {
        let path = self.summary_path(address);
        write_file(&path, summary).await?;
        Ok(path)
    }
}

/// Filesystem-safe name derived from the path of an address
///
/// Leading and trailing slashes are trimmed and the remaining ones become
/// underscores, so `/a/b` maps to `a_b`. The empty path maps to `index`.
pub fn slug(address: &Address) -> String {
    let trimmed = address.path().trim_matches('/');
    if trimmed.is_empty() {
        return INDEX_SLUG.to_string();
    }

    trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

async fn write_file(path: &Path, contents: &str) -> Result<()> {
    let io_error = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    fs::write(path, contents).await.map_err(io_error)
}
