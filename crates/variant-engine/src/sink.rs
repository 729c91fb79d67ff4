//! Persistence collaborators that receive finished variants.
//!
//! Storage is write-once per (page, tier) with last-write-wins semantics;
//! the engine adds no locking of its own on top of that contract.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::{DifficultyTier, PersistError};

/// Downstream collaborator for encoded PNG variants.
pub trait VariantSink: Send + Sync {
    fn produce_variant(
        &self,
        page_id: &str,
        tier: DifficultyTier,
        png: &[u8],
    ) -> impl Future<Output = Result<(), PersistError>> + Send;
}

/// Writes `<dir>/<page_id>_<tier>.png`.
///
/// Each write goes to its own uniquely named temporary file in `dir` which is
/// then renamed into place. Readers never observe a partial variant, and
/// overlapping writes to the same page and tier both succeed with the last
/// rename winning.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path for a page's tier.
    pub fn variant_path(&self, page_id: &str, tier: DifficultyTier) -> Result<PathBuf, PersistError> {
        validate_page_id(page_id)?;
        Ok(self.dir.join(format!("{page_id}_{tier}.png")))
    }
}

impl VariantSink for DirectorySink {
    async fn produce_variant(
        &self,
        page_id: &str,
        tier: DifficultyTier,
        png: &[u8],
    ) -> Result<(), PersistError> {
        let path = self.variant_path(page_id, tier)?;
        let dir = self.dir.clone();
        let target = path.clone();
        let bytes = png.to_vec();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &bytes))
            .await
            .map_err(|e| PersistError::Io {
                path: path.clone(),
                source: std::io::Error::other(e),
            })??;

        info!(page_id, %tier, path = %path.display(), bytes = png.len(), "Variant saved");
        Ok(())
    }
}

/// Write `bytes` to a fresh temporary file in `dir` and rename it to `path`.
///
/// The temporary file is removed if any step fails.
fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    std::fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".variant-")
        .suffix(".png.tmp")
        .tempfile_in(dir)
        .map_err(|source| io_error(dir, source))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|source| io_error(tmp.path(), source))?;
    tmp.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> PersistError {
    PersistError::Io {
        path: path.to_path_buf(),
        source,
    }
}

type VariantStore = Arc<RwLock<HashMap<(String, DifficultyTier), Vec<u8>>>>;

/// Keeps variants in memory, keyed by page and tier.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    storage: VariantStore,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, page_id: &str, tier: DifficultyTier) -> Option<Vec<u8>> {
        self.storage
            .read()
            .await
            .get(&(page_id.to_string(), tier))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.storage.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.storage.read().await.is_empty()
    }
}

impl VariantSink for MemorySink {
    async fn produce_variant(
        &self,
        page_id: &str,
        tier: DifficultyTier,
        png: &[u8],
    ) -> Result<(), PersistError> {
        validate_page_id(page_id)?;
        self.storage
            .write()
            .await
            .insert((page_id.to_string(), tier), png.to_vec());
        Ok(())
    }
}

/// Page ids become file names, so only `[A-Za-z0-9_-]` is allowed.
fn validate_page_id(page_id: &str) -> Result<(), PersistError> {
    let valid = !page_id.is_empty()
        && page_id.len() <= 128
        && page_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PersistError::InvalidPageId(page_id.to_string()))
    }
}
