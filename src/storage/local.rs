//! Local filesystem report storage.
//!
//! With `atomic` enabled the report is written to `{path}.tmp` and renamed
//! over the target, so a failed write leaves the previous report intact.
//! Without it the target is truncated and written in place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::OutputConfig;
use crate::storage::{ReportStorage, render_report};

/// Local filesystem report backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
    atomic: bool,
}

impl LocalStorage {
    /// Create a storage writing to `path` atomically.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            atomic: true,
        }
    }

    /// Create a storage from the `[output]` config section.
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            path: config.path.clone(),
            atomic: config.atomic,
        }
    }

    /// Toggle temp-file-and-rename writes.
    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// Report file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Create or truncate `path` and write `bytes`. The handle is closed on return.
    async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }

    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        if !self.atomic {
            return Self::write_file(&self.path, bytes).await;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Err(e) = Self::write_file(&tmp, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ReportStorage for LocalStorage {
    async fn write_report(&self, characters: &[char], symbol_table: &str) -> Result<()> {
        let report = render_report(characters, symbol_table);
        log::debug!(
            "Writing {} characters ({} bytes) to {}",
            characters.len(),
            report.len(),
            self.path.display()
        );
        self.write_bytes(report.as_bytes()).await
    }
}
