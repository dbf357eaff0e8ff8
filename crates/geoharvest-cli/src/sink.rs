//! Concrete sinks for finished collections

use async_trait::async_trait;
use geoharvest_core::models::OutputFeatureCollection;
use geoharvest_core::ports::FeatureSink;
use geoharvest_core::{HarvestError, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Writes the collection to a file, replacing it only once the new content is fully written
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".partial");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl FeatureSink for FileSink {
    async fn submit(&self, collection: &OutputFeatureCollection) -> Result<()> {
        let json = collection.to_json_pretty()?;
        let staging = self.staging_path();

        tokio::fs::write(&staging, json).await.map_err(|e| HarvestError::Sink {
            reason: format!("Failed to write {}: {}", staging.display(), e),
        })?;
        tokio::fs::rename(&staging, &self.path).await.map_err(|e| HarvestError::Sink {
            reason: format!("Failed to move output into {}: {}", self.path.display(), e),
        })?;

        tracing::debug!(path = %self.path.display(), features = collection.len(), "Wrote collection");
        Ok(())
    }
}

/// Writes the collection to stdout
pub struct StdoutSink;

#[async_trait]
impl FeatureSink for StdoutSink {
    async fn submit(&self, collection: &OutputFeatureCollection) -> Result<()> {
        let mut json = collection.to_json_pretty()?;
        json.push('\n');

        let mut stdout = tokio::io::stdout();
        stdout.write_all(json.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Sink selected from the command line
pub enum OutputSink {
    File(FileSink),
    Stdout(StdoutSink),
}

impl OutputSink {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => OutputSink::File(FileSink::new(path)),
            None => OutputSink::Stdout(StdoutSink),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            OutputSink::File(sink) => sink.path().display().to_string(),
            OutputSink::Stdout(_) => "stdout".to_string(),
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, OutputSink::Stdout(_))
    }
}

#[async_trait]
impl FeatureSink for OutputSink {
    async fn submit(&self, collection: &OutputFeatureCollection) -> Result<()> {
        match self {
            OutputSink::File(sink) => sink.submit(collection).await,
            OutputSink::Stdout(sink) => sink.submit(collection).await,
        }
    }
}
