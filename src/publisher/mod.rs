//! Publisher sinks
//!
//! A publisher accepts one finished asset at a time. What happens after
//! (buffering, batching, retries) is up to the implementation.

use crate::asset::Asset;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Accepts finished asset records
pub trait Publisher: Send + Sync {
    fn publish(&self, asset: Asset) -> Result<()>;
}

/// Writes newline-delimited JSON to stdout
#[derive(Debug, Default)]
pub struct StdoutPublisher;

impl Publisher for StdoutPublisher {
    fn publish(&self, asset: Asset) -> Result<()> {
        let line = serde_json::to_string(&asset).context("Failed to encode asset")?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", line).context("Failed to write asset to stdout")?;
        Ok(())
    }
}

/// Appends newline-delimited JSON to a file
pub struct FilePublisher {
    file: Mutex<File>,
}

impl FilePublisher {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open output file {}", path.display()))?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl Publisher for FilePublisher {
    fn publish(&self, asset: Asset) -> Result<()> {
        let line = serde_json::to_string(&asset).context("Failed to encode asset")?;
        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow::anyhow!("Output file lock poisoned"))?;
        writeln!(file, "{}", line).context("Failed to write asset to file")?;
        Ok(())
    }
}

/// Keeps published assets in memory
#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    assets: Mutex<Vec<Asset>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far
    pub fn assets(&self) -> Vec<Asset> {
        self.assets
            .lock()
            .map(|assets| assets.clone())
            .unwrap_or_default()
    }
}

impl Publisher for InMemoryPublisher {
    fn publish(&self, asset: Asset) -> Result<()> {
        self.assets
            .lock()
            .map_err(|_| anyhow::anyhow!("Publisher lock poisoned"))?
            .push(asset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{with_type_and_id, Asset};

    #[test]
    fn test_file_publisher_writes_ndjson() {
        let dir = std::env::temp_dir().join(format!("assetrunner-test-{}", std::process::id()));
        let path = dir.join("assets.ndjson");
        let _ = std::fs::remove_file(&path);

        let publisher = FilePublisher::open(&path).unwrap();
        publisher
            .publish(Asset::build(vec![with_type_and_id("k8s.node", "a")]))
            .unwrap();
        publisher
            .publish(Asset::build(vec![with_type_and_id("k8s.node", "b")]))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["asset.ean"], "k8s.node:a");
        assert_eq!(lines[1]["asset.ean"], "k8s.node:b");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
