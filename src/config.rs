//! Configuration Management
//!
//! Reads the user configuration file for assetrunner.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct Config {
    /// GCP projects to collect GKE clusters from
    #[serde(default)]
    pub projects: Vec<String>,
    /// Kubeconfig context to collect from
    #[serde(default)]
    pub kube_context: Option<String>,
    /// NDJSON output file; stdout when unset
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("assetrunner").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Get effective projects (CLI > config > gcloud default).
    /// Empty means projects should be discovered from the API.
    pub fn effective_projects(&self, cli: &[String]) -> Vec<String> {
        if !cli.is_empty() {
            return cli.to_vec();
        }
        if !self.projects.is_empty() {
            return self.projects.clone();
        }
        crate::gcp::auth::get_default_project()
            .into_iter()
            .collect()
    }

    /// Get effective kube context (CLI > config)
    pub fn effective_kube_context(&self, cli: Option<&str>) -> Option<String> {
        cli.map(String::from).or_else(|| self.kube_context.clone())
    }

    /// Get effective output file (CLI > config)
    pub fn effective_output(&self, cli: Option<&Path>) -> Option<PathBuf> {
        cli.map(Path::to_path_buf).or_else(|| self.output.clone())
    }
}
