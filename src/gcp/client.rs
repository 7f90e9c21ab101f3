//! GCP Client
//!
//! Main client for interacting with GCP APIs, combining authentication
//! and HTTP functionality.

use super::auth::{default_token_source, AccessToken};
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

const CONTAINER_ENDPOINT: &str = "https://container.googleapis.com";
const RESOURCE_MANAGER_ENDPOINT: &str = "https://cloudresourcemanager.googleapis.com";

/// Base URLs of the APIs the collectors talk to
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub container: String,
    pub resource_manager: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            container: CONTAINER_ENDPOINT.to_string(),
            resource_manager: RESOURCE_MANAGER_ENDPOINT.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every API at one base URL (used against emulators and mock servers)
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            container: base.to_string(),
            resource_manager: base.to_string(),
        }
    }
}

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    tokens: Arc<dyn AccessToken>,
    http: GcpHttpClient,
    endpoints: Endpoints,
}

impl GcpClient {
    /// Create a client using the default credentials chain
    pub async fn new() -> Result<Self> {
        let tokens = default_token_source()
            .await
            .context("Failed to initialize GCP credentials")?;

        Self::with_token_source(tokens, Endpoints::default())
    }

    /// Create a client with an explicit token source and endpoints
    pub fn with_token_source(tokens: Arc<dyn AccessToken>, endpoints: Endpoints) -> Result<Self> {
        Ok(Self {
            tokens,
            http: GcpHttpClient::new()?,
            endpoints,
        })
    }

    /// Make an authenticated GET request and decode the response
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let token = self.tokens.token().await?;
        self.http.get(url, &token).await
    }

    // =========================================================================
    // GKE API helpers
    // =========================================================================

    /// Build GKE API URL
    pub fn container_url(&self, project: &str, path: &str) -> String {
        format!(
            "{}/v1/projects/{}/{}",
            self.endpoints.container,
            urlencoding::encode(project),
            path
        )
    }

    /// Build GKE location URL; `-` matches every location
    pub fn container_location_url(&self, project: &str, location: &str, resource: &str) -> String {
        self.container_url(project, &format!("locations/{}/{}", location, resource))
    }

    // =========================================================================
    // Resource Manager API helpers
    // =========================================================================

    /// Build Resource Manager API URL
    pub fn resourcemanager_url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.endpoints.resource_manager, path)
    }
}
