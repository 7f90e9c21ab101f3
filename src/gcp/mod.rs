//! GCP API interaction module
//!
//! Authentication, the REST client and the GKE cluster collector.
//!
//! # Module Structure
//!
//! - [`auth`] - GCP authentication using Application Default Credentials
//! - [`client`] - Main GCP client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//! - [`projects`] - Project discovery
//! - [`gke`] - GKE cluster collector
//!
//! # Example
//!
//! ```ignore
//! use assetrunner::gcp::{client::GcpClient, gke};
//! use assetrunner::publisher::StdoutPublisher;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GcpClient::new().await?;
//!     let projects = vec!["my-project".to_string()];
//!     gke::collect_gke_assets(&client, &projects, &StdoutPublisher).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod gke;
pub mod http;
pub mod projects;

pub use http::format_gcp_error;
