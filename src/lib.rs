//! Asset collection for GKE and Kubernetes
//!
//! Collectors list resources from provider APIs, describe each one as an
//! ordered list of [`asset::AssetOption`]s and publish the resulting
//! records to a [`publisher::Publisher`].

pub mod asset;
pub mod config;
pub mod error;
pub mod gcp;
pub mod k8s;
pub mod publisher;
