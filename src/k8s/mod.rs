//! Kubernetes collectors
//!
//! Publishes nodes, pods and containers of one cluster as assets. Pods
//! point at the node they run on and containers at their pod.
//!
//! # Module Structure
//!
//! - [`nodes`] - `k8s.node` assets
//! - [`pods`] - `k8s.pod` assets
//! - [`containers`] - `k8s.container` assets

pub mod containers;
pub mod nodes;
pub mod pods;

use crate::error::{CollectError, Result};
use crate::publisher::Publisher;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::ListParams;
use kube::config::KubeConfigOptions;
use kube::{Api, Client, Config};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt::Debug;

/// Page size for list calls
const LIST_PAGE_SIZE: u32 = 500;

/// Lists the cluster objects the collectors need
#[async_trait]
pub trait KubeLister: Send + Sync {
    async fn list_nodes(&self) -> anyhow::Result<Vec<Node>>;
    async fn list_pods(&self) -> anyhow::Result<Vec<Pod>>;
}

/// [`KubeLister`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    /// Connect using the kubeconfig (optionally a specific context), or the
    /// in-cluster service account when no kubeconfig is available
    pub async fn new(context: Option<&str>) -> Result<Self> {
        let client = match context {
            Some(context) => {
                let options = KubeConfigOptions {
                    context: Some(context.to_string()),
                    ..Default::default()
                };
                let config = Config::from_kubeconfig(&options)
                    .await
                    .map_err(|e| CollectError::Config(format!("Failed to load kubeconfig: {e}")))?;
                Client::try_from(config)?
            }
            None => Client::try_default().await?,
        };

        Ok(Self { client })
    }
}

async fn list_paged<K>(api: Api<K>) -> anyhow::Result<Vec<K>>
where
    K: kube::Resource + Clone + DeserializeOwned + Debug,
{
    let mut items = Vec::new();
    let mut continue_token: Option<String> = None;

    loop {
        let mut params = ListParams::default().limit(LIST_PAGE_SIZE);
        if let Some(token) = &continue_token {
            params = params.continue_token(token);
        }

        let page = api.list(&params).await?;
        items.extend(page.items);

        match page.metadata.continue_ {
            Some(token) if !token.is_empty() => continue_token = Some(token),
            _ => break,
        }
    }

    Ok(items)
}

#[async_trait]
impl KubeLister for KubeClient {
    async fn list_nodes(&self) -> anyhow::Result<Vec<Node>> {
        list_paged(Api::<Node>::all(self.client.clone())).await
    }

    async fn list_pods(&self) -> anyhow::Result<Vec<Pod>> {
        // Pods are namespaced; `Api::all` lists across every namespace
        list_paged(Api::<Pod>::all(self.client.clone())).await
    }
}

/// Collect and publish nodes, pods and containers.
///
/// The first listing or publish error aborts the pass. Returns the number
/// of published assets.
pub async fn collect_k8s_assets(lister: &dyn KubeLister, sink: &dyn Publisher) -> Result<usize> {
    let nodes = lister
        .list_nodes()
        .await
        .map_err(|source| listing_error("nodes", source))?;
    tracing::info!("Found {} nodes", nodes.len());

    let mut published = nodes::publish_nodes(&nodes, sink)?;

    // Pods reference nodes by name; parents are expressed by node uid
    let node_uids: HashMap<String, String> = nodes
        .iter()
        .filter_map(|n| {
            let uid = n.metadata.uid.clone().filter(|u| !u.is_empty())?;
            Some((n.metadata.name.clone()?, uid))
        })
        .collect();

    let pods = lister
        .list_pods()
        .await
        .map_err(|source| listing_error("pods", source))?;
    tracing::info!("Found {} pods", pods.len());

    published += pods::publish_pods(&pods, &node_uids, sink)?;
    published += containers::publish_containers(&pods, sink)?;

    Ok(published)
}

fn listing_error(kind: &'static str, source: anyhow::Error) -> CollectError {
    CollectError::Listing {
        kind,
        scope: "kubernetes cluster".to_string(),
        source,
    }
}
