//! GKE cluster collector
//!
//! Publishes one `k8s.cluster` asset per GKE cluster found in the
//! configured projects.

use super::client::GcpClient;
use crate::asset::{self, AssetOption, MetaMap, MetaValue, TYPE_K8S_CLUSTER};
use crate::error::{CollectError, Result};
use crate::publisher::Publisher;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const PROVIDER: &str = "gcp";

/// A cluster as returned by the GKE API (only the fields we use)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub zone: String,
    pub location: String,
    pub network: String,
    pub resource_labels: BTreeMap<String, String>,
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListClustersResponse {
    clusters: Vec<Cluster>,
    missing_zones: Vec<String>,
}

/// Lists the GKE clusters of one project
#[async_trait]
pub trait ClusterLister: Send + Sync {
    async fn list_clusters(&self, project: &str) -> anyhow::Result<Vec<Cluster>>;
}

#[async_trait]
impl ClusterLister for GcpClient {
    async fn list_clusters(&self, project: &str) -> anyhow::Result<Vec<Cluster>> {
        let url = self.container_location_url(project, "-", "clusters");
        let response: ListClustersResponse = self.get(&url).await?;

        if !response.missing_zones.is_empty() {
            tracing::warn!(
                "Cluster listing for {} is missing zones: {}",
                project,
                response.missing_zones.join(", ")
            );
        }

        Ok(response.clusters)
    }
}

/// Cluster attributes mapped for publishing
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerCluster {
    pub id: String,
    pub region: String,
    pub account: String,
    pub network: String,
    pub labels: BTreeMap<String, String>,
    pub metadata: MetaMap,
}

impl ContainerCluster {
    pub fn from_api(cluster: Cluster, project: &str) -> Self {
        // `zone` is deprecated by the API but still set; regional clusters only have `location`
        let zone = if cluster.zone.is_empty() {
            &cluster.location
        } else {
            &cluster.zone
        };

        Self {
            region: region_from_zone(zone),
            id: cluster.id,
            account: project.to_string(),
            network: cluster.network,
            labels: cluster.resource_labels,
            metadata: MetaMap::from([("state".to_string(), MetaValue::from(cluster.status))]),
        }
    }

    fn into_options(self) -> Vec<AssetOption> {
        let parents = if self.network.is_empty() {
            Vec::new()
        } else {
            vec![self.network]
        };

        vec![
            asset::with_cloud_provider(PROVIDER),
            asset::with_region(self.region),
            asset::with_account_id(self.account),
            asset::with_type_and_id(TYPE_K8S_CLUSTER, self.id),
            asset::with_parents(parents),
            asset::with_labels(self.labels),
            asset::with_metadata(self.metadata),
        ]
    }
}

/// Derive the region from a zone, e.g. `us-central1-a` -> `us-central1`.
///
/// Accepts bare names or resource URLs. Region-level names are returned
/// unchanged. Empty input, or a name with an empty region or suffix part
/// such as `-a` or `us-central1-`, gives an empty region.
pub fn region_from_zone(zone: &str) -> String {
    let name = zone.rsplit('/').next().unwrap_or(zone);

    match name.rsplit_once('-') {
        Some((region, suffix)) if region.is_empty() || suffix.is_empty() => String::new(),
        Some((region, suffix))
            if suffix.len() == 1 && suffix.chars().all(|c| c.is_ascii_lowercase()) =>
        {
            region.to_string()
        }
        _ => name.to_string(),
    }
}

/// Collect and publish every GKE cluster in `projects`.
///
/// Projects are walked in order. The first listing error aborts the pass:
/// assets already published stay published and remaining projects are
/// skipped. Returns the number of published assets.
pub async fn collect_gke_assets(
    lister: &dyn ClusterLister,
    projects: &[String],
    sink: &dyn Publisher,
) -> Result<usize> {
    let mut published = 0;

    for project in projects {
        let clusters = lister
            .list_clusters(project)
            .await
            .map_err(|source| CollectError::Listing {
                kind: "GKE clusters",
                scope: project.clone(),
                source,
            })?;

        tracing::info!("Found {} GKE clusters in {}", clusters.len(), project);

        for cluster in clusters {
            if cluster.id.is_empty() {
                tracing::warn!("Skipping GKE cluster '{}' in {}: no id", cluster.name, project);
                continue;
            }

            let cluster = ContainerCluster::from_api(cluster, project);
            asset::publish(sink, cluster.into_options())?;
            published += 1;
        }
    }

    Ok(published)
}
