//! Node assets

use crate::asset::{self, entity_name, AssetOption, MetaMap, MetaValue, TYPE_HOST, TYPE_K8S_NODE};
use crate::error::Result;
use crate::gcp::gke::region_from_zone;
use crate::publisher::Publisher;
use k8s_openapi::api::core::v1::{Node, NodeSystemInfo};

/// Cloud instance backing a node, parsed from `spec.providerID`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudInstance {
    pub provider: String,
    pub region: Option<String>,
    pub instance_id: String,
}

/// Parse a provider id such as `aws:///us-east-2b/i-0699b78f46f0fa248` or
/// `gce://my-project/us-central1-a/gke-node-1`
pub fn parse_provider_id(provider_id: &str) -> Option<CloudInstance> {
    let (scheme, rest) = provider_id.split_once("://")?;
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    let instance_id = segments.last()?.to_string();

    let (provider, region) = match scheme {
        "aws" => {
            let region = segments
                .iter()
                .rev()
                .nth(1)
                .map(|zone| aws_region_from_zone(zone));
            ("aws", region)
        }
        "gce" => {
            let region = segments
                .iter()
                .rev()
                .nth(1)
                .map(|zone| region_from_zone(zone));
            ("gcp", region)
        }
        "azure" => ("azure", None),
        other if !other.is_empty() => (other, None),
        _ => return None,
    };

    Some(CloudInstance {
        provider: provider.to_string(),
        region,
        instance_id,
    })
}

/// `us-east-2b` -> `us-east-2`
fn aws_region_from_zone(zone: &str) -> String {
    match zone.char_indices().last() {
        Some((idx, c)) if c.is_ascii_lowercase() && idx > 0 => zone[..idx].to_string(),
        _ => zone.to_string(),
    }
}

fn node_options(node: &Node) -> Option<Vec<AssetOption>> {
    let uid = node.metadata.uid.clone().filter(|u| !u.is_empty())?;
    let name = node.metadata.name.clone().unwrap_or_default();
    let provider_id = node.spec.as_ref().and_then(|s| s.provider_id.clone());
    let start_time = node.metadata.creation_timestamp.as_ref().map(|t| t.0);

    let mut options = vec![
        asset::with_type_and_id(TYPE_K8S_NODE, uid),
        asset::with_labels(node.metadata.labels.clone().unwrap_or_default()),
    ];

    let instance = provider_id.as_deref().and_then(parse_provider_id);
    match instance {
        Some(instance) => {
            options.push(asset::with_cloud_provider(instance.provider));
            if let Some(region) = instance.region {
                options.push(asset::with_region(region));
            }
            options.push(asset::with_parents(vec![entity_name(
                TYPE_HOST,
                &instance.instance_id,
            )]));
        }
        None => options.push(asset::with_parents(Vec::new())),
    }

    options.push(asset::with_node_data(name, provider_id, start_time));

    if let Some(info) = node.status.as_ref().and_then(|s| s.node_info.as_ref()) {
        let system = system_info(info);
        if !system.is_empty() {
            options.push(asset::with_metadata(MetaMap::from([(
                "node_info".to_string(),
                MetaValue::Map(system),
            )])));
        }
    }

    Some(options)
}

/// Kubelet system info worth keeping; empty fields are left out
fn system_info(info: &NodeSystemInfo) -> MetaMap {
    [
        ("architecture", &info.architecture),
        ("kernel_version", &info.kernel_version),
        ("operating_system", &info.operating_system),
        ("os_image", &info.os_image),
        ("kubelet_version", &info.kubelet_version),
        ("container_runtime_version", &info.container_runtime_version),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(key, value)| (key.to_string(), MetaValue::from(value.as_str())))
    .collect()
}

/// Publish one asset per node; nodes without a uid are skipped
pub fn publish_nodes(nodes: &[Node], sink: &dyn Publisher) -> Result<usize> {
    let mut published = 0;

    for node in nodes {
        let Some(options) = node_options(node) else {
            tracing::warn!("Skipping node {:?}: no uid", node.metadata.name);
            continue;
        };
        asset::publish(sink, options)?;
        published += 1;
    }

    Ok(published)
}
