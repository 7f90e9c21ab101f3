//! Pod assets

use super::containers::container_id;
use crate::asset::{
    self, entity_name, AssetOption, MetaMap, MetaValue, TYPE_K8S_CONTAINER, TYPE_K8S_NODE,
    TYPE_K8S_POD,
};
use crate::error::Result;
use crate::publisher::Publisher;
use k8s_openapi::api::core::v1::Pod;
use std::collections::HashMap;

fn pod_options(pod: &Pod, node_uids: &HashMap<String, String>) -> Option<Vec<AssetOption>> {
    let uid = pod.metadata.uid.clone().filter(|u| !u.is_empty())?;
    let name = pod.metadata.name.clone().unwrap_or_default();
    let namespace = pod.metadata.namespace.clone().unwrap_or_default();
    let status = pod.status.as_ref();
    let start_time = status.and_then(|s| s.start_time.as_ref()).map(|t| t.0);

    let parents = pod
        .spec
        .as_ref()
        .and_then(|s| s.node_name.as_ref())
        .and_then(|node| node_uids.get(node))
        .map(|node_uid| vec![entity_name(TYPE_K8S_NODE, node_uid)])
        .unwrap_or_default();

    let children: Vec<String> = status
        .and_then(|s| s.container_statuses.as_ref())
        .into_iter()
        .flatten()
        .filter_map(|c| c.container_id.as_deref().and_then(container_id))
        .map(|id| entity_name(TYPE_K8S_CONTAINER, &id))
        .collect();

    let mut options = vec![
        asset::with_type_and_id(TYPE_K8S_POD, uid.clone()),
        asset::with_parents(parents),
        asset::with_labels(pod.metadata.labels.clone().unwrap_or_default()),
        asset::with_pod_data(name, uid, namespace, start_time),
    ];

    if !children.is_empty() {
        options.push(asset::with_children(children));
    }

    if let Some(phase) = status.and_then(|s| s.phase.clone()) {
        options.push(asset::with_metadata(MetaMap::from([(
            "state".to_string(),
            MetaValue::from(phase),
        )])));
    }

    Some(options)
}

/// Publish one asset per pod; pods without a uid are skipped.
///
/// `node_uids` maps node names to uids so each pod can reference its node.
pub fn publish_pods(
    pods: &[Pod],
    node_uids: &HashMap<String, String>,
    sink: &dyn Publisher,
) -> Result<usize> {
    let mut published = 0;

    for pod in pods {
        let Some(options) = pod_options(pod, node_uids) else {
            tracing::warn!("Skipping pod {:?}: no uid", pod.metadata.name);
            continue;
        };
        asset::publish(sink, options)?;
        published += 1;
    }

    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::InMemoryPublisher;
    use k8s_openapi::api::core::v1::{ContainerStatus, PodSpec, PodStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use serde_json::json;

    const POD_UID: &str = "a375d24b-fa20-4ea6-a0ee-1d38671d2c09";

    fn pod(node_name: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some("foo".to_string()),
                namespace: Some("default".to_string()),
                uid: Some(POD_UID.to_string()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                node_name: node_name.map(String::from),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_pod_without_node_has_empty_parents() {
        let sink = InMemoryPublisher::new();
        publish_pods(&[pod(None)], &HashMap::new(), &sink).unwrap();

        let fields = sink.assets()[0].to_fields();
        assert_eq!(fields["asset.type"], "k8s.pod");
        assert_eq!(fields["asset.id"], POD_UID);
        assert_eq!(fields["asset.ean"], format!("k8s.pod:{}", POD_UID));
        assert_eq!(fields["asset.parents"], json!([]));
        assert_eq!(fields["kubernetes.pod.name"], "foo");
        assert_eq!(fields["kubernetes.pod.uid"], POD_UID);
        assert_eq!(fields["kubernetes.namespace"], "default");
        assert!(!fields.contains_key("asset.children"));
    }

    #[test]
    fn test_pod_references_node_and_containers() {
        let mut p = pod(Some("node-a"));
        p.status = Some(PodStatus {
            phase: Some("Running".to_string()),
            container_statuses: Some(vec![
                ContainerStatus {
                    name: "app".to_string(),
                    container_id: Some("containerd://abc123".to_string()),
                    ..Default::default()
                },
                ContainerStatus {
                    name: "pending".to_string(),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        });
        let node_uids = HashMap::from([("node-a".to_string(), "node-uid".to_string())]);

        let sink = InMemoryPublisher::new();
        publish_pods(&[p], &node_uids, &sink).unwrap();

        let fields = sink.assets()[0].to_fields();
        assert_eq!(fields["asset.parents"], json!(["k8s.node:node-uid"]));
        assert_eq!(fields["asset.children"], json!(["k8s.container:abc123"]));
        assert_eq!(fields["asset.metadata.state"], "Running");
    }

    #[test]
    fn test_unknown_node_leaves_parents_empty() {
        let sink = InMemoryPublisher::new();
        publish_pods(&[pod(Some("gone"))], &HashMap::new(), &sink).unwrap();
        assert!(sink.assets()[0].parents.is_empty());
    }
}
