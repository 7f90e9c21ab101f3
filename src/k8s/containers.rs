//! Container assets
//!
//! One asset per started container, taken from each pod's container
//! statuses. Containers are identified by their runtime id.

use crate::asset::{self, entity_name, AssetOption, TYPE_K8S_CONTAINER, TYPE_K8S_POD};
use crate::error::Result;
use crate::publisher::Publisher;
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{ContainerState, ContainerStatus, Pod};

/// Strip the runtime prefix: `containerd://abc` -> `abc`
pub fn container_id(raw: &str) -> Option<String> {
    let id = raw.split_once("://").map(|(_, id)| id).unwrap_or(raw);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// State name and start time of a container
fn container_state(state: Option<&ContainerState>) -> (&'static str, Option<DateTime<Utc>>) {
    let Some(state) = state else {
        return ("unknown", None);
    };

    if let Some(running) = &state.running {
        return ("running", running.started_at.as_ref().map(|t| t.0));
    }
    if let Some(terminated) = &state.terminated {
        return ("terminated", terminated.started_at.as_ref().map(|t| t.0));
    }
    if state.waiting.is_some() {
        return ("waiting", None);
    }
    ("unknown", None)
}

fn container_options(
    status: &ContainerStatus,
    pod_uid: &str,
    namespace: &str,
) -> Option<Vec<AssetOption>> {
    let id = status.container_id.as_deref().and_then(container_id)?;
    let (state, start_time) = container_state(status.state.as_ref());

    Some(vec![
        asset::with_type_and_id(TYPE_K8S_CONTAINER, id.clone()),
        asset::with_parents(vec![entity_name(TYPE_K8S_POD, pod_uid)]),
        asset::with_container_data(status.name.clone(), id, namespace, state, start_time),
    ])
}

/// Publish the containers of every pod. Containers that have not been
/// started yet have no id and are skipped.
pub fn publish_containers(pods: &[Pod], sink: &dyn Publisher) -> Result<usize> {
    let mut published = 0;

    for pod in pods {
        let Some(pod_uid) = pod.metadata.uid.as_deref().filter(|u| !u.is_empty()) else {
            tracing::warn!("Skipping containers of pod {:?}: no uid", pod.metadata.name);
            continue;
        };
        let namespace = pod.metadata.namespace.as_deref().unwrap_or_default();
        let statuses = pod
            .status
            .as_ref()
            .and_then(|s| s.container_statuses.as_deref())
            .unwrap_or_default();

        for status in statuses {
            let Some(options) = container_options(status, pod_uid, namespace) else {
                tracing::debug!("Skipping container {} of pod {}: not started", status.name, pod_uid);
                continue;
            };
            asset::publish(sink, options)?;
            published += 1;
        }
    }

    Ok(published)
}
