//! Asset record
//!
//! The canonical output unit. Records are assembled by applying
//! [`AssetOption`](super::AssetOption)s and are rendered on the wire as a
//! single flat object with dotted field names.

use super::identity::AssetIdentity;
use super::metadata::Scalar;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Prefix under which flattened metadata is written
pub const METADATA_PREFIX: &str = "asset.metadata.";

/// Kubernetes node attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    pub name: String,
    pub provider_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
}

/// Kubernetes pod attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodData {
    pub name: String,
    pub uid: String,
    pub namespace: String,
    pub start_time: Option<DateTime<Utc>>,
}

/// Kubernetes container attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerData {
    pub name: String,
    pub uid: String,
    pub namespace: String,
    pub state: String,
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostData {
    pub hostname: String,
    pub architecture: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostOsData {
    pub build: String,
    pub family: String,
    pub kernel: String,
    pub name: String,
    pub platform: String,
    pub os_type: String,
    pub version: String,
}

/// A normalized asset.
///
/// `parents` is always present (possibly empty). Attribute groups are only
/// set by the collector that knows about them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Asset {
    pub provider: Option<String>,
    pub region: Option<String>,
    pub account_id: Option<String>,
    pub identity: Option<AssetIdentity>,
    pub parents: Vec<String>,
    pub children: Option<Vec<String>>,
    pub kind: Option<String>,
    pub labels: BTreeMap<String, String>,
    /// Already flattened, keyed by dotted path without the `asset.metadata.` prefix
    pub metadata: BTreeMap<String, Scalar>,
    pub node: Option<NodeData>,
    pub pod: Option<PodData>,
    pub container: Option<ContainerData>,
    pub host: Option<HostData>,
    pub host_os: Option<HostOsData>,
}

impl Asset {
    /// Entity name, if type and id were set
    pub fn ean(&self) -> Option<&str> {
        self.identity.as_ref().map(AssetIdentity::ean)
    }

    /// Render the record as flat dotted fields
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();

        put_opt(&mut fields, "cloud.provider", &self.provider);
        put_opt(&mut fields, "cloud.region", &self.region);
        put_opt(&mut fields, "cloud.account.id", &self.account_id);

        if let Some(identity) = &self.identity {
            put(&mut fields, "asset.type", identity.asset_type());
            put(&mut fields, "asset.id", identity.id());
            put(&mut fields, "asset.ean", identity.ean());
        }

        fields.insert("asset.parents".to_string(), string_list(&self.parents));
        if let Some(children) = &self.children {
            fields.insert("asset.children".to_string(), string_list(children));
        }
        put_opt(&mut fields, "asset.kind", &self.kind);

        if !self.labels.is_empty() {
            let labels = self
                .labels
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            fields.insert("labels".to_string(), Value::Object(labels));
        }

        for (path, value) in &self.metadata {
            fields.insert(format!("{}{}", METADATA_PREFIX, path), value.to_json());
        }

        if let Some(node) = &self.node {
            put(&mut fields, "kubernetes.node.name", &node.name);
            put_opt(&mut fields, "kubernetes.node.providerId", &node.provider_id);
            put_time(&mut fields, "kubernetes.node.start_time", node.start_time);
        }

        if let Some(pod) = &self.pod {
            put(&mut fields, "kubernetes.pod.name", &pod.name);
            put(&mut fields, "kubernetes.pod.uid", &pod.uid);
            put_time(&mut fields, "kubernetes.pod.start_time", pod.start_time);
            put(&mut fields, "kubernetes.namespace", &pod.namespace);
        }

        if let Some(container) = &self.container {
            put(&mut fields, "kubernetes.container.name", &container.name);
            put(&mut fields, "kubernetes.container.uid", &container.uid);
            put_time(&mut fields, "kubernetes.container.start_time", container.start_time);
            put(&mut fields, "kubernetes.container.state", &container.state);
            put(&mut fields, "kubernetes.namespace", &container.namespace);
        }

        if let Some(host) = &self.host {
            put(&mut fields, "host.hostname", &host.hostname);
            put(&mut fields, "host.architecture", &host.architecture);
        }

        if let Some(os) = &self.host_os {
            put(&mut fields, "host.os.build", &os.build);
            put(&mut fields, "host.os.family", &os.family);
            put(&mut fields, "host.os.kernel", &os.kernel);
            put(&mut fields, "host.os.name", &os.name);
            put(&mut fields, "host.os.platform", &os.platform);
            put(&mut fields, "host.os.type", &os.os_type);
            put(&mut fields, "host.os.version", &os.version);
        }

        fields
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_fields().serialize(serializer)
    }
}

fn put(fields: &mut Map<String, Value>, key: &str, value: &str) {
    fields.insert(key.to_string(), Value::String(value.to_string()));
}

fn put_opt(fields: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        put(fields, key, v);
    }
}

fn put_time(fields: &mut Map<String, Value>, key: &str, value: Option<DateTime<Utc>>) {
    if let Some(t) = value {
        put(fields, key, &t.to_rfc3339());
    }
}

fn string_list(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}
