//! Asset options
//!
//! Each option sets one group of fields on a record. Options are applied in
//! the order given, so a later option overwrites whatever an earlier one set.

use super::identity::AssetIdentity;
use super::metadata::{flatten, MetaMap};
use super::record::{Asset, ContainerData, HostData, HostOsData, NodeData, PodData};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A single field-setting step applied to a record under construction
pub type AssetOption = Box<dyn FnOnce(Asset) -> Asset + Send>;

impl Asset {
    /// Build a record from an empty one by applying `options` in order
    pub fn build<I>(options: I) -> Asset
    where
        I: IntoIterator<Item = AssetOption>,
    {
        options
            .into_iter()
            .fold(Asset::default(), |asset, option| option(asset))
    }
}

pub fn with_cloud_provider(value: impl Into<String>) -> AssetOption {
    let value = value.into();
    Box::new(move |mut a| {
        a.provider = Some(value);
        a
    })
}

pub fn with_region(value: impl Into<String>) -> AssetOption {
    let value = value.into();
    Box::new(move |mut a| {
        a.region = Some(value);
        a
    })
}

pub fn with_account_id(value: impl Into<String>) -> AssetOption {
    let value = value.into();
    Box::new(move |mut a| {
        a.account_id = Some(value);
        a
    })
}

/// Set type and id; the entity name is derived in the same step
pub fn with_type_and_id(asset_type: impl Into<String>, id: impl Into<String>) -> AssetOption {
    let identity = AssetIdentity::new(asset_type, id);
    Box::new(move |mut a| {
        a.identity = Some(identity);
        a
    })
}

pub fn with_kind(value: impl Into<String>) -> AssetOption {
    let value = value.into();
    Box::new(move |mut a| {
        a.kind = Some(value);
        a
    })
}

pub fn with_parents(value: Vec<String>) -> AssetOption {
    Box::new(move |mut a| {
        a.parents = value;
        a
    })
}

pub fn with_children(value: Vec<String>) -> AssetOption {
    Box::new(move |mut a| {
        a.children = Some(value);
        a
    })
}

pub fn with_labels(value: BTreeMap<String, String>) -> AssetOption {
    Box::new(move |mut a| {
        a.labels = value;
        a
    })
}

/// Flatten `value` and merge it into the record's metadata
pub fn with_metadata(value: MetaMap) -> AssetOption {
    Box::new(move |mut a| {
        a.metadata.extend(flatten(&value));
        a
    })
}

pub fn with_node_data(
    name: impl Into<String>,
    provider_id: Option<String>,
    start_time: Option<DateTime<Utc>>,
) -> AssetOption {
    let node = NodeData {
        name: name.into(),
        provider_id,
        start_time,
    };
    Box::new(move |mut a| {
        a.node = Some(node);
        a
    })
}

pub fn with_pod_data(
    name: impl Into<String>,
    uid: impl Into<String>,
    namespace: impl Into<String>,
    start_time: Option<DateTime<Utc>>,
) -> AssetOption {
    let pod = PodData {
        name: name.into(),
        uid: uid.into(),
        namespace: namespace.into(),
        start_time,
    };
    Box::new(move |mut a| {
        a.pod = Some(pod);
        a
    })
}

pub fn with_container_data(
    name: impl Into<String>,
    uid: impl Into<String>,
    namespace: impl Into<String>,
    state: impl Into<String>,
    start_time: Option<DateTime<Utc>>,
) -> AssetOption {
    let container = ContainerData {
        name: name.into(),
        uid: uid.into(),
        namespace: namespace.into(),
        state: state.into(),
        start_time,
    };
    Box::new(move |mut a| {
        a.container = Some(container);
        a
    })
}

pub fn with_host_data(hostname: impl Into<String>, architecture: impl Into<String>) -> AssetOption {
    let host = HostData {
        hostname: hostname.into(),
        architecture: architecture.into(),
    };
    Box::new(move |mut a| {
        a.host = Some(host);
        a
    })
}

pub fn with_host_os_data(os: HostOsData) -> AssetOption {
    Box::new(move |mut a| {
        a.host_os = Some(os);
        a
    })
}
