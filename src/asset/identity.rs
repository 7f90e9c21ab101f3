//! Asset identity
//!
//! Every asset is identified by its type and an id that is unique within
//! that type. The pair is joined into the entity name (`<type>:<id>`),
//! which downstream storage uses as the upsert and join key.

use serde::Serialize;

pub const TYPE_K8S_CLUSTER: &str = "k8s.cluster";
pub const TYPE_K8S_NODE: &str = "k8s.node";
pub const TYPE_K8S_POD: &str = "k8s.pod";
pub const TYPE_K8S_CONTAINER: &str = "k8s.container";
pub const TYPE_HOST: &str = "host";

/// Type, id and derived entity name of an asset.
///
/// Fields are private so the entity name can only be produced by [`AssetIdentity::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AssetIdentity {
    asset_type: String,
    id: String,
    ean: String,
}

impl AssetIdentity {
    pub fn new(asset_type: impl Into<String>, id: impl Into<String>) -> Self {
        let asset_type = asset_type.into();
        let id = id.into();
        let ean = entity_name(&asset_type, &id);
        Self { asset_type, id, ean }
    }

    pub fn asset_type(&self) -> &str {
        &self.asset_type
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Entity name, `<type>:<id>`
    pub fn ean(&self) -> &str {
        &self.ean
    }
}

/// Compose an entity name, also used to reference parents and children
pub fn entity_name(asset_type: &str, id: &str) -> String {
    format!("{}:{}", asset_type, id)
}
