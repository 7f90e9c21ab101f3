//! Asset normalization
//!
//! Collectors describe each resource as an ordered list of
//! [`AssetOption`]s. [`publish`] applies them to a fresh [`Asset`] and hands
//! the finished record to a [`Publisher`].
//!
//! # Module Structure
//!
//! - [`identity`] - Type/id pair and the derived entity name
//! - [`metadata`] - Nested metadata and its flattening
//! - [`options`] - Field-setting options
//! - [`record`] - The record itself and its wire shape
//!
//! # Example
//!
//! ```ignore
//! use assetrunner::asset::*;
//!
//! fn publish_cluster(sink: &dyn Publisher) -> assetrunner::error::Result<()> {
//!     publish(sink, vec![
//!         with_cloud_provider("gcp"),
//!         with_type_and_id(TYPE_K8S_CLUSTER, "cluster-1"),
//!         with_parents(vec!["default".to_string()]),
//!     ])
//! }
//! ```

pub mod identity;
pub mod metadata;
pub mod options;
pub mod record;

pub use identity::*;
pub use metadata::{flatten, MetaMap, MetaValue, Scalar};
pub use options::*;
pub use record::*;

use crate::error::{CollectError, Result};
use crate::publisher::Publisher;

/// Build one record from `options` and hand it to `sink`
pub fn publish<I>(sink: &dyn Publisher, options: I) -> Result<()>
where
    I: IntoIterator<Item = AssetOption>,
{
    let asset = Asset::build(options);
    let ean = asset.ean().unwrap_or_default().to_string();

    if ean.is_empty() {
        tracing::debug!("Publishing asset without type and id");
    }

    sink.publish(asset)
        .map_err(|source| CollectError::Publish { ean, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::InMemoryPublisher;

    #[test]
    fn test_publish_hands_over_one_record() {
        let sink = InMemoryPublisher::new();
        publish(&sink, vec![with_type_and_id(TYPE_K8S_POD, "uid-1")]).unwrap();

        let assets = sink.assets();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].ean(), Some("k8s.pod:uid-1"));
    }

    #[test]
    fn test_sink_error_propagates() {
        struct Failing;
        impl Publisher for Failing {
            fn publish(&self, _asset: Asset) -> anyhow::Result<()> {
                Err(anyhow::anyhow!("queue full"))
            }
        }

        let err = publish(&Failing, vec![with_type_and_id(TYPE_K8S_NODE, "n-1")]).unwrap_err();
        match err {
            CollectError::Publish { ean, .. } => assert_eq!(ean, "k8s.node:n-1"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
