//! Integration tests for the GKE collector
//!
//! The REST path is exercised against wiremock; pass-level behaviour
//! (abort on listing failure) uses an in-process lister.

use assetrunner::asset::{Asset, Scalar};
use assetrunner::error::CollectError;
use assetrunner::gcp::auth::StaticToken;
use assetrunner::gcp::client::{Endpoints, GcpClient};
use assetrunner::gcp::gke::{collect_gke_assets, Cluster, ClusterLister};
use assetrunner::gcp::projects::list_project_ids;
use assetrunner::publisher::{InMemoryPublisher, Publisher};
use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GcpClient {
    GcpClient::with_token_source(
        Arc::new(StaticToken("test-token".to_string())),
        Endpoints::with_base(&server.uri()),
    )
    .expect("client should build")
}

mod rest_tests {
    use super::*;

    /// A single cluster is published with the canonical shape
    #[tokio::test]
    async fn test_cluster_from_api_is_published() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/projects/proj-1/locations/-/clusters"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "clusters": [{
                    "id": "cluster-1",
                    "name": "prod",
                    "zone": "us-central1-a",
                    "location": "us-central1-a",
                    "network": "default",
                    "resourceLabels": {"env": "prod"},
                    "status": "RUNNING"
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let sink = InMemoryPublisher::new();

        let count = collect_gke_assets(&client, &["proj-1".to_string()], &sink)
            .await
            .expect("collection should succeed");
        assert_eq!(count, 1);

        let assets = sink.assets();
        let fields = assets[0].to_fields();
        assert_eq!(fields["cloud.provider"], "gcp");
        assert_eq!(fields["asset.type"], "k8s.cluster");
        assert_eq!(fields["asset.id"], "cluster-1");
        assert_eq!(fields["asset.ean"], "k8s.cluster:cluster-1");
        assert_eq!(fields["cloud.region"], "us-central1");
        assert_eq!(fields["cloud.account.id"], "proj-1");
        assert_eq!(fields["asset.parents"], json!(["default"]));
        assert_eq!(fields["labels"], json!({"env": "prod"}));
        assert_eq!(fields["asset.metadata.state"], "RUNNING");
        assert_eq!(assets[0].metadata["state"], Scalar::from("RUNNING"));
    }

    /// An empty response publishes nothing
    #[tokio::test]
    async fn test_project_without_clusters() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/projects/proj-1/locations/-/clusters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let sink = InMemoryPublisher::new();
        let count = collect_gke_assets(&client_for(&server), &["proj-1".to_string()], &sink)
            .await
            .expect("collection should succeed");

        assert_eq!(count, 0);
        assert!(sink.assets().is_empty());
    }

    /// A 403 becomes a listing error naming the project
    #[tokio::test]
    async fn test_forbidden_is_listing_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/projects/restricted-proj/locations/-/clusters"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "Permission denied"}
            })))
            .mount(&server)
            .await;

        let sink = InMemoryPublisher::new();
        let err = collect_gke_assets(
            &client_for(&server),
            &["restricted-proj".to_string()],
            &sink,
        )
        .await
        .expect_err("collection should fail");

        match err {
            CollectError::Listing { scope, source, .. } => {
                assert_eq!(scope, "restricted-proj");
                assert!(source.to_string().contains("403"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Project discovery follows page tokens and keeps only active projects
    #[tokio::test]
    async fn test_project_discovery_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/projects"))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [{"projectId": "proj-3", "lifecycleState": "ACTIVE"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projects": [
                    {"projectId": "proj-1", "lifecycleState": "ACTIVE"},
                    {"projectId": "proj-2", "lifecycleState": "DELETE_REQUESTED"}
                ],
                "nextPageToken": "page-2"
            })))
            .mount(&server)
            .await;

        let ids = list_project_ids(&client_for(&server))
            .await
            .expect("listing should succeed");
        assert_eq!(ids, vec!["proj-1".to_string(), "proj-3".to_string()]);
    }
}

mod pass_tests {
    use super::*;

    /// Lister that fails for one project and records what was asked
    struct ScriptedLister {
        failing: &'static str,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ClusterLister for ScriptedLister {
        async fn list_clusters(&self, project: &str) -> anyhow::Result<Vec<Cluster>> {
            self.calls.lock().unwrap().push(project.to_string());
            if project == self.failing {
                return Err(anyhow::anyhow!("API request failed: 500"));
            }
            Ok(vec![Cluster {
                id: format!("{}-cluster", project),
                zone: "us-east1-b".to_string(),
                network: "vpc".to_string(),
                resource_labels: BTreeMap::new(),
                status: "RUNNING".to_string(),
                ..Default::default()
            }])
        }
    }

    /// Failure on scope 2 of 3 keeps scope 1 published and never tries scope 3
    #[tokio::test]
    async fn test_listing_failure_aborts_remaining_projects() {
        let lister = ScriptedLister {
            failing: "proj-2",
            calls: Mutex::new(Vec::new()),
        };
        let projects = vec![
            "proj-1".to_string(),
            "proj-2".to_string(),
            "proj-3".to_string(),
        ];
        let sink = InMemoryPublisher::new();

        let result = collect_gke_assets(&lister, &projects, &sink).await;
        assert!(matches!(result, Err(CollectError::Listing { ref scope, .. }) if scope == "proj-2"));

        let assets = sink.assets();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].ean(), Some("k8s.cluster:proj-1-cluster"));
        assert_eq!(assets[0].region.as_deref(), Some("us-east1"));

        assert_eq!(*lister.calls.lock().unwrap(), vec!["proj-1", "proj-2"]);
    }

    /// Clusters without an id cannot be identified and are dropped
    #[tokio::test]
    async fn test_cluster_without_id_is_skipped() {
        struct Anonymous;

        #[async_trait]
        impl ClusterLister for Anonymous {
            async fn list_clusters(&self, _project: &str) -> anyhow::Result<Vec<Cluster>> {
                Ok(vec![
                    Cluster {
                        name: "no-id".to_string(),
                        ..Default::default()
                    },
                    Cluster {
                        id: "ok".to_string(),
                        ..Default::default()
                    },
                ])
            }
        }

        let sink = InMemoryPublisher::new();
        let count = collect_gke_assets(&Anonymous, &["proj-1".to_string()], &sink)
            .await
            .unwrap();

        assert_eq!(count, 1);
        let asset = &sink.assets()[0];
        assert_eq!(asset.ean(), Some("k8s.cluster:ok"));
        // Missing zone degrades to an empty region rather than dropping the record
        assert_eq!(asset.region.as_deref(), Some(""));
        assert!(asset.parents.is_empty());
    }

    /// Sink that rejects every record of one project
    struct RejectingSink {
        reject: &'static str,
        inner: InMemoryPublisher,
    }

    impl Publisher for RejectingSink {
        fn publish(&self, asset: Asset) -> anyhow::Result<()> {
            if asset.account_id.as_deref() == Some(self.reject) {
                return Err(anyhow::anyhow!("sink full"));
            }
            self.inner.publish(asset)
        }
    }

    #[tokio::test]
    async fn test_sink_failure_aborts_remaining_projects() {
        let lister = ScriptedLister {
            failing: "none",
            calls: Mutex::new(Vec::new()),
        };
        let projects = vec![
            "proj-1".to_string(),
            "proj-2".to_string(),
            "proj-3".to_string(),
        ];
        let sink = RejectingSink {
            reject: "proj-2",
            inner: InMemoryPublisher::new(),
        };

        let result = collect_gke_assets(&lister, &projects, &sink).await;
        assert!(matches!(
            result,
            Err(CollectError::Publish { ref ean, .. }) if ean == "k8s.cluster:proj-2-cluster"
        ));

        let assets = sink.inner.assets();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].ean(), Some("k8s.cluster:proj-1-cluster"));
        assert_eq!(*lister.calls.lock().unwrap(), vec!["proj-1", "proj-2"]);
    }
}
