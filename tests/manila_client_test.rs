// Integration tests for `ManilaClient` using wiremock.

use assert_matches::assert_matches;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use manila_dashboard::api::ShareCreate;
use manila_dashboard::domain::Limit;
use manila_dashboard::{
    ClientConfig, EndpointInterface, Error, ExtensionCache, ManilaClient, RequestContext,
    ServiceCatalog, UserIdentity,
};

// =============================================================================
// Helpers
// =============================================================================

fn context(server: &MockServer) -> RequestContext {
    let share = format!("{}/v1/t1", server.uri());
    let catalog = ServiceCatalog::from_endpoints(
        Some(&share),
        None,
        None,
        None,
        EndpointInterface::Public,
    );
    RequestContext::new(
        UserIdentity {
            username: "admin".into(),
            token_id: "secret-token".into(),
            tenant_id: "t1".into(),
        },
        catalog,
    )
}

async fn setup() -> (MockServer, ManilaClient, Arc<ExtensionCache>) {
    let server = MockServer::start().await;
    let extensions = Arc::new(ExtensionCache::new(Duration::from_secs(300)));
    let client = ManilaClient::for_request(
        &context(&server),
        &ClientConfig::default(),
        reqwest::Client::new(),
        extensions.clone(),
    )
    .unwrap();
    (server, client, extensions)
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_missing_share_service_is_unavailable() {
    let ctx = RequestContext::new(
        UserIdentity {
            username: "admin".into(),
            token_id: "tok".into(),
            tenant_id: "t1".into(),
        },
        ServiceCatalog::default(),
    );
    let result = ManilaClient::for_request(
        &ctx,
        &ClientConfig::default(),
        reqwest::Client::new(),
        Arc::new(ExtensionCache::new(Duration::from_secs(1))),
    );
    let err = result.err().unwrap();
    assert!(err.is_service_unavailable());
    assert_matches!(err, Error::ServiceCatalog { .. });
}

// =============================================================================
// Shares
// =============================================================================

#[tokio::test]
async fn test_share_create_sends_exact_body() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/t1/shares"))
        .and(header("X-Auth-Token", "secret-token"))
        .and(body_json(json!({
            "share": {
                "share_proto": "NFS",
                "size": 5,
                "name": "demo",
                "metadata": {"owner": "ops"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "share": {"id": "s1", "name": "demo", "size": 5, "share_proto": "NFS", "status": "creating"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut metadata = BTreeMap::new();
    metadata.insert("owner".to_string(), "ops".to_string());
    let share = client
        .share_create(&ShareCreate {
            share_proto: "NFS".into(),
            size: 5,
            name: Some("demo".into()),
            description: None,
            snapshot_id: None,
            share_network_id: None,
            metadata,
        })
        .await
        .unwrap();

    assert_eq!(share.id, "s1");
    assert_eq!(share.status, "creating");
}

#[tokio::test]
async fn test_share_get_not_found() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/t1/shares/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "itemNotFound": {"message": "share could not be found", "code": 404}
        })))
        .mount(&server)
        .await;

    let err = client.share_get("missing").await.unwrap_err();
    assert_matches!(err, Error::NotFound { .. });
}

#[tokio::test]
async fn test_remote_fault_message() {
    let (server, client, _) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/t1/shares/s1"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "badRequest": {"message": "Share status must be available", "code": 400}
        })))
        .mount(&server)
        .await;

    let err = client.share_delete("s1").await.unwrap_err();
    assert_matches!(err, Error::Remote { status: 400, ref message, .. } if message == "Share status must be available");
}

// =============================================================================
// Limits
// =============================================================================

#[tokio::test]
async fn test_absolute_limits_unlimited() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/t1/limits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "limits": {
                "rate": [],
                "absolute": {
                    "maxTotalShares": -1,
                    "maxTotalShareGigabytes": 1000,
                    "totalSharesUsed": 3
                }
            }
        })))
        .mount(&server)
        .await;

    let limits = client.tenant_absolute_limits().await.unwrap();
    assert_eq!(limits.get("maxTotalShares"), Some(&Limit::Unlimited));
    assert_eq!(limits.get("maxTotalShareGigabytes"), Some(&Limit::Bounded(1000)));
    assert_eq!(limits.get("totalSharesUsed"), Some(&Limit::Bounded(3)));
}

// =============================================================================
// Extensions
// =============================================================================

#[tokio::test]
async fn test_extensions_are_memoized() {
    let (server, client, extensions) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/t1/extensions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "extensions": [
                {"name": "QuotaClasses", "alias": "os-quota-class-sets", "description": ""},
                {"name": "Quotas", "alias": "os-quota-sets", "description": ""}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.extension_supported("Quotas").await);
    assert!(client.extension_supported("QuotaClasses").await);
    assert!(!client.extension_supported("Quota").await);
    assert_eq!(extensions.len(), 1);
    assert_eq!(extensions.misses(), 1);
}

#[tokio::test]
async fn test_extension_lookup_failure_is_unsupported() {
    let (server, client, extensions) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/t1/extensions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(!client.extension_supported("Quotas").await);
    assert!(extensions.is_empty());
}

// =============================================================================
// Volume Types
// =============================================================================

#[tokio::test]
async fn test_unset_extra_spec_path() {
    let (server, client, _) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/t1/types/vt1/extra_specs/replication"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    client
        .volume_type_unset_extra_specs("vt1", "replication")
        .await
        .unwrap();
}
