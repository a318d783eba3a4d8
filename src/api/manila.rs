//! Manila API Client Adapter
//!
//! One method per remote shared-file-system operation:
//! - Shares, snapshots, share networks and security services
//! - Tenant and default quotas, absolute limits
//! - Volume types and their extra specs
//! - Extension introspection (memoized)

use crate::api::catalog::SHARE_SERVICE;
use crate::api::memo::{ExtensionCache, MemoKey};
use crate::api::params::{
    QuotaUpdate, SearchOpts, SecurityServiceCreate, ShareCreate, ShareNetworkCreate, ShareUpdate,
    SnapshotCreate,
};
use crate::api::rest::{segment, ServiceClient};
use crate::api::session::RequestContext;
use crate::api::transport::ClientConfig;
use crate::domain::models::{
    Extension, Limit, QuotaSet, SecurityService, Share, ShareNetwork, Snapshot, VolumeType,
};
use crate::error::Result;
use crate::metrics::Metrics;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Share status once provisioning has finished
pub const SHARE_STATE_AVAILABLE: &str = "available";
/// Quota class holding the default quotas
pub const DEFAULT_QUOTA_NAME: &str = "default";

#[derive(Debug, Deserialize)]
struct LimitsBody {
    #[serde(default)]
    absolute: BTreeMap<String, Limit>,
}

// =============================================================================
// Manila Client
// =============================================================================

/// Manila client built for a single request's credentials
#[derive(Clone)]
pub struct ManilaClient {
    rest: ServiceClient,
    extensions: Arc<ExtensionCache>,
}

impl ManilaClient {
    /// Build a client from the request's catalog and token
    ///
    /// Returns [`crate::Error::ServiceCatalog`] when no share service is
    /// configured; treat that as "service unavailable".
    pub fn for_request(
        ctx: &RequestContext,
        config: &ClientConfig,
        http: reqwest::Client,
        extensions: Arc<ExtensionCache>,
    ) -> Result<Self> {
        let rest = ServiceClient::for_service(SHARE_SERVICE, ctx, config, http).map_err(|e| {
            debug!("no share service configured.");
            e
        })?;

        debug!(
            "manilaclient connection created using token \"{}\" and url \"{}\"",
            ctx.user.token_hint(),
            rest.endpoint()
        );

        Ok(Self { rest, extensions })
    }

    /// Wrap an already resolved service client
    pub fn from_service_client(rest: ServiceClient, extensions: Arc<ExtensionCache>) -> Self {
        Self { rest, extensions }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.rest = self.rest.with_metrics(metrics);
        self
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        self.rest.endpoint()
    }

    // =========================================================================
    // Shares
    // =========================================================================

    pub async fn share_list(&self, search_opts: Option<&SearchOpts>) -> Result<Vec<Share>> {
        self.rest
            .get("share_list", "shares/detail", search_opts, "shares")
            .await
    }

    pub async fn share_get(&self, share_id: &str) -> Result<Share> {
        let path = format!("shares/{}", segment(share_id));
        self.rest.get("share_get", &path, None, "share").await
    }

    pub async fn share_create(&self, params: &ShareCreate) -> Result<Share> {
        self.rest
            .send(
                "share_create",
                Method::POST,
                "shares",
                json!({ "share": params }),
                "share",
            )
            .await
    }

    pub async fn share_delete(&self, share_id: &str) -> Result<()> {
        let path = format!("shares/{}", segment(share_id));
        self.rest
            .send_no_content("share_delete", Method::DELETE, &path, None)
            .await
    }

    pub async fn share_update(&self, share_id: &str, params: &ShareUpdate) -> Result<Share> {
        let path = format!("shares/{}", segment(share_id));
        self.rest
            .send(
                "share_update",
                Method::PUT,
                &path,
                json!({ "share": params }),
                "share",
            )
            .await
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    pub async fn share_snapshot_get(&self, snapshot_id: &str) -> Result<Snapshot> {
        let path = format!("snapshots/{}", segment(snapshot_id));
        self.rest
            .get("share_snapshot_get", &path, None, "snapshot")
            .await
    }

    pub async fn share_snapshot_list(&self) -> Result<Vec<Snapshot>> {
        self.rest
            .get("share_snapshot_list", "snapshots/detail", None, "snapshots")
            .await
    }

    pub async fn share_snapshot_create(&self, params: &SnapshotCreate) -> Result<Snapshot> {
        self.rest
            .send(
                "share_snapshot_create",
                Method::POST,
                "snapshots",
                json!({ "snapshot": params }),
                "snapshot",
            )
            .await
    }

    pub async fn share_snapshot_delete(&self, snapshot_id: &str) -> Result<()> {
        let path = format!("snapshots/{}", segment(snapshot_id));
        self.rest
            .send_no_content("share_snapshot_delete", Method::DELETE, &path, None)
            .await
    }

    // =========================================================================
    // Share Networks
    // =========================================================================

    pub async fn share_network_list(
        &self,
        search_opts: Option<&SearchOpts>,
    ) -> Result<Vec<ShareNetwork>> {
        self.rest
            .get(
                "share_network_list",
                "share-networks/detail",
                search_opts,
                "share_networks",
            )
            .await
    }

    pub async fn share_network_get(&self, share_network_id: &str) -> Result<ShareNetwork> {
        let path = format!("share-networks/{}", segment(share_network_id));
        self.rest
            .get("share_network_get", &path, None, "share_network")
            .await
    }

    pub async fn share_network_create(&self, params: &ShareNetworkCreate) -> Result<ShareNetwork> {
        self.rest
            .send(
                "share_network_create",
                Method::POST,
                "share-networks",
                json!({ "share_network": params }),
                "share_network",
            )
            .await
    }

    pub async fn share_network_delete(&self, share_network_id: &str) -> Result<()> {
        let path = format!("share-networks/{}", segment(share_network_id));
        self.rest
            .send_no_content("share_network_delete", Method::DELETE, &path, None)
            .await
    }

    pub async fn share_network_security_service_add(
        &self,
        share_network_id: &str,
        security_service_id: &str,
    ) -> Result<ShareNetwork> {
        self.share_network_action(
            "share_network_security_service_add",
            share_network_id,
            "add_security_service",
            security_service_id,
        )
        .await
    }

    pub async fn share_network_security_service_remove(
        &self,
        share_network_id: &str,
        security_service_id: &str,
    ) -> Result<ShareNetwork> {
        self.share_network_action(
            "share_network_security_service_remove",
            share_network_id,
            "remove_security_service",
            security_service_id,
        )
        .await
    }

    async fn share_network_action(
        &self,
        operation: &'static str,
        share_network_id: &str,
        action: &str,
        security_service_id: &str,
    ) -> Result<ShareNetwork> {
        let path = format!("share-networks/{}/action", segment(share_network_id));
        let mut body = serde_json::Map::new();
        body.insert(
            action.to_string(),
            json!({ "security_service_id": security_service_id }),
        );

        self.rest
            .send(operation, Method::POST, &path, Value::Object(body), "share_network")
            .await
    }

    // =========================================================================
    // Security Services
    // =========================================================================

    pub async fn security_service_list(
        &self,
        search_opts: Option<&SearchOpts>,
    ) -> Result<Vec<SecurityService>> {
        self.rest
            .get(
                "security_service_list",
                "security-services/detail",
                search_opts,
                "security_services",
            )
            .await
    }

    pub async fn security_service_get(&self, security_service_id: &str) -> Result<SecurityService> {
        let path = format!("security-services/{}", segment(security_service_id));
        self.rest
            .get("security_service_get", &path, None, "security_service")
            .await
    }

    pub async fn security_service_create(
        &self,
        params: &SecurityServiceCreate,
    ) -> Result<SecurityService> {
        self.rest
            .send(
                "security_service_create",
                Method::POST,
                "security-services",
                json!({ "security_service": params }),
                "security_service",
            )
            .await
    }

    pub async fn security_service_delete(&self, security_service_id: &str) -> Result<()> {
        let path = format!("security-services/{}", segment(security_service_id));
        self.rest
            .send_no_content("security_service_delete", Method::DELETE, &path, None)
            .await
    }

    // =========================================================================
    // Quotas & Limits
    // =========================================================================

    pub async fn tenant_quota_get(&self, tenant_id: &str) -> Result<QuotaSet> {
        let path = format!("os-quota-sets/{}", segment(tenant_id));
        let raw: Value = self
            .rest
            .get("tenant_quota_get", &path, None, "quota_set")
            .await?;
        Ok(QuotaSet::from_json(&raw))
    }

    pub async fn tenant_quota_update(&self, tenant_id: &str, params: &QuotaUpdate) -> Result<QuotaSet> {
        let path = format!("os-quota-sets/{}", segment(tenant_id));
        let raw: Value = self
            .rest
            .send(
                "tenant_quota_update",
                Method::PUT,
                &path,
                json!({ "quota_set": params }),
                "quota_set",
            )
            .await?;
        Ok(QuotaSet::from_json(&raw))
    }

    pub async fn default_quota_get(&self, tenant_id: &str) -> Result<QuotaSet> {
        let path = format!("os-quota-sets/{}/defaults", segment(tenant_id));
        let raw: Value = self
            .rest
            .get("default_quota_get", &path, None, "quota_set")
            .await?;
        Ok(QuotaSet::from_json(&raw))
    }

    pub async fn default_quota_update(&self, params: &QuotaUpdate) -> Result<()> {
        let path = format!("os-quota-class-sets/{}", DEFAULT_QUOTA_NAME);
        self.rest
            .send_no_content(
                "default_quota_update",
                Method::PUT,
                &path,
                Some(json!({ "quota_class_set": params })),
            )
            .await
    }

    /// Absolute limits of the caller's tenant; `-1` becomes [`Limit::Unlimited`]
    pub async fn tenant_absolute_limits(&self) -> Result<BTreeMap<String, Limit>> {
        let limits: LimitsBody = self
            .rest
            .get("tenant_absolute_limits", "limits", None, "limits")
            .await?;
        Ok(limits.absolute)
    }

    // =========================================================================
    // Volume Types & Extra Specs
    // =========================================================================

    pub async fn volume_type_list(&self) -> Result<Vec<VolumeType>> {
        self.rest
            .get("volume_type_list", "types", None, "volume_types")
            .await
    }

    pub async fn volume_type_get(&self, volume_type_id: &str) -> Result<VolumeType> {
        let path = format!("types/{}", segment(volume_type_id));
        self.rest
            .get("volume_type_get", &path, None, "volume_type")
            .await
    }

    pub async fn volume_type_create(&self, name: &str) -> Result<VolumeType> {
        self.rest
            .send(
                "volume_type_create",
                Method::POST,
                "types",
                json!({ "volume_type": { "name": name } }),
                "volume_type",
            )
            .await
    }

    pub async fn volume_type_delete(&self, volume_type_id: &str) -> Result<()> {
        let path = format!("types/{}", segment(volume_type_id));
        self.rest
            .send_no_content("volume_type_delete", Method::DELETE, &path, None)
            .await
    }

    pub async fn volume_type_get_extra_specs(
        &self,
        volume_type_id: &str,
    ) -> Result<BTreeMap<String, String>> {
        let path = format!("types/{}/extra_specs", segment(volume_type_id));
        self.rest
            .get("volume_type_get_extra_specs", &path, None, "extra_specs")
            .await
    }

    pub async fn volume_type_set_extra_specs(
        &self,
        volume_type_id: &str,
        specs: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>> {
        let path = format!("types/{}/extra_specs", segment(volume_type_id));
        self.rest
            .send(
                "volume_type_set_extra_specs",
                Method::POST,
                &path,
                json!({ "extra_specs": specs }),
                "extra_specs",
            )
            .await
    }

    pub async fn volume_type_unset_extra_specs(&self, volume_type_id: &str, key: &str) -> Result<()> {
        let path = format!(
            "types/{}/extra_specs/{}",
            segment(volume_type_id),
            segment(key)
        );
        self.rest
            .send_no_content("volume_type_unset_extra_specs", Method::DELETE, &path, None)
            .await
    }

    // =========================================================================
    // Extensions
    // =========================================================================

    /// All extensions the service advertises, memoized per endpoint and token
    pub async fn list_extensions(&self) -> Result<Arc<Vec<Extension>>> {
        let key = MemoKey::new(self.rest.endpoint().as_str(), self.rest.token());
        if let Some(extensions) = self.extensions.get(&key) {
            return Ok(extensions);
        }

        let extensions: Vec<Extension> = self
            .rest
            .get("list_extensions", "extensions", None, "extensions")
            .await?;
        Ok(self.extensions.put(key, extensions))
    }

    /// Whether the service supports an extension with exactly this name
    pub async fn extension_supported(&self, extension_name: &str) -> bool {
        match self.list_extensions().await {
            Ok(extensions) => extensions.iter().any(|e| e.name == extension_name),
            Err(e) => {
                warn!("Unable to list share extensions: {}", e);
                false
            }
        }
    }
}
