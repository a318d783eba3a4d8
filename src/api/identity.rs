//! Keystone Tenant Lookup
//!
//! Lists projects so views can show owning-tenant names and forms can
//! offer a project choice.

use crate::api::catalog::IDENTITY_SERVICE;
use crate::api::rest::{unwrap_envelope, ServiceClient};
use crate::api::session::RequestContext;
use crate::api::transport::ClientConfig;
use crate::domain::models::Tenant;
use crate::domain::ports::TenantDirectory;
use crate::error::Result;
use crate::metrics::Metrics;
use async_trait::async_trait;
use std::sync::Arc;

/// Keystone v3 client for the `projects` collection
pub struct KeystoneClient {
    rest: ServiceClient,
}

impl KeystoneClient {
    pub fn for_request(ctx: &RequestContext, config: &ClientConfig, http: reqwest::Client) -> Result<Self> {
        let rest = ServiceClient::for_service(IDENTITY_SERVICE, ctx, config, http)?;
        Ok(Self { rest })
    }

    pub fn from_service_client(rest: ServiceClient) -> Self {
        Self { rest }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.rest = self.rest.with_metrics(metrics);
        self
    }
}

#[async_trait]
impl TenantDirectory for KeystoneClient {
    async fn tenant_list(&self) -> Result<(Vec<Tenant>, bool)> {
        let body = self.rest.get_body("tenant_list", "projects", None).await?;

        // Paging is not followed; a `next` link only raises the flag
        let has_more = body
            .pointer("/links/next")
            .map(|next| !next.is_null())
            .unwrap_or(false);

        let tenants: Vec<Tenant> = unwrap_envelope(Some(body), "projects")?;
        Ok((tenants, has_more))
    }
}
