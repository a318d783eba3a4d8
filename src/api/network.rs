//! Neutron Network Lookup
//!
//! Lists networks and subnets for the share network form's choices.

use crate::api::catalog::NETWORK_SERVICE;
use crate::api::rest::ServiceClient;
use crate::api::session::RequestContext;
use crate::api::transport::ClientConfig;
use crate::domain::models::{Network, Subnet};
use crate::domain::ports::NetworkDirectory;
use crate::error::Result;
use crate::metrics::Metrics;
use async_trait::async_trait;
use std::sync::Arc;

/// Neutron v2.0 client for networks and subnets
pub struct NeutronClient {
    rest: ServiceClient,
}

impl NeutronClient {
    pub fn for_request(ctx: &RequestContext, config: &ClientConfig, http: reqwest::Client) -> Result<Self> {
        let rest = ServiceClient::for_service(NETWORK_SERVICE, ctx, config, http)?;
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
impl NetworkDirectory for NeutronClient {
    async fn network_list(&self) -> Result<Vec<Network>> {
        self.rest
            .get("network_list", "v2.0/networks", None, "networks")
            .await
    }

    async fn subnet_list(&self) -> Result<Vec<Subnet>> {
        self.rest
            .get("subnet_list", "v2.0/subnets", None, "subnets")
            .await
    }
}
