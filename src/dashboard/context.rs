//! Request Context
//!
//! Shared application state and the extractor that turns the
//! authenticating proxy's headers into per-request credentials.

use crate::api::catalog::ServiceCatalog;
use crate::api::identity::KeystoneClient;
use crate::api::manila::ManilaClient;
use crate::api::memo::ExtensionCache;
use crate::api::network::NeutronClient;
use crate::api::rest::AUTH_TOKEN_HEADER;
use crate::api::session::{RequestContext, UserIdentity};
use crate::api::transport::ClientConfig;
use crate::error::Result;
use crate::metrics::Metrics;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Operator name injected by the authenticating proxy
pub const USER_NAME_HEADER: &str = "X-User-Name";
/// Operator project injected by the authenticating proxy
pub const PROJECT_ID_HEADER: &str = "X-Project-Id";
/// JSON service catalog injected by the authenticating proxy
pub const SERVICE_CATALOG_HEADER: &str = "X-Service-Catalog";

// =============================================================================
// Application State
// =============================================================================

/// Shared state for all dashboard handlers
#[derive(Clone)]
pub struct AppState {
    pub client_config: Arc<ClientConfig>,
    pub http: reqwest::Client,
    /// Catalog used when the request carries none
    pub catalog: Arc<ServiceCatalog>,
    pub extensions: Arc<ExtensionCache>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        client_config: ClientConfig,
        catalog: ServiceCatalog,
        extension_ttl: Duration,
    ) -> Result<Self> {
        let http = client_config.build_http_client()?;
        Ok(Self {
            client_config: Arc::new(client_config),
            http,
            catalog: Arc::new(catalog),
            extensions: Arc::new(ExtensionCache::new(extension_ttl)),
            metrics: Arc::new(Metrics::new()?),
        })
    }

    /// Manila client for this request; fails when no share service exists
    pub fn manila(&self, ctx: &RequestContext) -> Result<ManilaClient> {
        Ok(ManilaClient::for_request(
            ctx,
            &self.client_config,
            self.http.clone(),
            self.extensions.clone(),
        )?
        .with_metrics(self.metrics.clone()))
    }

    /// Tenant lookup, absent when no identity service is configured
    pub fn keystone(&self, ctx: &RequestContext) -> Option<KeystoneClient> {
        match KeystoneClient::for_request(ctx, &self.client_config, self.http.clone()) {
            Ok(client) => Some(client.with_metrics(self.metrics.clone())),
            Err(e) => {
                debug!("Tenant lookup unavailable: {}", e);
                None
            }
        }
    }

    /// Network lookup, absent when no network service is configured
    pub fn neutron(&self, ctx: &RequestContext) -> Option<NeutronClient> {
        match NeutronClient::for_request(ctx, &self.client_config, self.http.clone()) {
            Ok(client) => Some(client.with_metrics(self.metrics.clone())),
            Err(e) => {
                debug!("Network lookup unavailable: {}", e);
                None
            }
        }
    }
}

// =============================================================================
// Credentials Extractor
// =============================================================================

/// Credentials of the operator making the request
pub struct Credentials(pub RequestContext);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Build the request context from proxy headers
///
/// The token is mandatory. The catalog header, when present, replaces
/// the configured catalog.
pub fn context_from_headers(
    headers: &HeaderMap,
    fallback: &ServiceCatalog,
) -> std::result::Result<RequestContext, (StatusCode, &'static str)> {
    let token_id = header(headers, AUTH_TOKEN_HEADER)
        .ok_or((StatusCode::UNAUTHORIZED, "Missing X-Auth-Token header"))?;

    let catalog = match header(headers, SERVICE_CATALOG_HEADER) {
        Some(raw) => ServiceCatalog::from_header(raw).map_err(|e| {
            warn!("Rejecting malformed service catalog header: {}", e);
            (StatusCode::BAD_REQUEST, "Malformed X-Service-Catalog header")
        })?,
        None => fallback.clone(),
    };

    let user = UserIdentity {
        username: header(headers, USER_NAME_HEADER)
            .unwrap_or_default()
            .to_string(),
        token_id: token_id.to_string(),
        tenant_id: header(headers, PROJECT_ID_HEADER)
            .unwrap_or_default()
            .to_string(),
    };

    Ok(RequestContext::new(user, catalog))
}

#[async_trait]
impl FromRequestParts<AppState> for Credentials {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        context_from_headers(&parts.headers, &state.catalog).map(Credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn static_catalog() -> ServiceCatalog {
        ServiceCatalog::from_endpoints(
            Some("http://manila:8786/v1/t1"),
            None,
            None,
            None,
            Default::default(),
        )
    }

    #[test]
    fn test_missing_token_is_unauthorized() {
        let headers = HeaderMap::new();
        let err = context_from_headers(&headers, &static_catalog()).unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_fallback_catalog() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_TOKEN_HEADER, HeaderValue::from_static("tok"));
        headers.insert(PROJECT_ID_HEADER, HeaderValue::from_static("t1"));

        let ctx = context_from_headers(&headers, &static_catalog()).unwrap();
        assert_eq!(ctx.user.token_id, "tok");
        assert_eq!(ctx.user.tenant_id, "t1");
        assert_eq!(ctx.user.username, "");
        assert!(ctx.catalog.has_service("share"));
    }

    #[test]
    fn test_catalog_header_overrides() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_TOKEN_HEADER, HeaderValue::from_static("tok"));
        headers.insert(
            SERVICE_CATALOG_HEADER,
            HeaderValue::from_static(
                r#"[{"type": "identity", "name": "keystone", "endpoints": [{"interface": "public", "url": "http://keystone:5000/v3"}]}]"#,
            ),
        );

        let ctx = context_from_headers(&headers, &static_catalog()).unwrap();
        assert!(!ctx.catalog.has_service("share"));
        assert!(ctx.catalog.has_service("identity"));

        headers.insert(SERVICE_CATALOG_HEADER, HeaderValue::from_static("not json"));
        let err = context_from_headers(&headers, &static_catalog()).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
