//! Service Catalog
//!
//! Resolves remote service endpoints from a per-request service catalog.
//! The catalog arrives in the `X-Service-Catalog` header set by the
//! authenticating proxy, or falls back to the statically configured one.

use crate::error::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Service type of the shared file system API
pub const SHARE_SERVICE: &str = "share";
/// Service type of the identity API
pub const IDENTITY_SERVICE: &str = "identity";
/// Service type of the networking API
pub const NETWORK_SERVICE: &str = "network";

// =============================================================================
// Catalog Types
// =============================================================================

/// Endpoint interface, as in the keystone v3 catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointInterface {
    #[default]
    Public,
    Internal,
    Admin,
}

impl FromStr for EndpointInterface {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "public" | "publicurl" => Ok(EndpointInterface::Public),
            "internal" | "internalurl" => Ok(EndpointInterface::Internal),
            "admin" | "adminurl" => Ok(EndpointInterface::Admin),
            other => Err(Error::Configuration(format!(
                "Invalid endpoint interface: {}. Use 'public', 'internal', or 'admin'",
                other
            ))),
        }
    }
}

/// A single endpoint of a catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub interface: EndpointInterface,
    #[serde(default)]
    pub region: Option<String>,
    pub url: String,
}

/// A service with its endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// Service catalog for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    pub entries: Vec<CatalogEntry>,
}

impl ServiceCatalog {
    /// Parse the JSON catalog carried in the `X-Service-Catalog` header
    pub fn from_header(value: &str) -> Result<Self> {
        Ok(serde_json::from_str(value)?)
    }

    /// Load a catalog from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Build a catalog from individually configured endpoint URLs
    pub fn from_endpoints(
        share: Option<&str>,
        identity: Option<&str>,
        network: Option<&str>,
        region: Option<&str>,
        interface: EndpointInterface,
    ) -> Self {
        let entries = [
            (SHARE_SERVICE, "manila", share),
            (IDENTITY_SERVICE, "keystone", identity),
            (NETWORK_SERVICE, "neutron", network),
        ]
        .into_iter()
        .filter_map(|(service_type, name, url)| {
            url.map(|url| CatalogEntry {
                service_type: service_type.to_string(),
                name: name.to_string(),
                endpoints: vec![Endpoint {
                    interface,
                    region: region.map(str::to_string),
                    url: url.to_string(),
                }],
            })
        })
        .collect();

        Self { entries }
    }

    /// Check whether a service type is present at all
    pub fn has_service(&self, service_type: &str) -> bool {
        self.entries.iter().any(|e| e.service_type == service_type)
    }

    /// Resolve the endpoint URL for a service
    ///
    /// An endpoint without a region matches any requested region.
    pub fn url_for(
        &self,
        service_type: &str,
        interface: EndpointInterface,
        region: Option<&str>,
    ) -> Result<Url> {
        let endpoint = self
            .entries
            .iter()
            .filter(|e| e.service_type == service_type)
            .flat_map(|e| e.endpoints.iter())
            .find(|ep| {
                ep.interface == interface
                    && match (region, ep.region.as_deref()) {
                        (Some(wanted), Some(have)) => wanted == have,
                        _ => true,
                    }
            })
            .ok_or_else(|| Error::ServiceCatalog {
                service_type: service_type.to_string(),
            })?;

        debug!("Resolved {} endpoint: {}", service_type, endpoint.url);

        Url::parse(&endpoint.url).map_err(|e| {
            Error::Configuration(format!(
                "Invalid {} endpoint URL {}: {}",
                service_type, endpoint.url, e
            ))
        })
    }
}

/// Join a relative resource path onto an endpoint, keeping the endpoint's path
pub fn join_endpoint(base: &Url, path: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| Error::Internal(format!("Invalid resource path {}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::from_header(
            r#"[
                {"type": "share", "name": "manila", "endpoints": [
                    {"interface": "public", "region": "RegionOne", "url": "http://manila:8786/v1/t1"},
                    {"interface": "internal", "region": "RegionOne", "url": "http://10.0.0.5:8786/v1/t1"},
                    {"interface": "public", "region": "RegionTwo", "url": "http://manila2:8786/v1/t1"}
                ]},
                {"type": "identity", "endpoints": [
                    {"interface": "public", "url": "http://keystone:5000/v3"}
                ]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_url_for_interface_and_region() {
        let catalog = catalog();

        let url = catalog
            .url_for(SHARE_SERVICE, EndpointInterface::Public, Some("RegionOne"))
            .unwrap();
        assert_eq!(url.as_str(), "http://manila:8786/v1/t1");

        let url = catalog
            .url_for(SHARE_SERVICE, EndpointInterface::Internal, None)
            .unwrap();
        assert_eq!(url.host_str(), Some("10.0.0.5"));

        let url = catalog
            .url_for(SHARE_SERVICE, EndpointInterface::Public, Some("RegionTwo"))
            .unwrap();
        assert_eq!(url.host_str(), Some("manila2"));

        // Regionless endpoints match any region
        assert!(catalog
            .url_for(IDENTITY_SERVICE, EndpointInterface::Public, Some("RegionTwo"))
            .is_ok());
    }

    #[test]
    fn test_missing_service_is_unavailable() {
        let catalog = catalog();
        let err = catalog
            .url_for(NETWORK_SERVICE, EndpointInterface::Public, None)
            .unwrap_err();
        assert!(err.is_service_unavailable());

        let err = catalog
            .url_for(SHARE_SERVICE, EndpointInterface::Admin, None)
            .unwrap_err();
        assert!(err.is_service_unavailable());
    }

    #[test]
    fn test_from_endpoints() {
        let catalog = ServiceCatalog::from_endpoints(
            Some("http://manila:8786/v1/t1"),
            None,
            Some("http://neutron:9696"),
            None,
            EndpointInterface::Public,
        );
        assert!(catalog.has_service(SHARE_SERVICE));
        assert!(!catalog.has_service(IDENTITY_SERVICE));
        assert!(catalog.has_service(NETWORK_SERVICE));
    }

    #[test]
    fn test_interface_parse() {
        assert_eq!("publicURL".parse::<EndpointInterface>().unwrap(), EndpointInterface::Public);
        assert_eq!("internal".parse::<EndpointInterface>().unwrap(), EndpointInterface::Internal);
        assert!("private".parse::<EndpointInterface>().is_err());
    }

    #[test]
    fn test_join_endpoint_keeps_path() {
        let base = Url::parse("http://manila:8786/v1/t1").unwrap();
        let url = join_endpoint(&base, "shares/detail").unwrap();
        assert_eq!(url.as_str(), "http://manila:8786/v1/t1/shares/detail");

        let base = Url::parse("http://neutron:9696/").unwrap();
        let url = join_endpoint(&base, "/v2.0/networks").unwrap();
        assert_eq!(url.as_str(), "http://neutron:9696/v2.0/networks");
    }
}
