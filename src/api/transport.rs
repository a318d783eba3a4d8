//! Shared Transport Configuration
//!
//! TLS, timeout and debug settings applied once to the pooled
//! `reqwest::Client` that every per-request API client borrows.

use crate::api::catalog::EndpointInterface;
use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for outbound API clients
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Extra CA certificate (PEM) to trust
    pub cacert: Option<PathBuf>,
    /// Per-call timeout
    pub timeout: Duration,
    /// Trace every outbound request
    pub http_log_debug: bool,
    /// Catalog interface to resolve endpoints from
    pub endpoint_interface: EndpointInterface,
    /// Catalog region to prefer
    pub region: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            insecure: false,
            cacert: None,
            timeout: Duration::from_secs(30),
            http_log_debug: false,
            endpoint_interface: EndpointInterface::Public,
            region: None,
        }
    }
}

impl ClientConfig {
    /// Build the shared HTTP client
    pub fn build_http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("manila-dashboard/", env!("CARGO_PKG_VERSION")));

        if let Some(path) = &self.cacert {
            let pem = std::fs::read(path).map_err(|e| {
                Error::Configuration(format!("Failed to read CA certificate {}: {}", path.display(), e))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| Error::Configuration(format!("Invalid CA certificate: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }

        if self.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(!config.insecure);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.endpoint_interface, EndpointInterface::Public);
        assert!(config.build_http_client().is_ok());
    }

    #[test]
    fn test_missing_cacert_is_configuration_error() {
        let config = ClientConfig {
            cacert: Some(PathBuf::from("/nonexistent/ca.pem")),
            ..Default::default()
        };
        let err = config.build_http_client().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
