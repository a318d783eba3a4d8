//! Service REST Client
//!
//! Token-authenticated JSON transport shared by the Manila, Keystone and
//! Neutron clients. Handles endpoint resolution, status mapping, envelope
//! unwrapping and call accounting.

use crate::api::catalog::join_endpoint;
use crate::api::params::SearchOpts;
use crate::api::session::RequestContext;
use crate::api::transport::ClientConfig;
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};

/// Header carrying the keystone token
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Longest remote error body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// A client bound to one service endpoint and one token
#[derive(Clone)]
pub struct ServiceClient {
    service: &'static str,
    http: reqwest::Client,
    endpoint: Url,
    token: String,
    http_log_debug: bool,
    metrics: Option<Arc<Metrics>>,
}

impl ServiceClient {
    /// Resolve the service endpoint from the request's catalog
    ///
    /// Fails fast with [`Error::ServiceCatalog`] when the service is not
    /// in the catalog; callers should not retry.
    pub fn for_service(
        service: &'static str,
        ctx: &RequestContext,
        config: &ClientConfig,
        http: reqwest::Client,
    ) -> Result<Self> {
        let endpoint =
            ctx.catalog
                .url_for(service, config.endpoint_interface, config.region.as_deref())?;

        Ok(Self::with_endpoint(service, http, endpoint, ctx.user.token_id.clone())
            .with_log_debug(config.http_log_debug))
    }

    /// Build a client for a known endpoint
    pub fn with_endpoint(
        service: &'static str,
        http: reqwest::Client,
        endpoint: Url,
        token: String,
    ) -> Self {
        Self {
            service,
            http,
            endpoint,
            token,
            http_log_debug: false,
            metrics: None,
        }
    }

    pub fn with_log_debug(mut self, enabled: bool) -> Self {
        self.http_log_debug = enabled;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// GET a resource and unwrap its envelope key
    pub async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: Option<&SearchOpts>,
        key: &str,
    ) -> Result<T> {
        let body = self.execute(operation, Method::GET, path, query, None).await?;
        unwrap_envelope(body, key)
    }

    /// GET a resource and return the whole response body
    pub async fn get_body(
        &self,
        operation: &'static str,
        path: &str,
        query: Option<&SearchOpts>,
    ) -> Result<Value> {
        let body = self.execute(operation, Method::GET, path, query, None).await?;
        Ok(body.unwrap_or(Value::Null))
    }

    /// Send a JSON body and unwrap the response envelope key
    pub async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Value,
        key: &str,
    ) -> Result<T> {
        let response = self
            .execute(operation, method, path, None, Some(body))
            .await?;
        unwrap_envelope(response, key)
    }

    /// Send a request whose response body is ignored
    pub async fn send_no_content(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<()> {
        self.execute(operation, method, path, None, body).await?;
        Ok(())
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn execute(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        query: Option<&SearchOpts>,
        body: Option<Value>,
    ) -> Result<Option<Value>> {
        let url = join_endpoint(&self.endpoint, path)?;

        if self.http_log_debug {
            debug!("{} REQ: {} {} ({})", self.service, method, url, operation);
        } else {
            trace!("{} {} {}", self.service, method, url);
        }

        let mut request = self
            .http
            .request(method, url)
            .header(AUTH_TOKEN_HEADER, &self.token)
            .header(ACCEPT, "application/json");

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            request = request.query(query);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let result: Result<Option<Value>> = async {
            let response = request.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;

            if self.http_log_debug {
                debug!("{} RESP: {} ({} bytes)", self.service, status, bytes.len());
            }

            if !status.is_success() {
                return Err(map_status(self.service, status, path, &bytes));
            }

            if bytes.is_empty() {
                Ok(None)
            } else {
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
        }
        .await;

        if let Some(metrics) = &self.metrics {
            metrics.record_remote_call(operation, result.is_ok());
        }

        result
    }
}

/// Map a non-success status to a typed error
fn map_status(service: &str, status: StatusCode, path: &str, body: &[u8]) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::Authentication,
        StatusCode::NOT_FOUND => {
            let (kind, id) = path.split_once('/').unwrap_or((path, ""));
            Error::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            }
        }
        _ => Error::Remote {
            service: service.to_string(),
            status: status.as_u16(),
            message: fault_message(body),
        },
    }
}

/// Extract the message of an OpenStack fault body
///
/// Faults look like `{"badRequest": {"message": "...", "code": 400}}`.
fn fault_message(body: &[u8]) -> String {
    let parsed = serde_json::from_slice::<Value>(body).ok().and_then(|v| {
        v.as_object()?
            .values()
            .find_map(|fault| fault.get("message")?.as_str().map(str::to_string))
    });

    parsed.unwrap_or_else(|| {
        let text = String::from_utf8_lossy(body);
        text.chars().take(MAX_ERROR_BODY).collect()
    })
}

/// Take the payload under `key` out of a response envelope
pub(crate) fn unwrap_envelope<T: DeserializeOwned>(body: Option<Value>, key: &str) -> Result<T> {
    let payload = body
        .and_then(|mut v| v.as_object_mut().and_then(|o| o.remove(key)))
        .ok_or_else(|| Error::Internal(format!("Response is missing '{}'", key)))?;
    Ok(serde_json::from_value(payload)?)
}

/// Percent-encode an identifier for use as a path segment
pub fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fault_message() {
        let body = br#"{"itemNotFound": {"message": "Share abc could not be found.", "code": 404}}"#;
        assert_eq!(fault_message(body), "Share abc could not be found.");
        assert_eq!(fault_message(b"plain failure"), "plain failure");
    }

    #[test]
    fn test_map_status() {
        assert!(matches!(
            map_status("share", StatusCode::UNAUTHORIZED, "shares/detail", b""),
            Error::Authentication
        ));

        match map_status("share", StatusCode::NOT_FOUND, "shares/abc", b"") {
            Error::NotFound { kind, id } => {
                assert_eq!(kind, "shares");
                assert_eq!(id, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match map_status("share", StatusCode::BAD_REQUEST, "shares", br#"{"badRequest": {"message": "bad size"}}"#) {
            Error::Remote { status, message, .. } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad size");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unwrap_envelope() {
        let body = Some(json!({"share": {"id": "s1"}}));
        let value: Value = unwrap_envelope(body, "share").unwrap();
        assert_eq!(value["id"], "s1");

        let err = unwrap_envelope::<Value>(None, "share").unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_segment_escapes() {
        assert_eq!(segment("abc-123"), "abc-123");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
