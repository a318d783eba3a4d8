//! Dashboard Metrics
//!
//! Prometheus counters for remote API calls and form submissions, kept in
//! a private registry and exposed on `/metrics`.

use crate::error::{Error, Result};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Outcome label values
pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_ERROR: &str = "error";
pub const OUTCOME_INVALID: &str = "invalid";

/// Registered dashboard metrics
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    remote_calls: IntCounterVec,
    form_submissions: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let remote_calls = IntCounterVec::new(
            Opts::new(
                "manila_dashboard_remote_calls_total",
                "Remote API calls by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .map_err(metrics_error)?;

        let form_submissions = IntCounterVec::new(
            Opts::new(
                "manila_dashboard_form_submissions_total",
                "Form submissions by form and outcome",
            ),
            &["form", "outcome"],
        )
        .map_err(metrics_error)?;

        registry
            .register(Box::new(remote_calls.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(form_submissions.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            remote_calls,
            form_submissions,
        })
    }

    /// Count one remote call
    pub fn record_remote_call(&self, operation: &str, ok: bool) {
        let outcome = if ok { OUTCOME_SUCCESS } else { OUTCOME_ERROR };
        self.remote_calls
            .with_label_values(&[operation, outcome])
            .inc();
    }

    /// Count one form submission
    pub fn record_form(&self, form: &str, outcome: &str) {
        self.form_submissions
            .with_label_values(&[form, outcome])
            .inc();
    }

    pub fn remote_call_count(&self, operation: &str, outcome: &str) -> u64 {
        self.remote_calls
            .with_label_values(&[operation, outcome])
            .get()
    }

    pub fn form_count(&self, form: &str, outcome: &str) -> u64 {
        self.form_submissions
            .with_label_values(&[form, outcome])
            .get()
    }

    /// Render the registry in the Prometheus text format
    pub fn encode(&self) -> Result<(String, Vec<u8>)> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_error)?;
        Ok((encoder.format_type().to_string(), buffer))
    }
}

fn metrics_error(e: prometheus::Error) -> Error {
    Error::Internal(format!("Metrics error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.record_remote_call("share_list", true);
        metrics.record_remote_call("share_list", true);
        metrics.record_remote_call("share_list", false);
        metrics.record_form("create_share", OUTCOME_INVALID);

        assert_eq!(metrics.remote_call_count("share_list", OUTCOME_SUCCESS), 2);
        assert_eq!(metrics.remote_call_count("share_list", OUTCOME_ERROR), 1);
        assert_eq!(metrics.form_count("create_share", OUTCOME_INVALID), 1);
    }

    #[test]
    fn test_encode() {
        let metrics = Metrics::new().unwrap();
        metrics.record_remote_call("limits_get", true);
        let (content_type, body) = metrics.encode().unwrap();
        let text = String::from_utf8(body).unwrap();
        assert!(content_type.starts_with("text/plain"));
        assert!(text.contains("manila_dashboard_remote_calls_total"));
    }
}
