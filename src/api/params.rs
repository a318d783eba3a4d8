//! Request Parameters
//!
//! One explicit record per remote create/update operation, enumerating
//! exactly the fields each entity type accepts.

use crate::domain::models::{Limit, SecurityServiceType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query filters for list operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchOpts(BTreeMap<String, String>);

impl SearchOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include resources of every tenant (admin only)
    pub fn all_tenants(self) -> Self {
        self.with("all_tenants", "1")
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parameters for creating a share
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareCreate {
    pub share_proto: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_network_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Parameters for renaming a share
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareUpdate {
    pub display_name: String,
    pub display_description: String,
}

/// Parameters for snapshotting a share
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotCreate {
    pub share_id: String,
    pub force: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parameters for creating a share network
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareNetworkCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neutron_net_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neutron_subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parameters for creating a security service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityServiceCreate {
    #[serde(rename = "type")]
    pub service_type: SecurityServiceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Quota limits to change; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuotaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<Limit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<Limit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gigabytes: Option<Limit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_gigabytes: Option<Limit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_networks: Option<Limit>,
}

impl QuotaUpdate {
    pub fn is_empty(&self) -> bool {
        self == &QuotaUpdate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_share_create_omits_unset_fields() {
        let params = ShareCreate {
            share_proto: "NFS".into(),
            size: 1,
            name: Some("demo".into()),
            description: None,
            snapshot_id: None,
            share_network_id: None,
            metadata: BTreeMap::new(),
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"share_proto": "NFS", "size": 1, "name": "demo"})
        );
    }

    #[test]
    fn test_quota_update_encodes_unlimited() {
        let update = QuotaUpdate {
            shares: Some(Limit::Unlimited),
            gigabytes: Some(Limit::Bounded(500)),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"shares": -1, "gigabytes": 500})
        );
        assert!(QuotaUpdate::default().is_empty());
    }

    #[test]
    fn test_security_service_type_field() {
        let params = SecurityServiceCreate {
            service_type: SecurityServiceType::Kerberos,
            dns_ip: Some("10.0.0.2".into()),
            server: None,
            domain: None,
            sid: Some("admin".into()),
            password: None,
            name: None,
            description: None,
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["type"], "kerberos");
        assert_eq!(value["sid"], "admin");
    }

    #[test]
    fn test_search_opts() {
        let opts = SearchOpts::new().all_tenants().with("share_network_id", "sn1");
        let pairs: Vec<_> = opts.pairs().collect();
        assert_eq!(pairs, vec![("all_tenants", "1"), ("share_network_id", "sn1")]);
    }
}
