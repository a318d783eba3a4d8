//! Domain Models - Records exchanged with the Manila, Keystone and Neutron APIs
//!
//! The dashboard does not own these schemas. It decodes the fields it
//! displays or forwards and tolerates everything else.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Limits
// =============================================================================

/// A quota or absolute limit value
///
/// The remote API encodes "unlimited" as `-1`; it is normalised to
/// [`Limit::Unlimited`] when a response is decoded and written back as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Bounded(i64),
    Unlimited,
}

impl Limit {
    /// Sentinel used on the wire for unlimited values
    pub const UNLIMITED_SENTINEL: i64 = -1;

    /// Normalise a raw wire value
    pub fn from_raw(value: i64) -> Self {
        if value == Self::UNLIMITED_SENTINEL {
            Limit::Unlimited
        } else {
            Limit::Bounded(value)
        }
    }

    /// Value as sent to the remote API
    pub fn to_raw(self) -> i64 {
        match self {
            Limit::Bounded(v) => v,
            Limit::Unlimited => Self::UNLIMITED_SENTINEL,
        }
    }

    /// Numeric view, with unlimited mapped to positive infinity
    pub fn as_f64(self) -> f64 {
        match self {
            Limit::Bounded(v) => v as f64,
            Limit::Unlimited => f64::INFINITY,
        }
    }

    pub fn is_unlimited(self) -> bool {
        matches!(self, Limit::Unlimited)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Bounded(v) => write!(f, "{}", v),
            Limit::Unlimited => write!(f, "Unlimited"),
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.to_raw())
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Limit::from_raw)
    }
}

/// Per-tenant resource limits, keyed by resource name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuotaSet {
    pub items: BTreeMap<String, Limit>,
}

impl QuotaSet {
    /// Build from a `quota_set` object, keeping only integer entries
    pub fn from_json(value: &serde_json::Value) -> Self {
        let items = value
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_i64().map(|n| (k.clone(), Limit::from_raw(n))))
                    .collect()
            })
            .unwrap_or_default();
        Self { items }
    }

    pub fn get(&self, name: &str) -> Option<Limit> {
        self.items.get(name).copied()
    }
}

// =============================================================================
// Shares
// =============================================================================

/// A provisioned shared file system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Share {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub share_proto: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub share_network_id: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub export_location: Option<String>,
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Owning tenant's name, filled in by the views
    #[serde(skip_deserializing)]
    pub tenant_name: Option<String>,
}

/// A point-in-time copy of a share
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    #[serde(default)]
    pub share_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(skip_deserializing)]
    pub tenant_name: Option<String>,
}

// =============================================================================
// Share Networks & Security Services
// =============================================================================

/// Network binding used by shares that require isolation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareNetwork {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub neutron_net_id: Option<String>,
    #[serde(default)]
    pub neutron_subnet_id: Option<String>,
    #[serde(default)]
    pub network_type: Option<String>,
    #[serde(default)]
    pub segmentation_id: Option<i64>,
    #[serde(default)]
    pub cidr: Option<String>,
    #[serde(default)]
    pub ip_version: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(skip_deserializing)]
    pub tenant_name: Option<String>,
}

/// Authentication backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityServiceType {
    ActiveDirectory,
    Ldap,
    Kerberos,
}

impl SecurityServiceType {
    pub const ALL: [SecurityServiceType; 3] = [
        SecurityServiceType::ActiveDirectory,
        SecurityServiceType::Ldap,
        SecurityServiceType::Kerberos,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityServiceType::ActiveDirectory => "active_directory",
            SecurityServiceType::Ldap => "ldap",
            SecurityServiceType::Kerberos => "kerberos",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            SecurityServiceType::ActiveDirectory => "Active Directory",
            SecurityServiceType::Ldap => "LDAP",
            SecurityServiceType::Kerberos => "Kerberos",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for SecurityServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authentication backend attached to share networks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityService {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: SecurityServiceType,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dns_ip: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(skip_deserializing)]
    pub tenant_name: Option<String>,
}

// =============================================================================
// Volume Types & Extensions
// =============================================================================

/// Share volume type with its scheduling extra specs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeType {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub extra_specs: BTreeMap<String, String>,
}

/// An API extension advertised by the remote service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub updated: Option<String>,
}

// =============================================================================
// Identity & Network Lookups
// =============================================================================

/// Keystone project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Neutron network
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Neutron subnet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub cidr: String,
}

impl Network {
    pub fn name_or_id(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

impl Subnet {
    pub fn name_or_id(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_limit_sentinel() {
        assert_eq!(Limit::from_raw(-1), Limit::Unlimited);
        assert_eq!(Limit::from_raw(0), Limit::Bounded(0));
        assert_eq!(Limit::from_raw(50), Limit::Bounded(50));
        assert_eq!(Limit::Unlimited.to_raw(), -1);
        assert!(Limit::Unlimited.as_f64().is_infinite());
        assert_eq!(Limit::Bounded(7).as_f64(), 7.0);
        assert_eq!(Limit::Unlimited.to_string(), "Unlimited");
    }

    #[test]
    fn test_limit_serde() {
        let l: Limit = serde_json::from_value(json!(-1)).unwrap();
        assert!(l.is_unlimited());
        assert_eq!(serde_json::to_value(Limit::Unlimited).unwrap(), json!(-1));
        assert_eq!(serde_json::to_value(Limit::Bounded(10)).unwrap(), json!(10));
    }

    #[test]
    fn test_quota_set_skips_non_numeric() {
        let qs = QuotaSet::from_json(&json!({
            "id": "tenant-1",
            "shares": 10,
            "gigabytes": -1,
        }));
        assert_eq!(qs.items.len(), 2);
        assert_eq!(qs.get("shares"), Some(Limit::Bounded(10)));
        assert_eq!(qs.get("gigabytes"), Some(Limit::Unlimited));
        assert_eq!(qs.get("id"), None);
    }

    #[test]
    fn test_share_decodes_nulls() {
        let share: Share = serde_json::from_value(json!({
            "id": "s1",
            "name": null,
            "size": 1,
            "share_proto": "NFS",
            "status": "available",
            "metadata": {"a": "b"},
        }))
        .unwrap();
        assert_eq!(share.name, None);
        assert_eq!(share.metadata.get("a").map(String::as_str), Some("b"));
        assert_eq!(share.tenant_name, None);
    }

    #[test]
    fn test_security_service_type() {
        let ss: SecurityService = serde_json::from_value(json!({
            "id": "ss1",
            "type": "active_directory",
            "password": "secret",
        }))
        .unwrap();
        assert_eq!(ss.service_type, SecurityServiceType::ActiveDirectory);
        assert!(serde_json::to_value(&ss).unwrap().get("password").is_none());
        assert_eq!(SecurityServiceType::parse("ldap"), Some(SecurityServiceType::Ldap));
        assert_eq!(SecurityServiceType::parse("nis"), None);
    }
}
