//! Domain Ports - Core trait definitions for the dashboard
//!
//! These traits define the boundaries between the views and the external
//! lookup services. Adapters in [`crate::api`] implement them.

use crate::domain::models::{Network, SecurityService, Share, ShareNetwork, Snapshot, Subnet, Tenant};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

// =============================================================================
// Lookup Ports
// =============================================================================

/// Port for the identity service's tenant listing
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// List tenants, with a flag telling whether more pages exist
    async fn tenant_list(&self) -> Result<(Vec<Tenant>, bool)>;
}

/// Port for the network service's topology listing
#[async_trait]
pub trait NetworkDirectory: Send + Sync {
    /// List networks visible to the caller
    async fn network_list(&self) -> Result<Vec<Network>>;

    /// List subnets visible to the caller
    async fn subnet_list(&self) -> Result<Vec<Subnet>>;
}

// =============================================================================
// Record Post-processing Ports
// =============================================================================

/// Records whose display name falls back to their identifier
pub trait NameOrId {
    fn id(&self) -> &str;
    fn name(&self) -> Option<&str>;
    fn set_name(&mut self, name: String);

    /// Display name, or the id when the name is absent or empty
    fn name_or_id(&self) -> &str {
        match self.name() {
            Some(name) if !name.is_empty() => name,
            _ => self.id(),
        }
    }
}

/// Records owned by a tenant whose name can be attached for display
pub trait TenantOwned {
    fn tenant_id(&self) -> Option<&str>;
    fn set_tenant_name(&mut self, name: Option<String>);
}

macro_rules! impl_record_ports {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NameOrId for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn name(&self) -> Option<&str> {
                    self.name.as_deref()
                }

                fn set_name(&mut self, name: String) {
                    self.name = Some(name);
                }
            }

            impl TenantOwned for $ty {
                fn tenant_id(&self) -> Option<&str> {
                    self.project_id.as_deref()
                }

                fn set_tenant_name(&mut self, name: Option<String>) {
                    self.tenant_name = name;
                }
            }
        )*
    };
}

impl_record_ports!(Share, Snapshot, ShareNetwork, SecurityService);

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type TenantDirectoryRef = Arc<dyn TenantDirectory>;
pub type NetworkDirectoryRef = Arc<dyn NetworkDirectory>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_or_id() {
        let mut snap = Snapshot {
            id: "snap-1".into(),
            ..Default::default()
        };
        assert_eq!(snap.name_or_id(), "snap-1");

        snap.name = Some(String::new());
        assert_eq!(snap.name_or_id(), "snap-1");

        snap.set_name("nightly".into());
        assert_eq!(snap.name_or_id(), "nightly");
    }

    #[test]
    fn test_tenant_owned() {
        let mut share = Share {
            id: "s1".into(),
            project_id: Some("p1".into()),
            ..Default::default()
        };
        assert_eq!(share.tenant_id(), Some("p1"));
        share.set_tenant_name(Some("demo".into()));
        assert_eq!(share.tenant_name.as_deref(), Some("demo"));
    }
}
