//! Manila Dashboard
//!
//! An administrative web dashboard for the OpenStack Manila shared file
//! system service. Operators browse and manage shares, snapshots, share
//! networks, security services and volume types, and edit quotas.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Dashboard (axum)                          │
//! │  ┌────────────┐  ┌────────────────┐  ┌────────────────────────┐  │
//! │  │   Routes   │  │ Forms & Views  │  │  Templates (askama)    │  │
//! │  └─────┬──────┘  └───────┬────────┘  └────────────────────────┘  │
//! │        └────────┬────────┘                                       │
//! ├─────────────────┼────────────────────────────────────────────────┤
//! │                 │      API Client Adapter                        │
//! │  ┌──────────────┴──┐  ┌─────────────────┐  ┌─────────────────┐   │
//! │  │  Manila client  │  │ Keystone lookup │  │ Neutron lookup  │   │
//! │  │  + ext. memo    │  │  (tenants)      │  │ (nets/subnets)  │   │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`api`]: Service catalog and remote API clients
//! - [`dashboard`]: Router, forms, views and page templates
//! - [`domain`]: Records and lookup traits
//! - [`error`]: Error types and handling
//! - [`metrics`]: Prometheus counters

pub mod api;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod metrics;

// Re-export commonly used types
pub use api::{
    ClientConfig, EndpointInterface, ExtensionCache, KeystoneClient, ManilaClient,
    NeutronClient, RequestContext, ServiceCatalog, UserIdentity,
};

pub use dashboard::{AppState, DashboardConfig, DashboardRouter, DashboardServer};

pub use domain::ports::{NameOrId, NetworkDirectory, TenantDirectory, TenantOwned};

pub use error::{Error, ErrorKind, Result};

pub use metrics::Metrics;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
