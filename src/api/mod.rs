//! API Client Adapter
//!
//! Per-request clients for the remote services the dashboard fronts:
//! Manila (shares), Keystone (tenant names) and Neutron (network choices).

pub mod catalog;
pub mod identity;
pub mod manila;
pub mod memo;
pub mod network;
pub mod params;
pub mod rest;
pub mod session;
pub mod transport;

pub use catalog::{EndpointInterface, ServiceCatalog};
pub use identity::KeystoneClient;
pub use manila::ManilaClient;
pub use memo::{ExtensionCache, MemoKey};
pub use network::NeutronClient;
pub use params::*;
pub use rest::ServiceClient;
pub use session::{RequestContext, UserIdentity};
pub use transport::ClientConfig;
