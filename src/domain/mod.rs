//! Domain layer - Records and port definitions
//!
//! This module defines the records the dashboard manipulates and the
//! traits (ports) that the lookup adapters implement.

pub mod models;
pub mod ports;

pub use models::*;
pub use ports::*;
