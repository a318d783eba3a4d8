//! Dashboard Web Layer
//!
//! Forms, views, templates and the axum router that serve the Manila
//! administration pages.

pub mod context;
pub mod extra_specs;
pub mod forms;
pub mod messages;
pub mod pages;
pub mod routes;
pub mod server;
pub mod views;

pub use context::{AppState, Credentials};
pub use messages::{Level, Message, Messages};
pub use routes::DashboardRouter;
pub use server::{DashboardConfig, DashboardServer};
