//! Manila Dashboard
//!
//! Serves the Manila administration pages behind an authenticating
//! proxy that supplies the operator's token and service catalog.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use manila_dashboard::{
    AppState, ClientConfig, DashboardConfig, DashboardServer, EndpointInterface, Error, Result,
    ServiceCatalog,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Manila Dashboard - administration pages for shared file systems
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// HTTP bind address
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: String,

    /// Manila endpoint used when requests carry no service catalog
    #[arg(long, env = "SHARE_ENDPOINT")]
    share_endpoint: Option<String>,

    /// Keystone endpoint used for tenant names
    #[arg(long, env = "IDENTITY_ENDPOINT")]
    identity_endpoint: Option<String>,

    /// Neutron endpoint used for network choices
    #[arg(long, env = "NETWORK_ENDPOINT")]
    network_endpoint: Option<String>,

    /// YAML service catalog; replaces the individual endpoint flags
    #[arg(long, env = "CATALOG_FILE")]
    catalog_file: Option<PathBuf>,

    /// Catalog region to prefer
    #[arg(long, env = "OS_REGION_NAME")]
    region: Option<String>,

    /// Catalog interface (public, internal, admin)
    #[arg(long, env = "OS_ENDPOINT_TYPE", default_value = "public")]
    endpoint_interface: String,

    /// Skip TLS certificate verification on outbound calls
    #[arg(long, env = "OPENSTACK_SSL_NO_VERIFY")]
    insecure: bool,

    /// Extra CA certificate (PEM) for outbound calls
    #[arg(long, env = "OPENSTACK_SSL_CACERT")]
    cacert: Option<PathBuf>,

    /// Outbound call timeout in seconds
    #[arg(long, env = "API_TIMEOUT", default_value = "30")]
    timeout_secs: u64,

    /// Extension list cache lifetime in seconds
    #[arg(long, env = "EXTENSION_CACHE_TTL", default_value = "300")]
    extension_cache_ttl: u64,

    /// Log every outbound request at debug
    #[arg(long, env = "HTTP_LOG_DEBUG")]
    http_log_debug: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    info!("Starting Manila Dashboard");
    info!("  Version: {}", manila_dashboard::VERSION);
    info!("  Bind address: {}", args.bind_addr);

    let interface: EndpointInterface = args.endpoint_interface.parse()?;

    let catalog = match &args.catalog_file {
        Some(path) => {
            info!("  Service catalog: {}", path.display());
            ServiceCatalog::from_yaml_file(path)?
        }
        None => ServiceCatalog::from_endpoints(
            args.share_endpoint.as_deref(),
            args.identity_endpoint.as_deref(),
            args.network_endpoint.as_deref(),
            args.region.as_deref(),
            interface,
        ),
    };

    if !catalog.has_service(manila_dashboard::api::catalog::SHARE_SERVICE) {
        warn!("No static share endpoint; relying on X-Service-Catalog from the proxy");
    }

    let client_config = ClientConfig {
        insecure: args.insecure,
        cacert: args.cacert.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
        http_log_debug: args.http_log_debug,
        endpoint_interface: interface,
        region: args.region.clone(),
    };

    if client_config.insecure {
        warn!("TLS certificate verification is disabled");
    }

    let state = AppState::new(
        client_config,
        catalog,
        Duration::from_secs(args.extension_cache_ttl),
    )?;

    let config = DashboardConfig {
        bind_addr: args
            .bind_addr
            .parse()
            .map_err(|e| Error::Configuration(format!("Invalid bind address: {}", e)))?,
    };

    let server = DashboardServer::new(config, state);
    server.run().await?;

    info!("Dashboard shutdown complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn", "tower=warn", "axum=info"] {
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| Error::Configuration(format!("Invalid log directive: {}", e)))?,
        );
    }

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}
