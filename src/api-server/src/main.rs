//! Rolegate demo API server
//!
//! Serves a small account API whose routes are guarded by the RBAC gate.
//! Callers present their roles in the `x-roles` header.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (0.0.0.0:8080)
//! cargo run --bin rolegate-server
//!
//! # Custom denial message and role-aware default check
//! cargo run --bin rolegate-server -- --forbidden-message goodbye --check best-match
//!
//! # Enable debug logging
//! RUST_LOG=debug cargo run --bin rolegate-server
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging level (trace, debug, info, warn, error)
//! - `ROLEGATE_HOST`: Server host (default: 0.0.0.0)
//! - `ROLEGATE_PORT`: Server port (default: 8080)
//! - `ROLEGATE_FORBIDDEN_MESSAGE`: Message of 403 responses (default: No Privilege)
//! - `ROLEGATE_ADDITIONAL_PRIVILEGES`: Comma-separated extra registry roles

use anyhow::Result;
use clap::Parser;
use rolegate_api_server::{server::ServerBuilder, DefaultCheck};
use rolegate_authz::config::{RbacOptions, DEFAULT_FORBIDDEN_MESSAGE};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Rolegate demo API server
#[derive(Parser, Debug)]
#[command(
    name = "rolegate-server",
    version,
    about = "Demo API server guarded by rolegate RBAC",
    long_about = None
)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "ROLEGATE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short = 'p', long, default_value = "8080", env = "ROLEGATE_PORT")]
    port: u16,

    /// Message carried by 403 responses
    #[arg(long, default_value = DEFAULT_FORBIDDEN_MESSAGE, env = "ROLEGATE_FORBIDDEN_MESSAGE")]
    forbidden_message: String,

    /// Extra roles merged into the role registry
    #[arg(long, value_delimiter = ',', env = "ROLEGATE_ADDITIONAL_PRIVILEGES")]
    additional_privileges: Vec<String>,

    /// Check function used by routes without an override
    #[arg(long, value_enum, default_value_t = DefaultCheck::Wildcard)]
    check: DefaultCheck,

    /// Enable JSON logging format
    #[arg(long, env = "ROLEGATE_JSON_LOGS")]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn rbac_options(&self) -> RbacOptions {
        RbacOptions {
            forbidden_message: self.forbidden_message.clone(),
            additional_privileges: self.additional_privileges.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args)?;

    info!("Starting rolegate API server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let server = ServerBuilder::new()
        .host(&args.host)
        .port(args.port)
        .rbac(args.rbac_options())
        .default_check(args.check)
        .build()?;

    info!("Health check: http://{}:{}/health", args.host, args.port);
    info!("Press Ctrl+C to shutdown gracefully");

    if let Err(e) = server.run().await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize tracing/logging subsystem
fn init_tracing(args: &Args) -> Result<()> {
    let log_level = args.log_level.parse::<tracing::Level>().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', using 'info'", args.log_level);
        tracing::Level::INFO
    });
    // Verbose levels compare greater in tracing.
    let http_level = if log_level >= tracing::Level::DEBUG {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "rolegate_api_server={log_level},rolegate_authz={log_level},tower_http={http_level},axum={http_level}"
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if args.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()?;
    }

    Ok(())
}
