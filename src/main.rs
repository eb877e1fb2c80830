//! localtls: a local development HTTPS file server.
//!
//! This is the application entry point. It parses the command line, loads the
//! optional TOML configuration, initializes tracing, provisions the self-signed
//! certificate if needed, and serves the root directory over HTTPS until
//! interrupted.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use localtls::cert::{self, ProvisionError};
use localtls::config::{AppConfig, Overrides, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use localtls::SecureStaticServer;

/// localtls: serve a directory over HTTPS with a self-signed certificate
#[derive(Parser, Debug)]
#[command(name = "localtls", version, about)]
struct Args {
    /// Path to configuration file (optional; defaults are used when absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "localtls=debug")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory to serve
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Certificate path (generated if missing)
    #[arg(long)]
    cert: Option<PathBuf>,

    /// Private key path (generated if missing)
    #[arg(long)]
    key: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            root: self.root.clone(),
            cert_path: self.cert.clone(),
            key_path: self.key.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // An explicitly named config file must exist; the default one is optional
    let loaded = match &args.config {
        Some(path) => AppConfig::load(path),
        None => AppConfig::load_or_default(DEFAULT_CONFIG_PATH),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    config.apply_overrides(args.overrides());

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        host = %config.http.host,
        port = config.http.port,
        root = %config.http.root.display(),
        "Loaded configuration"
    );

    match cert::ensure(&config.tls.cert_path, &config.tls.key_path) {
        Ok(files) if files.generated => {
            println!("Self-signed certificate generated: {}", files.cert_path.display());
        }
        Ok(_) => {}
        Err(e @ ProvisionError::DependencyMissing(_)) => {
            tracing::error!(error = %e, "Certificate provisioning unavailable");
            eprintln!("Error: {e}");
            eprintln!("This build cannot generate certificates; provide cert and key files or use a build with RSA support.");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            tracing::error!(error = %e, "Certificate provisioning failed");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    }

    let server = match SecureStaticServer::bind(&config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Server startup failed");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server terminated with an error");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
