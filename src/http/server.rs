//! HTTPS server startup logic.
//!
//! `SecureStaticServer` owns everything the accept loop needs: the TLS
//! context, the bound listener and the router. Binding happens eagerly in
//! [`SecureStaticServer::bind`] so that certificate and port problems are
//! reported before anything is served.

use std::future::Future;
use std::net::{IpAddr, SocketAddr, TcpListener};
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;

use crate::app::create_router;
use crate::config::{AppConfig, BANNER_HOST};

use super::{shutdown, tls};

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid http.host '{0}': expected an IP address")]
    InvalidAddress(String),

    #[error("Served root {0} is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("Failed to load certificate or key from {path}: {reason}")]
    CertificateLoad { path: PathBuf, reason: String },

    #[error("Failed to bind {addr}: {source}")]
    PortBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build TLS configuration: {0}")]
    TlsConfig(String),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// A TLS static file server with its listener already bound.
pub struct SecureStaticServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    tls: RustlsConfig,
    app: Router,
    grace: Duration,
}

impl SecureStaticServer {
    /// Build the TLS context and bind the listener described by `config`.
    ///
    /// The TLS context is built first, so a broken certificate is reported even
    /// when the port is also unavailable.
    pub fn bind(config: &AppConfig) -> Result<Self, ServerError> {
        let root = &config.http.root;
        if !root.is_dir() {
            return Err(ServerError::RootNotDirectory(root.clone()));
        }

        let tls = tls::load_tls_context(&config.tls.cert_path, &config.tls.key_path)?;

        let ip: IpAddr = config
            .http
            .host
            .parse()
            .map_err(|_| ServerError::InvalidAddress(config.http.host.clone()))?;
        let addr = SocketAddr::new(ip, config.http.port);

        let listener =
            TcpListener::bind(addr).map_err(|source| ServerError::PortBind { addr, source })?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        tracing::info!(
            %local_addr,
            root = %root.display(),
            cert = %config.tls.cert_path.display(),
            "Listener bound"
        );

        Ok(Self {
            listener,
            local_addr,
            tls,
            app: create_router(root),
            grace: config.http.shutdown_grace(),
        })
    }

    /// Address the listener is bound to (useful when port 0 was requested).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The URL a browser on this machine should open.
    pub fn url(&self) -> String {
        format!("https://{}:{}", BANNER_HOST, self.local_addr.port())
    }

    /// Serve until the process receives Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(shutdown::shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then shut down gracefully.
    pub async fn run_until<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = Handle::new();
        shutdown::setup_shutdown_handler(handle.clone(), signal, self.grace);

        let url = self.url();
        let listening = handle.clone();
        tokio::spawn(async move {
            if let Some(addr) = listening.listening().await {
                tracing::info!(%addr, %url, "Serving HTTPS");
                println!("{}", banner(&url));
            }
        });

        axum_server::from_tcp_rustls(self.listener, self.tls)
            .handle(handle)
            .serve(self.app.into_make_service())
            .await?;

        println!("Server stopped");
        Ok(())
    }
}

fn banner(url: &str) -> String {
    let lines = [
        "HTTPS server started".to_string(),
        format!("URL: {url}"),
        String::new(),
        "In the browser:".to_string(),
        "1. Accept the self-signed certificate warning".to_string(),
        "2. Continue to the site".to_string(),
        "3. Secure-context features (camera, etc.) are available".to_string(),
    ];

    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 2;
    let rule = "-".repeat(width);

    let mut out = format!("\n+{rule}+\n");
    for line in &lines {
        out.push_str(&format!("| {line:<w$} |\n", w = width - 2));
    }
    out.push_str(&format!("+{rule}+\n"));
    out
}
