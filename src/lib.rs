//! localtls: a local development HTTPS file server.
//!
//! Serves a directory over TLS with a self-signed `localhost` certificate that
//! is generated on first run, so browser features restricted to secure
//! contexts can be tested without a certificate authority.

pub mod app;
pub mod cert;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;

pub use cert::{ensure, PersistedFiles, ProvisionError};
pub use config::AppConfig;
pub use http::{SecureStaticServer, ServerError};
