//! HTTPS static file server.
//!
//! This module provides the secure side of the development server:
//! - TLS context construction from the provisioned PEM files
//! - Static file serving with directory listings
//! - Graceful shutdown on SIGINT/SIGTERM

mod server;
pub mod shutdown;
pub mod static_files;
pub mod tls;

pub use server::{SecureStaticServer, ServerError};
