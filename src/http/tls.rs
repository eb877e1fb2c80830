//! TLS server context construction.
//!
//! Loads the certificate chain and private key from PEM files into a rustls
//! `ServerConfig`. Clients are not asked for certificates; the context only
//! proves the server's identity, which is all a local development server needs.

use std::path::Path;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use rustls::ServerConfig;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};

use super::ServerError;

/// Build the server TLS context from PEM files.
pub fn load_tls_context(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, ServerError> {
    let config = build_server_config(cert_path, key_path)?;
    Ok(RustlsConfig::from_config(Arc::new(config)))
}

/// Build a rustls `ServerConfig` that presents `cert_path` and requires no client certificate.
pub fn build_server_config(cert_path: &Path, key_path: &Path) -> Result<ServerConfig, ServerError> {
    let certs = load_certificates(cert_path)?;
    let key = load_private_key(key_path)?;

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ServerError::TlsConfig(e.to_string()))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::CertificateLoad {
            path: cert_path.to_path_buf(),
            reason: format!("certificate and key do not form a usable pair: {e}"),
        })?;

    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(config)
}

fn load_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, ServerError> {
    let to_error = |reason: String| ServerError::CertificateLoad {
        path: path.to_path_buf(),
        reason,
    };

    let certs = CertificateDer::pem_file_iter(path)
        .map_err(|e| to_error(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_error(e.to_string()))?;

    if certs.is_empty() {
        return Err(to_error("no PEM certificate found".to_string()));
    }

    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, ServerError> {
    PrivateKeyDer::from_pem_file(path).map_err(|e| ServerError::CertificateLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert;

    fn provisioned() -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let cert_path = dir.path().join("cert.pem");
        let key_path = dir.path().join("key.pem");
        cert::ensure(&cert_path, &key_path).unwrap();
        (dir, cert_path, key_path)
    }

    #[test]
    fn test_loads_provisioned_pair() {
        let (_dir, cert_path, key_path) = provisioned();
        let config = build_server_config(&cert_path, &key_path).unwrap();
        assert_eq!(config.alpn_protocols, vec![b"http/1.1".to_vec()]);
    }

    #[test]
    fn test_malformed_certificate_is_load_error() {
        let (dir, _cert_path, key_path) = provisioned();
        let bogus = dir.path().join("bogus.pem");
        std::fs::write(&bogus, "garbage").unwrap();

        let err = build_server_config(&bogus, &key_path).unwrap_err();
        assert!(matches!(err, ServerError::CertificateLoad { .. }));
    }

    #[test]
    fn test_missing_key_is_load_error() {
        let (dir, cert_path, _key_path) = provisioned();
        let err = build_server_config(&cert_path, &dir.path().join("absent.pem")).unwrap_err();
        assert!(matches!(err, ServerError::CertificateLoad { .. }));
    }

    #[test]
    fn test_mismatched_key_is_load_error() {
        let (_dir_a, cert_a, _key_a) = provisioned();
        let (_dir_b, _cert_b, key_b) = provisioned();

        let err = build_server_config(&cert_a, &key_b).unwrap_err();
        assert!(matches!(err, ServerError::CertificateLoad { .. }));
    }
}
