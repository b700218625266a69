use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;
use crate::error::{ServerError, ServerResult};

/// rustls only negotiates TLS 1.2 and 1.3.
pub async fn load(tls: &TlsConfig) -> ServerResult<RustlsConfig> {
    RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .map_err(|e| {
            ServerError::Config(format!(
                "loading certificate {} and key {}: {e}",
                tls.cert_path.display(),
                tls.key_path.display()
            ))
        })
}
