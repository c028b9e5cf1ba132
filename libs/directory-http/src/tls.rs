//! HTTPS connector construction.

use std::sync::Arc;

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::crypto::CryptoProvider;

use crate::config::{RootStore, TransportSecurity};
use crate::error::HttpError;

/// The process-wide provider if one was installed, else aws-lc-rs.
fn provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

fn system_roots() -> Result<rustls::RootCertStore, HttpError> {
    let loaded = rustls_native_certs::load_native_certs();
    for err in &loaded.errors {
        tracing::warn!(error = %err, "skipping unreadable system certificate");
    }
    let mut store = rustls::RootCertStore::empty();
    let (added, ignored) = store.add_parsable_certificates(loaded.certs);
    if added == 0 {
        return Err(HttpError::Tls(format!(
            "no usable system root certificates ({ignored} unparsable)"
        )));
    }
    tracing::debug!(added, ignored, "loaded system root certificates");
    Ok(store)
}

/// A connector honoring the root store and scheme policy.
pub(crate) fn connector(
    roots: RootStore,
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let builder = match roots {
        RootStore::Bundled => HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(provider())
            .map_err(|e| HttpError::Tls(e.to_string()))?,
        RootStore::System => {
            let tls = rustls::ClientConfig::builder_with_provider(provider())
                .with_safe_default_protocol_versions()
                .map_err(|e| HttpError::Tls(e.to_string()))?
                .with_root_certificates(system_roots()?)
                .with_no_client_auth();
            HttpsConnectorBuilder::new().with_tls_config(tls)
        }
    };
    let connector = match transport {
        TransportSecurity::TlsOnly => builder.https_only().enable_http1().build(),
        TransportSecurity::AllowInsecureHttp => builder.https_or_http().enable_http1().build(),
    };
    Ok(connector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_connector_builds_for_both_transports() {
        assert!(connector(RootStore::Bundled, TransportSecurity::TlsOnly).is_ok());
        assert!(connector(RootStore::Bundled, TransportSecurity::AllowInsecureHttp).is_ok());
    }
}
