use std::time::Duration;

use http::Uri;

use crate::error::HttpError;

/// Sent as `User-Agent` unless the caller overrides it.
pub const DEFAULT_USER_AGENT: &str = concat!("directory-http/", env!("CARGO_PKG_VERSION"));

/// Which trust anchors verify the store's certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RootStore {
    /// Mozilla roots compiled into the binary.
    #[default]
    Bundled,
    /// The operating system's certificate store.
    System,
}

/// Whether plain `http://` URLs may be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    /// For record stores on localhost and mock servers.
    AllowInsecureHttp,
}

impl TransportSecurity {
    /// Reject URLs this setting does not permit.
    ///
    /// # Errors
    /// Returns `HttpError::Scheme` for `http` under `TlsOnly` and for any
    /// scheme other than `http`/`https`, and `HttpError::InvalidUrl` when the
    /// URL has no scheme or no host.
    pub fn check(self, url: &str, uri: &Uri) -> Result<(), HttpError> {
        let invalid = |reason: &str| HttpError::InvalidUrl {
            url: url.to_owned(),
            reason: reason.to_owned(),
        };
        if uri.authority().is_none() {
            return Err(invalid("missing host"));
        }
        match (uri.scheme_str(), self) {
            (Some("https"), _) | (Some("http"), Self::AllowInsecureHttp) => Ok(()),
            (Some(scheme), _) => Err(HttpError::Scheme {
                scheme: scheme.to_owned(),
            }),
            (None, _) => Err(invalid("missing scheme")),
        }
    }
}

/// Everything the client needs to talk to one record store.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Limit on the whole exchange up to the response head.
    pub timeout: Duration,
    /// Largest response body accepted, in bytes.
    pub body_limit: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
    pub roots: RootStore,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            body_limit: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            roots: RootStore::Bundled,
        }
    }
}

impl HttpClientConfig {
    /// Plain HTTP and a short timeout, for mock servers.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            transport: TransportSecurity::AllowInsecureHttp,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(url: &str, transport: TransportSecurity) -> Result<(), HttpError> {
        transport.check(url, &url.parse().unwrap())
    }

    #[test]
    fn test_defaults() {
        let config = HttpClientConfig::default();
        assert_eq!(config.transport, TransportSecurity::TlsOnly);
        assert_eq!(config.roots, RootStore::Bundled);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("directory-http/"));

        let testing = HttpClientConfig::for_testing();
        assert_eq!(testing.transport, TransportSecurity::AllowInsecureHttp);
        assert_eq!(testing.body_limit, config.body_limit);
    }

    #[test]
    fn test_https_always_allowed() {
        assert!(check("https://records.example/api", TransportSecurity::TlsOnly).is_ok());
    }

    #[test]
    fn test_plain_http_needs_opt_in() {
        let url = "http://localhost:5000/api";
        assert!(matches!(
            check(url, TransportSecurity::TlsOnly),
            Err(HttpError::Scheme { scheme }) if scheme == "http"
        ));
        assert!(check(url, TransportSecurity::AllowInsecureHttp).is_ok());
    }

    #[test]
    fn test_rejects_relative_and_foreign_urls() {
        assert!(matches!(
            check("/students", TransportSecurity::AllowInsecureHttp),
            Err(HttpError::InvalidUrl { .. })
        ));
        assert!(matches!(
            check("ftp://files.example/x", TransportSecurity::AllowInsecureHttp),
            Err(HttpError::Scheme { .. })
        ));
    }
}
