use http::HeaderValue;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::client::HttpClient;
use crate::config::{HttpClientConfig, TransportSecurity};
use crate::error::HttpError;
use crate::tls;

/// Turns an [`HttpClientConfig`] into a ready [`HttpClient`].
#[derive(Debug, Clone, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    /// # Errors
    /// Returns `HttpError::Tls` if the connector cannot be set up and
    /// `HttpError::Header` if the User-Agent is not a valid header value.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let HttpClientConfig {
            timeout,
            body_limit,
            user_agent,
            transport,
            roots,
        } = self.config;
        let user_agent = HeaderValue::from_str(&user_agent)?;
        let connector = tls::connector(roots, transport)?;
        if transport == TransportSecurity::AllowInsecureHttp {
            tracing::debug!("plain HTTP permitted");
        }
        Ok(HttpClient {
            inner: Client::builder(TokioExecutor::new()).build(connector),
            user_agent,
            timeout,
            body_limit,
            transport,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_build_carries_config() {
        let client = HttpClientBuilder::with_config(HttpClientConfig {
            timeout: Duration::from_secs(3),
            body_limit: 1024,
            ..HttpClientConfig::for_testing()
        })
        .build()
        .unwrap();
        assert_eq!(client.timeout, Duration::from_secs(3));
        assert_eq!(client.body_limit, 1024);
        assert_eq!(client.transport, TransportSecurity::AllowInsecureHttp);
    }

    #[tokio::test]
    async fn test_invalid_user_agent_rejected() {
        let result = HttpClientBuilder::with_config(HttpClientConfig {
            user_agent: "bad\nagent".to_owned(),
            ..HttpClientConfig::default()
        })
        .build();
        assert!(matches!(result, Err(HttpError::Header(_))));
    }
}
