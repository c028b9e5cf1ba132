use std::time::Duration;

use directory_http::{HttpClientConfig, RootStore, TransportSecurity};
use serde::{Deserialize, Serialize};
use student_directory_sdk::{InvalidPageSize, PageSize};

/// Configuration for the student directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Base URL of the record store API; `/students` is appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Initial page size; must be one of 5, 10, 25, 50.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Records fetched for client-side name search.
    #[serde(default = "default_bulk_search_size")]
    pub bulk_search_size: u32,
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    /// Permit plain `http://` base URLs.
    #[serde(default = "default_allow_insecure_http")]
    pub allow_insecure_http: bool,
    /// Verify the store against the OS certificate store instead of the
    /// bundled Mozilla roots.
    #[serde(default)]
    pub system_roots: bool,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            default_page_size: default_page_size(),
            bulk_search_size: default_bulk_search_size(),
            max_body_size: default_max_body_size(),
            allow_insecure_http: default_allow_insecure_http(),
            system_roots: false,
        }
    }
}

impl DirectoryConfig {
    /// The configured initial page size.
    ///
    /// # Errors
    /// Returns `InvalidPageSize` if `default_page_size` is not an offered option.
    pub fn page_size(&self) -> Result<PageSize, InvalidPageSize> {
        PageSize::try_from(self.default_page_size)
    }

    /// HTTP client settings derived from this configuration.
    #[must_use]
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
            body_limit: self.max_body_size,
            user_agent: concat!("student-directory/", env!("CARGO_PKG_VERSION")).to_owned(),
            transport: if self.allow_insecure_http {
                TransportSecurity::AllowInsecureHttp
            } else {
                TransportSecurity::TlsOnly
            },
            roots: if self.system_roots {
                RootStore::System
            } else {
                RootStore::Bundled
            },
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_owned()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    10
}

fn default_bulk_search_size() -> u32 {
    crate::domain::search::BULK_SEARCH_SIZE
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024
}

fn default_allow_insecure_http() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: DirectoryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DirectoryConfig::default());
        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert_eq!(config.bulk_search_size, 100);
        assert_eq!(config.page_size(), Ok(PageSize::Ten));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_json::from_str::<DirectoryConfig>(r#"{"base_uri": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_page_size_reported() {
        let config = DirectoryConfig {
            default_page_size: 20,
            ..DirectoryConfig::default()
        };
        assert_eq!(config.page_size(), Err(InvalidPageSize(20)));
    }

    #[test]
    fn test_http_client_config_follows_transport_flag() {
        let config = DirectoryConfig {
            allow_insecure_http: false,
            request_timeout_secs: 4,
            ..DirectoryConfig::default()
        };
        let http = config.http_client_config();
        assert_eq!(http.transport, TransportSecurity::TlsOnly);
        assert_eq!(http.roots, RootStore::Bundled);
        assert_eq!(http.timeout, Duration::from_secs(4));
        assert!(http.user_agent.starts_with("student-directory/"));
    }

    #[test]
    fn test_system_roots_select_os_store() {
        let config: DirectoryConfig = serde_json::from_str(r#"{"system_roots": true}"#).unwrap();
        assert_eq!(config.http_client_config().roots, RootStore::System);
    }
}
