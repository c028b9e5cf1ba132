//! HTTP client for the student record store.
//!
//! Built on the `hyper-util` pooled client with rustls. Each request is
//! bounded by a timeout and each response body by a size limit. Plain
//! `http://` is refused unless the client opts in. Nothing is retried.
//!
//! ```ignore
//! use directory_http::{HttpClientBuilder, HttpClientConfig};
//!
//! let client = HttpClientBuilder::with_config(HttpClientConfig::for_testing()).build()?;
//! let page: serde_json::Value = client
//!     .get("http://localhost:5000/api/students?page=1&limit=10")
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod request;
mod response;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, RootStore, TransportSecurity};
pub use error::HttpError;
pub use request::RequestBuilder;
pub use response::HttpResponse;
