use std::error::Error as StdError;
use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("URL scheme '{scheme}' is not allowed")]
    Scheme { scheme: String },

    #[error("invalid header value: {0}")]
    Header(#[from] http::header::InvalidHeaderValue),

    #[error("could not build request: {0}")]
    Request(#[from] http::Error),

    #[error("could not encode JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("could not decode JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("no response within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(#[source] BoxError),

    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Non-2xx reply; `body` is a bounded excerpt of the response.
    #[error("{status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl HttpError {
    /// The exchange failed before a complete response was read.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connect(_) | Self::Tls(_) | Self::BodyTooLarge { .. }
        )
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Self::Connect(Box::new(err))
    }
}
