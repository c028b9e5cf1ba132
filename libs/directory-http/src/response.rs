use bytes::Bytes;
use http::{Response, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// Characters of an error body kept in `HttpError::Status`.
const EXCERPT_CHARS: usize = 512;

/// A response whose body has not been read yet. Reads stop at the
/// client's body limit.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<Incoming>,
    pub(crate) body_limit: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// The whole body, whatever the status.
    ///
    /// # Errors
    /// `BodyTooLarge` past the limit, `Connect` if the stream breaks.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        let limit = self.body_limit;
        Limited::new(self.inner.into_body(), limit)
            .collect()
            .await
            .map(http_body_util::Collected::to_bytes)
            .map_err(|e| {
                if e.is::<LengthLimitError>() {
                    HttpError::BodyTooLarge { limit }
                } else {
                    HttpError::Connect(e)
                }
            })
    }

    /// Decode a 2xx body as JSON.
    ///
    /// # Errors
    /// `Status` for any other status, plus the errors of [`bytes`](Self::bytes)
    /// and `Decode` for malformed JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let status = self.status();
        let body = self.bytes().await?;
        if status.is_success() {
            serde_json::from_slice(&body).map_err(HttpError::Decode)
        } else {
            Err(HttpError::Status {
                status,
                body: excerpt(&body),
            })
        }
    }
}

fn excerpt(body: &[u8]) -> String {
    String::from_utf8_lossy(body).chars().take(EXCERPT_CHARS).collect()
}
