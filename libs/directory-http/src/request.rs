use bytes::Bytes;
use http::header::{CONTENT_TYPE, USER_AGENT};
use http::{HeaderName, HeaderValue, Method, Request, Uri};
use http_body_util::Full;
use serde::Serialize;

use crate::client::HttpClient;
use crate::error::HttpError;
use crate::response::HttpResponse;

/// A request being assembled. Problems found while building surface from
/// [`send`](Self::send).
#[must_use = "nothing is sent until .send() is awaited"]
pub struct RequestBuilder {
    client: HttpClient,
    method: Method,
    url: String,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Bytes,
    deferred: Option<HttpError>,
}

impl RequestBuilder {
    pub(crate) fn new(client: HttpClient, method: Method, url: &str) -> Self {
        Self {
            client,
            method,
            url: url.to_owned(),
            headers: Vec::new(),
            body: Bytes::new(),
            deferred: None,
        }
    }

    fn defer(&mut self, err: HttpError) {
        self.deferred.get_or_insert(err);
    }

    /// Use `body` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(encoded) => {
                self.body = Bytes::from(encoded);
                self.headers
                    .push((CONTENT_TYPE, HeaderValue::from_static("application/json")));
            }
            Err(e) => self.defer(HttpError::Encode(e)),
        }
        self
    }

    /// Send and wait for the response head. Any status is `Ok`.
    ///
    /// # Errors
    /// Returns an error for a bad URL or body, a scheme the client does not
    /// permit, a connection failure, or no response within the timeout.
    pub async fn send(self) -> Result<HttpResponse, HttpError> {
        let Self {
            client,
            method,
            url,
            headers,
            body,
            deferred,
        } = self;
        if let Some(err) = deferred {
            return Err(err);
        }

        let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| HttpError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        client.transport.check(&url, &uri)?;

        let request = headers
            .into_iter()
            .fold(
                Request::builder()
                    .method(method.clone())
                    .uri(uri)
                    .header(USER_AGENT, client.user_agent.clone()),
                |builder, (name, value)| builder.header(name, value),
            )
            .body(Full::new(body))?;

        let response = tokio::time::timeout(client.timeout, client.inner.request(request))
            .await
            .map_err(|_| HttpError::Timeout(client.timeout))??;
        tracing::debug!(
            %method,
            %url,
            status = response.status().as_u16(),
            "store replied"
        );

        Ok(HttpResponse {
            inner: response,
            body_limit: client.body_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HttpClientBuilder;
    use crate::config::HttpClientConfig;

    fn client() -> HttpClient {
        HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap()
    }

    #[test]
    fn test_json_sets_body_and_content_type() {
        let request = client()
            .post("http://localhost:5000/api/students")
            .json(&serde_json::json!({"name": "Ann"}));
        assert_eq!(
            request.headers,
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))]
        );
        assert_eq!(request.body, Bytes::from_static(br#"{"name":"Ann"}"#));
    }

    #[tokio::test]
    async fn test_unencodable_body_surfaces_on_send() {
        let mut body = std::collections::BTreeMap::new();
        body.insert(vec![1u8], "non-string keys cannot become JSON");
        let err = client()
            .post("http://localhost:5000/api/students")
            .json(&body)
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Encode(_)));
    }

    #[tokio::test]
    async fn test_unparsable_url_surfaces_on_send() {
        let err = client().get("http://bad host/").send().await.unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl { .. }));
    }
}
