//! `StudentGateway` over the record store's REST API.
//!
//! Routes, relative to the configured base URL:
//! - `GET    students?page=&limit=` returns `{ data, totalPages, totalRecords }`
//! - `GET    students/{id}`         returns `{ data }`
//! - `POST   students`              with a camelCase draft
//! - `PUT    students/{id}`         with a camelCase draft
//! - `DELETE students/{id}`

use async_trait::async_trait;
use directory_http::{HttpClient, HttpClientBuilder, HttpError, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use student_directory_sdk::{
    GatewayError, PageResult, Student, StudentDraft, StudentGateway, StudentId,
};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::DirectoryConfig;

/// Failure to construct the gateway from configuration.
#[derive(Debug, Error)]
pub enum GatewaySetupError {
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base URL '{0}' cannot carry a path")]
    OpaqueBaseUrl(String),
    #[error(transparent)]
    Http(#[from] HttpError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEnvelope {
    #[serde(default)]
    data: Option<Vec<Student>>,
    #[serde(default)]
    total_pages: Option<u32>,
    #[serde(default)]
    total_records: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    #[serde(default)]
    data: Option<Student>,
}

/// Error body as sent by the store. Every part is optional.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    errors: Option<Value>,
}

impl ErrorBody {
    fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Rejected field names, from `field` and from `errors` given either as
    /// a list of `{field|path|param}` entries or as an object keyed by field.
    fn fields(&self) -> Vec<String> {
        let listed: Vec<String> = match &self.errors {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| {
                    ["field", "path", "param"]
                        .iter()
                        .find_map(|key| entry.get(key).and_then(Value::as_str))
                        .map(str::to_owned)
                })
                .collect(),
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };
        self.field.iter().cloned().chain(listed).collect()
    }
}

#[derive(Clone, Debug)]
pub struct HttpStudentGateway {
    client: HttpClient,
    students: Url,
}

impl HttpStudentGateway {
    /// Gateway for the `students` collection under `base`.
    ///
    /// # Errors
    /// Returns `OpaqueBaseUrl` if `base` cannot have path segments.
    pub fn new(client: HttpClient, base: &Url) -> Result<Self, GatewaySetupError> {
        let mut students = base.clone();
        students
            .path_segments_mut()
            .map_err(|()| GatewaySetupError::OpaqueBaseUrl(base.to_string()))?
            .pop_if_empty()
            .push("students");
        Ok(Self { client, students })
    }

    /// Build the HTTP client and gateway described by `config`.
    ///
    /// # Errors
    /// Returns an error if the base URL does not parse or the client cannot
    /// be built.
    pub fn from_config(config: &DirectoryConfig) -> Result<Self, GatewaySetupError> {
        let base = Url::parse(&config.base_url).map_err(|source| {
            GatewaySetupError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            }
        })?;
        let client = HttpClientBuilder::with_config(config.http_client_config()).build()?;
        Self::new(client, &base)
    }

    fn list_url(&self, page: u32, limit: u32) -> Url {
        let mut url = self.students.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        url
    }

    fn record_url(&self, id: StudentId) -> Url {
        let mut url = self.students.clone();
        // `new` already proved the URL can carry path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&id.to_string());
        }
        url
    }
}

/// Send and discard the body of a 2xx response.
async fn execute(request: RequestBuilder, id: Option<StudentId>) -> Result<(), GatewayError> {
    let response = request.send().await.map_err(network)?;
    let status = response.status();
    let body = response.bytes().await.map_err(network)?;
    if status.is_success() {
        return Ok(());
    }
    debug!(status = status.as_u16(), "store rejected request");
    Err(status_error(status.as_u16(), &body, id))
}

/// Send and decode the JSON body of a 2xx response.
async fn fetch<T: DeserializeOwned>(
    request: RequestBuilder,
    id: Option<StudentId>,
) -> Result<T, GatewayError> {
    let response = request.send().await.map_err(network)?;
    response.json().await.map_err(|err| match err {
        HttpError::Status { status, body } => {
            debug!(status = status.as_u16(), "store rejected request");
            status_error(status.as_u16(), body.as_bytes(), id)
        }
        other => network(other),
    })
}

fn network(err: HttpError) -> GatewayError {
    if !err.is_transport() {
        warn!(error = %err, "store exchange failed");
    }
    GatewayError::Network(err.to_string())
}

fn status_error(status: u16, body: &[u8], id: Option<StudentId>) -> GatewayError {
    let parsed = ErrorBody::parse(body);
    match (status, id) {
        (404, Some(id)) => GatewayError::NotFound { id },
        (400 | 422, _) => GatewayError::Validation {
            fields: parsed.fields(),
            message: parsed.message,
        },
        _ => GatewayError::Server {
            status,
            message: parsed.message,
        },
    }
}

#[async_trait]
impl StudentGateway for HttpStudentGateway {
    #[instrument(skip_all, fields(page = page, limit = limit))]
    async fn list_page(&self, page: u32, limit: u32) -> Result<PageResult, GatewayError> {
        let url = self.list_url(page, limit);
        let envelope: ListEnvelope = fetch(self.client.get(url.as_str()), None).await?;
        let items = envelope.data.unwrap_or_default();
        debug!(count = items.len(), "listed students");
        Ok(PageResult::new(
            items,
            page,
            limit,
            envelope.total_pages.unwrap_or(1),
            envelope.total_records.unwrap_or(0),
        ))
    }

    #[instrument(skip_all, fields(id = id))]
    async fn get_by_id(&self, id: StudentId) -> Result<Student, GatewayError> {
        let url = self.record_url(id);
        let envelope: RecordEnvelope = fetch(self.client.get(url.as_str()), Some(id)).await?;
        envelope.data.ok_or(GatewayError::NotFound { id })
    }

    #[instrument(skip_all)]
    async fn create(&self, draft: &StudentDraft) -> Result<Student, GatewayError> {
        let request = self.client.post(self.students.as_str()).json(draft);
        let envelope: RecordEnvelope = fetch(request, None).await?;
        envelope.data.ok_or_else(|| {
            GatewayError::Network("create response carried no record".to_owned())
        })
    }

    #[instrument(skip_all, fields(id = id))]
    async fn update(&self, id: StudentId, draft: &StudentDraft) -> Result<Student, GatewayError> {
        let url = self.record_url(id);
        let request = self.client.put(url.as_str()).json(draft);
        let envelope: RecordEnvelope = fetch(request, Some(id)).await?;
        envelope.data.ok_or(GatewayError::NotFound { id })
    }

    #[instrument(skip_all, fields(id = id))]
    async fn delete(&self, id: StudentId) -> Result<(), GatewayError> {
        let url = self.record_url(id);
        execute(self.client.delete(url.as_str()), Some(id)).await
    }
}
