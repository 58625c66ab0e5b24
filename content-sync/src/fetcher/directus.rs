//! Directus REST client.
//!
//! Every response is wrapped in `{ "data": ... }` on success or
//! `{ "errors": [{ "message": ... }] }` on failure.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use content_sync_shared::{Collection, FieldDescriptor, Record, RecordId};

use crate::errors::FetchError;
use crate::fetcher::content_fetcher::{ContentSource, StatusFilter};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ApiErrorBody>,
}

/// Error code Directus uses both for denied access and for items that do not
/// exist, so that existence is not leaked.
const FORBIDDEN_CODE: &str = "FORBIDDEN";

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    extensions: Option<ApiErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorExtensions {
    #[serde(default)]
    code: Option<String>,
}

impl ApiErrorBody {
    fn has_code(&self, code: &str) -> bool {
        self.extensions
            .as_ref()
            .and_then(|e| e.code.as_deref())
            .is_some_and(|c| c == code)
    }
}

#[derive(Debug, Default, Deserialize)]
struct CollectionMeta {
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    hidden: bool,
}

#[derive(Debug, Deserialize)]
struct RawCollection {
    collection: String,
    #[serde(default)]
    meta: Option<CollectionMeta>,
    /// `null` for folder-style collections that have no table behind them.
    #[serde(default)]
    schema: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct FieldMeta {
    #[serde(default)]
    hidden: bool,
}

#[derive(Debug, Deserialize)]
struct RawField {
    field: String,
    #[serde(rename = "type")]
    field_type: Option<String>,
    #[serde(default)]
    meta: Option<FieldMeta>,
}

/// HTTP client for the Directus REST API, authenticated with a static token.
///
/// # Example
///
/// ```ignore
/// use content_sync::fetcher::{ContentSource, DirectusClient};
///
/// let client = DirectusClient::new("https://cms.example.com", "token", None)?;
/// let collections = client.collections().await?;
/// ```
pub struct DirectusClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl DirectusClient {
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|e| FetchError::url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::url(format!(
                "'{}' cannot be used as a base URL",
                base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        info!(base_url = %base_url, "Created Directus client");

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// Append percent-encoded path segments to the base URL, keeping any
    /// path prefix the base already has.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::url(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of an item listing with field selection and optional status
    /// filter.
    fn items_url(
        &self,
        collection: &str,
        fields: &[String],
        filter: StatusFilter,
    ) -> Result<Url, FetchError> {
        let mut url = self.endpoint(&["items", collection])?;
        {
            let mut query = url.query_pairs_mut();
            if !fields.is_empty() {
                query.append_pair("fields", &fields.join(","));
            }
            if filter == StatusFilter::PublishedOnly {
                query.append_pair("filter[status][_eq]", "published");
            }
            query.append_pair("limit", "-1");
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!(url = %url, "CMS request");
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Unwrap the response envelope.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
        let status = response.status();
        let body = response.text().await?;
        Self::decode_body(status, &body)
    }

    fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, FetchError> {
        let envelope = match serde_json::from_str::<Envelope<T>>(body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(FetchError::parse(e.to_string())),
            Err(_) => {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    body: body.to_string(),
                })
            }
        };

        if let Some(first) = envelope.errors.first() {
            return Err(FetchError::api(first.message.clone()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.to_string(),
            });
        }
        envelope
            .data
            .ok_or_else(|| FetchError::parse("response has no data"))
    }

    /// A single-item read of a missing key answers 403 `FORBIDDEN`.
    fn is_hidden_item(status: StatusCode, body: &str) -> bool {
        status == StatusCode::FORBIDDEN
            && serde_json::from_str::<Envelope<Value>>(body)
                .map(|envelope| envelope.errors.iter().any(|e| e.has_code(FORBIDDEN_CODE)))
                .unwrap_or(false)
    }

    fn records_from(values: Vec<Value>) -> Vec<Record> {
        values.into_iter().filter_map(Record::from_value).collect()
    }
}

#[async_trait]
impl ContentSource for DirectusClient {
    async fn server_info(&self) -> Result<(), FetchError> {
        let url = self.endpoint(&["server", "info"])?;
        let _: Value = self.get(url).await?;
        Ok(())
    }

    async fn collections(&self) -> Result<Vec<Collection>, FetchError> {
        let url = self.endpoint(&["collections"])?;
        let raw: Vec<RawCollection> = self.get(url).await?;

        Ok(raw
            .into_iter()
            .filter(|c| c.schema.is_some())
            .map(|c| {
                let meta = c.meta.unwrap_or_default();
                Collection {
                    name: c.collection,
                    note: meta.note.filter(|n| !n.is_empty()),
                    hidden: meta.hidden,
                }
            })
            .collect())
    }

    async fn fields(&self, collection: &str) -> Result<Vec<FieldDescriptor>, FetchError> {
        let url = self.endpoint(&["fields", collection])?;
        let raw: Vec<RawField> = self.get(url).await?;

        Ok(raw
            .into_iter()
            .map(|f| FieldDescriptor {
                name: f.field,
                field_type: f.field_type.unwrap_or_else(|| "alias".to_string()).into(),
                hidden: f.meta.map(|m| m.hidden).unwrap_or(false),
            })
            .collect())
    }

    async fn items(
        &self,
        collection: &str,
        fields: &[String],
        filter: StatusFilter,
    ) -> Result<Vec<Record>, FetchError> {
        let url = self.items_url(collection, fields, filter)?;
        let values: Vec<Value> = self.get(url).await?;
        Ok(Self::records_from(values))
    }

    async fn item(&self, collection: &str, id: &RecordId) -> Result<Option<Record>, FetchError> {
        let key = id.to_string();
        let url = self.endpoint(&["items", collection, &key])?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::NOT_FOUND || Self::is_hidden_item(status, &body) {
            debug!(collection = %collection, id = %id, status = %status, "Item not readable, treating as absent");
            return Ok(None);
        }

        let value: Value = Self::decode_body(status, &body)?;
        Ok(Record::from_value(value))
    }
}
