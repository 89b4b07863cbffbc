//! reqwest-backed [`SearchService`].

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use corpora_core::service::endpoint;
use corpora_core::types::DocumentKey;
use corpora_core::{
    Boost, CombinedFilter, Error, FieldCategory, FilterProxy, RangeFilter, Result, SearchQuery,
    SearchResult, SearchService, SearchableField, SystemStatus, ValueFilter,
};

use crate::config::{ClientConfig, Credentials};

/// HTTP client for one remote search service.
///
/// Holds a bearer token for the lifetime of the run; tokens are never
/// refreshed.
pub struct HttpSearchService {
    http: reqwest::Client,
    config: ClientConfig,
    token: String,
}

impl fmt::Debug for HttpSearchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSearchService")
            .field("base_url", &self.config.base_url().as_str())
            .field("token", &"***")
            .finish()
    }
}

impl HttpSearchService {
    /// Builds the HTTP client and, for email + password credentials, logs in.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs())
            .user_agent(concat!("corpora/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        if config.accept_invalid_certs() {
            tracing::warn!(base_url = %config.base_url(), "TLS certificate validation is disabled");
        }

        let token = match config.credentials() {
            Credentials::Token(token) => token.clone(),
            Credentials::Login { email, password } => {
                login(&http, &config, email, password).await?
            }
        };

        Ok(Self {
            http,
            config,
            token,
        })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, name: &str, dataset: &str) -> Result<RequestBuilder> {
        let url = self.config.api_url(name, Some(dataset))?;
        Ok(self.http.request(method, url).bearer_auth(&self.token))
    }

    /// Sends a request with the configured timeout applied.
    async fn send(&self, label: &str, req: RequestBuilder) -> Result<Response> {
        let req = match self.config.request_timeout() {
            Some(timeout) => req.timeout(timeout),
            None => req,
        };
        send_unbounded(label, req).await
    }

    async fn send_json<T: DeserializeOwned>(&self, label: &str, req: RequestBuilder) -> Result<T> {
        let resp = self.send(label, req).await?;
        decode_json(label, resp).await
    }
}

fn label(name: &str, dataset: &str) -> String {
    format!("{name}/{dataset}")
}

async fn send_unbounded(label: &str, req: RequestBuilder) -> Result<Response> {
    let started = Instant::now();
    let resp = req.send().await.map_err(|e| {
        let message = if e.is_timeout() {
            "request timed out".to_string()
        } else if e.is_connect() {
            "could not connect".to_string()
        } else {
            e.to_string()
        };
        Error::request_with_source(label, message, e)
    })?;

    let status = resp.status();
    tracing::debug!(
        endpoint = label,
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );

    if status.is_success() {
        Ok(resp)
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Status {
            endpoint: label.to_string(),
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

async fn read_text(label: &str, resp: Response) -> Result<String> {
    resp.text()
        .await
        .map_err(|e| Error::request_with_source(label, "failed to read response body", e))
}

async fn decode_json<T: DeserializeOwned>(label: &str, resp: Response) -> Result<T> {
    let text = read_text(label, resp).await?;
    serde_json::from_str(&text).map_err(|e| Error::invalid_response(label, e.to_string()))
}

/// Renders a JSON value the way a raw document string reads.
fn raw_document(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Exchanges email + password for a bearer token.
///
/// The token may come back as a JSON string, as `{"token": ...}`, or as
/// plain text.
async fn login(
    http: &reqwest::Client,
    config: &ClientConfig,
    email: &str,
    password: &str,
) -> Result<String> {
    let url = config.api_url(endpoint::LOGIN, None)?;
    let mut req = http
        .post(url)
        .json(&serde_json::json!({ "email": email, "password": password }));
    if let Some(timeout) = config.request_timeout() {
        req = req.timeout(timeout);
    }

    let resp = send_unbounded(endpoint::LOGIN, req).await?;
    let text = read_text(endpoint::LOGIN, resp).await?;
    let token = match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(serde_json::Value::String(token)) => token,
        Ok(serde_json::Value::Object(map)) => map
            .get("token")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_default(),
        _ => text.trim().to_string(),
    };

    if token.is_empty() {
        return Err(Error::invalid_response(
            endpoint::LOGIN,
            "no token in login response",
        ));
    }
    tracing::debug!(email, "Login accepted");
    tracing::info!("Logged in");
    Ok(token)
}

#[async_trait]
impl SearchService for HttpSearchService {
    async fn create_or_open(&self, dataset: &str) -> Result<()> {
        let label = label(endpoint::CREATE_OR_OPEN, dataset);
        let req = self.request(Method::PUT, endpoint::CREATE_OR_OPEN, dataset)?;
        self.send(&label, req).await?;
        Ok(())
    }

    async fn analyze(&self, dataset: &str, content: String) -> Result<serde_json::Value> {
        let label = label(endpoint::ANALYZE_STRING, dataset);
        let req = self
            .request(Method::POST, endpoint::ANALYZE_STRING, dataset)?
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(content);
        let text = read_text(&label, self.send(&label, req).await?).await?;

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }

    async fn all_fields(&self, dataset: &str) -> Result<Vec<String>> {
        let label = label(endpoint::GET_ALL_FIELDS, dataset);
        let req = self.request(Method::GET, endpoint::GET_ALL_FIELDS, dataset)?;
        self.send_json(&label, req).await
    }

    async fn set_searchable_fields(
        &self,
        dataset: &str,
        fields: &[SearchableField],
    ) -> Result<()> {
        let name = FieldCategory::Searchable.set_endpoint();
        let label = label(name, dataset);
        let req = self.request(Method::PUT, name, dataset)?.json(fields);
        self.send(&label, req).await?;
        Ok(())
    }

    async fn set_fields(
        &self,
        dataset: &str,
        category: FieldCategory,
        fields: &[String],
    ) -> Result<()> {
        let name = category.set_endpoint();
        let label = label(name, dataset);
        let req = self.request(Method::PUT, name, dataset)?.json(fields);
        self.send(&label, req).await?;
        Ok(())
    }

    async fn fields(&self, dataset: &str, category: FieldCategory) -> Result<Vec<String>> {
        let name = category.get_endpoint();
        let label = label(name, dataset);
        let req = self.request(Method::GET, name, dataset)?;

        if category == FieldCategory::Searchable {
            let fields: Vec<SearchableField> = self.send_json(&label, req).await?;
            Ok(fields.iter().map(ToString::to_string).collect())
        } else {
            self.send_json(&label, req).await
        }
    }

    async fn create_range_filter(
        &self,
        dataset: &str,
        filter: &RangeFilter,
    ) -> Result<FilterProxy> {
        let label = label(endpoint::CREATE_RANGE_FILTER, dataset);
        let req = self
            .request(Method::PUT, endpoint::CREATE_RANGE_FILTER, dataset)?
            .json(filter);
        let proxy: FilterProxy = self.send_json(&label, req).await?;
        Ok(proxy.or_field(&filter.field_name))
    }

    async fn create_value_filter(
        &self,
        dataset: &str,
        filter: &ValueFilter,
    ) -> Result<FilterProxy> {
        let label = label(endpoint::CREATE_VALUE_FILTER, dataset);
        let req = self
            .request(Method::PUT, endpoint::CREATE_VALUE_FILTER, dataset)?
            .json(filter);
        let proxy: FilterProxy = self.send_json(&label, req).await?;
        Ok(proxy.or_field(&filter.field_name))
    }

    async fn combine_filters(&self, dataset: &str, filter: &CombinedFilter) -> Result<FilterProxy> {
        let label = label(endpoint::COMBINE_FILTERS, dataset);
        let req = self
            .request(Method::PUT, endpoint::COMBINE_FILTERS, dataset)?
            .json(filter);
        self.send_json(&label, req).await
    }

    async fn create_boost(&self, dataset: &str, boost: &Boost) -> Result<Boost> {
        let label = label(endpoint::CREATE_BOOST, dataset);
        let req = self
            .request(Method::PUT, endpoint::CREATE_BOOST, dataset)?
            .json(boost);
        self.send_json(&label, req).await
    }

    async fn load_file(&self, dataset: &str, path: &Path) -> Result<()> {
        let label = label(endpoint::LOAD_STREAM, dataset);
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::data_file(path, e.to_string()))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| Error::data_file(path, e.to_string()))?
            .len();

        tracing::debug!(dataset, bytes = length, "Streaming data file");
        let req = self
            .request(Method::PUT, endpoint::LOAD_STREAM, dataset)?
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, length)
            .body(reqwest::Body::from(file));

        // No per-request timeout: large files may take arbitrarily long.
        send_unbounded(&label, req).await?;
        Ok(())
    }

    async fn index(&self, dataset: &str) -> Result<()> {
        let label = label(endpoint::INDEX_DATA_SET, dataset);
        let req = self.request(Method::GET, endpoint::INDEX_DATA_SET, dataset)?;
        self.send(&label, req).await?;
        Ok(())
    }

    async fn status(&self, dataset: &str) -> Result<SystemStatus> {
        let label = label(endpoint::GET_STATUS, dataset);
        let req = self.request(Method::GET, endpoint::GET_STATUS, dataset)?;
        self.send_json(&label, req).await
    }

    async fn record_count(&self, dataset: &str) -> Result<u64> {
        let label = label(endpoint::GET_RECORD_COUNT, dataset);
        let req = self.request(Method::GET, endpoint::GET_RECORD_COUNT, dataset)?;
        self.send_json(&label, req).await
    }

    async fn search(&self, dataset: &str, query: &SearchQuery) -> Result<SearchResult> {
        let label = label(endpoint::SEARCH, dataset);
        let req = self
            .request(Method::POST, endpoint::SEARCH, dataset)?
            .json(query);
        self.send_json(&label, req).await
    }

    async fn documents(&self, dataset: &str, keys: &[DocumentKey]) -> Result<Vec<String>> {
        let label = label(endpoint::GET_JSON, dataset);
        let req = self
            .request(Method::POST, endpoint::GET_JSON, dataset)?
            .json(keys);
        let values: Vec<serde_json::Value> = self.send_json(&label, req).await?;
        Ok(values.into_iter().map(raw_document).collect())
    }
}
