//! HTTP client for the field-sales backend

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use zeroize::Zeroizing;

use super::cache::QueryCache;
use super::envelope::{decode_ack, decode_one, decode_page, error_message, Page};
use super::query::ListQuery;
use super::{RecordSink, RecordSource};
use crate::config::Settings;
use crate::error::{FieldSalesError, FieldSalesResult};
use crate::models::{
    AdminResponse, DataType, Quotation, QuotationId, ReportId, ReviewStatus, WeeklyReport,
};

/// Upper bound on pages walked by `list_all`
const MAX_PAGES: u32 = 1_000;

pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<Zeroizing<String>>,
    page_size: u32,
    cache: Mutex<QueryCache>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> FieldSalesResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(FieldSalesError::Config(format!(
                "API URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let http = Client::builder()
            .user_agent(concat!("fieldsales/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FieldSalesError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            token: token.map(Zeroizing::new),
            page_size: 100,
            cache: Mutex::new(QueryCache::default()),
        })
    }

    /// Build a client from settings and an already resolved token
    pub fn from_settings(settings: &Settings, token: Option<String>) -> FieldSalesResult<Self> {
        Ok(Self::new(&settings.api_base_url, token)?.with_page_size(settings.page_size))
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn record_path(data_type: DataType, id: &str) -> String {
        format!("{}/{}", data_type.endpoint(), id)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    fn cache(&self) -> MutexGuard<'_, QueryCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Send a request and return the status with the parsed JSON body.
    ///
    /// Non-success statuses become errors carrying the backend's message.
    async fn send(&self, builder: RequestBuilder) -> FieldSalesResult<(u16, Value)> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let text = response.text().await?;
        debug!(%status, path = %url, bytes = text.len(), "response received");

        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            return Ok((status.as_u16(), body));
        }

        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FieldSalesError::Auth(message),
            _ => FieldSalesError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    fn not_found_as(err: FieldSalesError, data_type: DataType, id: &str) -> FieldSalesError {
        match err {
            FieldSalesError::Api { status: 404, .. } => {
                FieldSalesError::not_found(data_type.entity_name(), id)
            }
            other => other,
        }
    }

    /// Fetch one page of records, served from the cache when fresh
    pub async fn list(&self, data_type: DataType, query: &ListQuery) -> FieldSalesResult<Page<Value>> {
        let key = query.key(data_type);
        let cached = self.cache().get(&key).cloned();
        if let Some(page) = cached {
            debug!(data_type = %data_type, "list served from cache");
            return Ok(page);
        }

        debug!(data_type = %data_type, params = ?key.params, "listing records");
        let builder = self
            .request(Method::GET, data_type.endpoint())
            .query(&key.params);
        let (status, body) = self.send(builder).await?;
        let page: Page<Value> = decode_page(status, body)?;

        self.cache().insert(key, page.clone());
        Ok(page)
    }

    /// Fetch every record matching the query, walking all pages
    pub async fn list_all(&self, data_type: DataType, query: &ListQuery) -> FieldSalesResult<Vec<Value>> {
        let limit = query.limit.unwrap_or(self.page_size);
        let mut records = Vec::new();
        let mut page_number = query.page.unwrap_or(1);

        loop {
            let page_query = query.clone().page(page_number).limit(limit);
            let page = self.list(data_type, &page_query).await?;
            let received = page.items.len();
            let more = page.has_more();
            let total = page.total;
            records.extend(page.items);

            if !more
                || received == 0
                || records.len() as u64 >= total
                || page_number >= MAX_PAGES
            {
                break;
            }
            page_number += 1;
        }

        debug!(data_type = %data_type, count = records.len(), "fetched all pages");
        Ok(records)
    }

    pub async fn get<T: DeserializeOwned>(&self, data_type: DataType, id: &str) -> FieldSalesResult<T> {
        let builder = self.request(Method::GET, &Self::record_path(data_type, id));
        let (status, body) = self
            .send(builder)
            .await
            .map_err(|e| Self::not_found_as(e, data_type, id))?;
        decode_one(status, body)
    }

    pub async fn create<P: Serialize + ?Sized>(&self, data_type: DataType, payload: &P) -> FieldSalesResult<Value> {
        debug!(data_type = %data_type, "creating record");
        let builder = self.request(Method::POST, data_type.endpoint()).json(payload);
        let (status, body) = self.send(builder).await?;
        self.invalidate(data_type);
        decode_one(status, body)
    }

    pub async fn update<P: Serialize + ?Sized>(
        &self,
        data_type: DataType,
        id: &str,
        payload: &P,
    ) -> FieldSalesResult<Value> {
        debug!(data_type = %data_type, id, "updating record");
        let builder = self
            .request(Method::PUT, &Self::record_path(data_type, id))
            .json(payload);
        let (status, body) = self
            .send(builder)
            .await
            .map_err(|e| Self::not_found_as(e, data_type, id))?;
        self.invalidate(data_type);
        decode_one(status, body)
    }

    /// Delete a record; returns the backend's confirmation message, if any
    pub async fn delete(&self, data_type: DataType, id: &str) -> FieldSalesResult<Option<String>> {
        debug!(data_type = %data_type, id, "deleting record");
        let builder = self.request(Method::DELETE, &Self::record_path(data_type, id));
        let (status, body) = self
            .send(builder)
            .await
            .map_err(|e| Self::not_found_as(e, data_type, id))?;
        self.invalidate(data_type);
        decode_ack(status, body)
    }

    /// Approve or reject a weekly report
    pub async fn review_report(
        &self,
        id: &ReportId,
        status: ReviewStatus,
        notes: Option<&str>,
    ) -> FieldSalesResult<WeeklyReport> {
        if status == ReviewStatus::Pending {
            return Err(FieldSalesError::Validation(
                "A review must approve or reject the report".into(),
            ));
        }
        let mut payload = json!({ "status": status.as_str() });
        if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
            payload["adminNotes"] = Value::String(notes.trim().to_string());
        }

        let path = format!("{}/review", Self::record_path(DataType::Reports, id.as_str()));
        let builder = self.request(Method::PUT, &path).json(&payload);
        let (code, body) = self
            .send(builder)
            .await
            .map_err(|e| Self::not_found_as(e, DataType::Reports, id.as_str()))?;
        self.invalidate(DataType::Reports);
        decode_one(code, body)
    }

    /// Answer a quotation request
    pub async fn respond_quotation(
        &self,
        id: &QuotationId,
        response: &AdminResponse,
    ) -> FieldSalesResult<Quotation> {
        if response.message.trim().is_empty() {
            return Err(FieldSalesError::Validation(
                "Response message cannot be empty".into(),
            ));
        }
        let path = format!(
            "{}/respond",
            Self::record_path(DataType::Quotations, id.as_str())
        );
        let builder = self.request(Method::PUT, &path).json(response);
        let (code, body) = self
            .send(builder)
            .await
            .map_err(|e| Self::not_found_as(e, DataType::Quotations, id.as_str()))?;
        self.invalidate(DataType::Quotations);
        decode_one(code, body)
    }

    /// Mark every cached list of a data type stale
    pub fn invalidate(&self, data_type: DataType) {
        let count = self.cache().invalidate(data_type);
        if count > 0 {
            debug!(data_type = %data_type, entries = count, "cache invalidated");
        }
    }
}

impl RecordSource for ApiClient {
    async fn list_all(&self, data_type: DataType, query: &ListQuery) -> FieldSalesResult<Vec<Value>> {
        ApiClient::list_all(self, data_type, query).await
    }

    async fn fetch_one(&self, data_type: DataType, id: &str) -> FieldSalesResult<Value> {
        self.get(data_type, id).await
    }
}

impl RecordSink for ApiClient {
    async fn create(&self, data_type: DataType, payload: &Value) -> FieldSalesResult<Value> {
        ApiClient::create(self, data_type, payload).await
    }

    fn invalidate(&self, data_type: DataType) {
        ApiClient::invalidate(self, data_type)
    }
}
