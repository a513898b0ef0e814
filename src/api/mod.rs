//! Access to the field-sales REST backend
//!
//! `ApiClient` talks HTTP; the export and bulk services only see the
//! [`RecordSource`] and [`RecordSink`] seams, so they can run against
//! in-memory fakes in tests.

pub mod cache;
pub mod client;
pub mod envelope;
pub mod query;

pub use cache::QueryCache;
pub use client::ApiClient;
pub use envelope::{decode_one, decode_page, Page};
pub use query::{ListQuery, QueryKey};

use serde_json::Value;
use std::future::Future;

use crate::error::FieldSalesResult;
use crate::models::DataType;

/// Something records can be read from
pub trait RecordSource {
    /// Every record of a data type matching the query
    fn list_all(
        &self,
        data_type: DataType,
        query: &ListQuery,
    ) -> impl Future<Output = FieldSalesResult<Vec<Value>>> + Send;

    /// A single record by id
    fn fetch_one(
        &self,
        data_type: DataType,
        id: &str,
    ) -> impl Future<Output = FieldSalesResult<Value>> + Send;
}

/// Something records can be created in
pub trait RecordSink {
    fn create(
        &self,
        data_type: DataType,
        payload: &Value,
    ) -> impl Future<Output = FieldSalesResult<Value>> + Send;

    /// Drop cached reads of a data type after a mutation
    fn invalidate(&self, data_type: DataType);
}
