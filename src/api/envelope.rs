//! Response envelope decoding
//!
//! The backend wraps most responses as `{success, data, message}`, where
//! `data` may be a paginated object (`{docs, total, page, pages}`), a plain
//! array or a single object. A few endpoints answer with a bare array.
//! Everything is normalized here into a [`Page`], so callers never look at
//! the wire shape.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{FieldSalesError, FieldSalesResult};

/// One page of records
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of records across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    pub pages: u32,
}

impl<T> Page<T> {
    /// A page holding every record there is
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            total: items.len() as u64,
            items,
            page: 1,
            pages: 1,
        }
    }

    pub fn empty() -> Self {
        Self::complete(Vec::new())
    }

    /// Whether the backend has pages after this one
    pub fn has_more(&self) -> bool {
        self.page < self.pages
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    // Some list endpoints put pagination beside `data`
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    pages: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Paginated {
    docs: Vec<Value>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    pages: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
}

/// The wire shapes the backend uses, decoded once
enum Payload {
    Paginated(Paginated),
    List(Vec<Value>),
    Single(Value),
    Nothing,
}

fn unwrap_envelope(status: u16, body: Value) -> FieldSalesResult<(Payload, Envelope)> {
    if let Value::Array(items) = body {
        let envelope = Envelope {
            success: Some(true),
            data: None,
            message: None,
            total: None,
            page: None,
            pages: None,
            limit: None,
        };
        return Ok((Payload::List(items), envelope));
    }

    let mut envelope: Envelope = serde_json::from_value(body)
        .map_err(|e| FieldSalesError::Json(format!("Unexpected response body: {}", e)))?;

    if envelope.success == Some(false) {
        return Err(FieldSalesError::Api {
            status,
            message: envelope
                .message
                .take()
                .unwrap_or_else(|| "Request failed".to_string()),
        });
    }

    let payload = match envelope.data.take() {
        None | Some(Value::Null) => Payload::Nothing,
        Some(Value::Array(items)) => Payload::List(items),
        Some(Value::Object(map)) if map.get("docs").is_some_and(Value::is_array) => {
            Payload::Paginated(serde_json::from_value(Value::Object(map))?)
        }
        Some(other) => Payload::Single(other),
    };

    Ok((payload, envelope))
}

/// Page count for responses that give a total but no `pages`. Without a
/// `limit` the page is taken as full unless it reaches the total.
fn page_count(total: u64, page: u32, received: usize, limit: Option<u32>) -> u32 {
    let received = received as u64;
    let per_page = limit.filter(|l| *l > 0).map_or(received, u64::from);
    if per_page == 0 || u64::from(page - 1) * per_page + received >= total {
        return page;
    }
    let pages = total.div_ceil(per_page);
    u32::try_from(pages).unwrap_or(u32::MAX).max(page)
}

fn convert<T: DeserializeOwned>(items: Vec<Value>) -> FieldSalesResult<Vec<T>> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(FieldSalesError::from))
        .collect()
}

/// Decode a list response into a page
pub fn decode_page<T: DeserializeOwned>(status: u16, body: Value) -> FieldSalesResult<Page<T>> {
    let (payload, envelope) = unwrap_envelope(status, body)?;
    let page = match payload {
        Payload::Paginated(p) => {
            let received = p.docs.len();
            let total = p.total.unwrap_or(received as u64);
            let page = p.page.unwrap_or(1).max(1);
            let pages = p
                .pages
                .unwrap_or_else(|| page_count(total, page, received, p.limit))
                .max(1);
            Page {
                items: convert(p.docs)?,
                total,
                page,
                pages,
            }
        }
        Payload::List(items) => {
            let mut page = Page::complete(convert(items)?);
            page.total = envelope.total.unwrap_or(page.total);
            page.page = envelope.page.unwrap_or(1).max(1);
            page.pages = envelope
                .pages
                .unwrap_or_else(|| page_count(page.total, page.page, page.items.len(), envelope.limit))
                .max(1);
            page
        }
        Payload::Single(item) => Page::complete(vec![serde_json::from_value(item)?]),
        Payload::Nothing => Page::empty(),
    };
    Ok(page)
}

/// Decode a response that carries exactly one record
pub fn decode_one<T: DeserializeOwned>(status: u16, body: Value) -> FieldSalesResult<T> {
    let (payload, _) = unwrap_envelope(status, body)?;
    let item = match payload {
        Payload::Single(item) => item,
        Payload::List(mut items) | Payload::Paginated(Paginated { docs: mut items, .. })
            if items.len() == 1 =>
        {
            items.remove(0)
        }
        Payload::List(items) | Payload::Paginated(Paginated { docs: items, .. }) => {
            return Err(FieldSalesError::Json(format!(
                "Expected a single record, received {}",
                items.len()
            )))
        }
        Payload::Nothing => {
            return Err(FieldSalesError::Json(
                "Expected a single record, received none".into(),
            ))
        }
    };
    Ok(serde_json::from_value(item)?)
}

/// Check a response that carries no record (deletes)
pub fn decode_ack(status: u16, body: Value) -> FieldSalesResult<Option<String>> {
    if body.is_null() {
        return Ok(None);
    }
    let (_, envelope) = unwrap_envelope(status, body)?;
    Ok(envelope.message)
}

/// Best-effort message from an error response body
pub fn error_message(body: &Value) -> Option<String> {
    ["message", "error", "msg"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paginated_data() {
        let body = json!({
            "success": true,
            "data": {"docs": [{"_id": "a"}, {"_id": "b"}], "total": 12, "page": 2, "pages": 6}
        });
        let page: Page<Value> = decode_page(200, body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 12);
        assert_eq!(page.page, 2);
        assert!(page.has_more());
    }

    #[test]
    fn test_array_data_with_side_pagination() {
        let body = json!({"success": true, "data": [{"_id": "a"}], "total": 30, "page": 3, "pages": 3});
        let page: Page<Value> = decode_page(200, body).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 30);
        assert!(!page.has_more());
    }

    #[test]
    fn test_pages_derived_from_total() {
        let body = json!({
            "success": true,
            "data": {"docs": [{"_id": "a"}, {"_id": "b"}], "total": 5}
        });
        let page: Page<Value> = decode_page(200, body).unwrap();
        assert_eq!(page.pages, 3);
        assert!(page.has_more());

        // last, partial page
        let body = json!({
            "success": true,
            "data": {"docs": [{"_id": "e"}], "total": 5, "page": 3, "limit": 2}
        });
        let page: Page<Value> = decode_page(200, body).unwrap();
        assert_eq!(page.pages, 3);
        assert!(!page.has_more());

        let body = json!({"success": true, "data": [{"_id": "a"}, {"_id": "b"}], "total": 7, "limit": 2});
        let page: Page<Value> = decode_page(200, body).unwrap();
        assert_eq!(page.pages, 4);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(5, 1, 5, None), 1);
        assert_eq!(page_count(0, 1, 0, None), 1);
        assert_eq!(page_count(10, 2, 3, Some(3)), 4);
        assert_eq!(page_count(10, 4, 1, Some(3)), 4);
    }

    #[test]
    fn test_single_object_data() {
        let body = json!({"success": true, "data": {"_id": "only"}});
        let page: Page<Value> = decode_page(200, body.clone()).unwrap();
        assert_eq!(page.items, vec![json!({"_id": "only"})]);

        let one: Value = decode_one(200, body).unwrap();
        assert_eq!(one["_id"], "only");
    }

    #[test]
    fn test_bare_array() {
        let page: Page<Value> = decode_page(200, json!([{"_id": "a"}, {"_id": "b"}])).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.pages, 1);
    }

    #[test]
    fn test_missing_data_is_empty() {
        let page: Page<Value> = decode_page(200, json!({"success": true})).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_failure_carries_backend_message() {
        let err = decode_page::<Value>(200, json!({"success": false, "message": "Week already reported"}))
            .unwrap_err();
        match err {
            FieldSalesError::Api { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "Week already reported");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_one_rejects_many() {
        let body = json!({"success": true, "data": [{"_id": "a"}, {"_id": "b"}]});
        assert!(decode_one::<Value>(200, body).is_err());
    }

    #[test]
    fn test_typed_decode() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(rename = "_id")]
            id: String,
        }
        let page: Page<Row> =
            decode_page(200, json!({"success": true, "data": {"docs": [{"_id": "x"}]}})).unwrap();
        assert_eq!(page.items[0].id, "x");
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(&json!({"success": false, "message": "Not authorized"})),
            Some("Not authorized".to_string())
        );
        assert_eq!(error_message(&json!({"error": "boom"})), Some("boom".to_string()));
        assert_eq!(error_message(&json!("text")), None);
    }
}
