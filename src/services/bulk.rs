//! Bulk record creation
//!
//! Items are checked against the typed model first; only well-formed
//! items are sent. The creates run as independent requests awaited
//! together, and each item's outcome is tallied. Nothing is rolled back.

use futures::future::join_all;
use serde_json::Value;
use tracing::{info, warn};

use crate::api::RecordSink;
use crate::error::{FieldSalesError, FieldSalesResult};
use crate::models::validation::kind_of;
use crate::models::{validate_payload, DataType};

/// Why one item was not created
#[derive(Debug, Clone, PartialEq)]
pub struct BulkFailure {
    /// Position in the input, 0-based
    pub index: usize,
    pub reason: String,
}

/// Tally of a bulk run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkResult {
    pub successful: usize,
    pub failed: usize,
    pub failures: Vec<BulkFailure>,
    /// Records as returned by the backend
    pub created: Vec<Value>,
}

impl BulkResult {
    pub fn total(&self) -> usize {
        self.successful + self.failed
    }

    fn fail(&mut self, index: usize, reason: String) {
        self.failed += 1;
        self.failures.push(BulkFailure { index, reason });
    }
}

/// Service for bulk creation
pub struct BulkService<'a, K: RecordSink> {
    sink: &'a K,
}

impl<'a, K: RecordSink> BulkService<'a, K> {
    pub fn new(sink: &'a K) -> Self {
        Self { sink }
    }

    /// Create every well-formed item; malformed items are counted failed
    /// without a request
    pub async fn bulk_add(&self, data_type: DataType, items: &[Value]) -> BulkResult {
        let mut result = BulkResult::default();
        let mut valid = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            match validate_payload(data_type, item) {
                Ok(payload) => valid.push((index, payload)),
                Err(reason) => {
                    warn!(data_type = %data_type, index, %reason, "bulk item rejected");
                    result.fail(index, reason);
                }
            }
        }

        let requests = valid.iter().map(|(index, payload)| async move {
            (*index, self.sink.create(data_type, payload).await)
        });

        for (index, outcome) in join_all(requests).await {
            match outcome {
                Ok(created) => {
                    result.successful += 1;
                    result.created.push(created);
                }
                Err(e) => {
                    warn!(data_type = %data_type, index, error = %e, "bulk item failed");
                    result.fail(index, e.to_string());
                }
            }
        }

        result.failures.sort_by_key(|f| f.index);
        self.sink.invalidate(data_type);
        info!(
            data_type = %data_type,
            successful = result.successful,
            failed = result.failed,
            "bulk add finished"
        );
        result
    }
}

/// Parse bulk input: a JSON array (or `{ "items": [...] }`), or CSV with a
/// header row whose dotted column names become nested objects
pub fn parse_bulk_input(contents: &str, csv_input: bool) -> FieldSalesResult<Vec<Value>> {
    if csv_input {
        return parse_csv(contents);
    }
    let value: Value = serde_json::from_str(contents)?;
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Ok(vec![Value::Object(map)]),
        },
        other => Err(FieldSalesError::Validation(format!(
            "Expected a JSON array of records, found {}",
            kind_of(&other)
        ))),
    }
}

fn parse_csv(contents: &str) -> FieldSalesResult<Vec<Value>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());
    let headers = reader.headers()?.clone();

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut item = Value::Object(Default::default());
        for (header, field) in headers.iter().zip(record.iter()) {
            if field.is_empty() || header.is_empty() {
                continue;
            }
            insert_path(&mut item, header, csv_value(field));
        }
        items.push(item);
    }
    Ok(items)
}

/// Cells stay text and the typed models read numbers and flags from it;
/// `a|b|c` becomes a list
fn csv_value(field: &str) -> Value {
    if field.contains('|') {
        return Value::Array(
            field
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        );
    }
    Value::String(field.to_string())
}

/// Set a dotted path such as `client.name` or `contacts.0.phone`, creating
/// objects, and lists for numeric segments, along the way
fn insert_path(target: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    insert_segments(target, &segments, value);
}

fn insert_segments(target: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let child = match target {
        Value::Object(map) => map.entry(first.to_string()).or_insert(Value::Null),
        Value::Array(items) => {
            let Ok(index) = first.parse::<usize>() else {
                return;
            };
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        _ => return,
    };
    let Some(next) = rest.first() else {
        *child = value;
        return;
    };
    if child.is_null() {
        *child = if next.parse::<usize>().is_ok() {
            Value::Array(Vec::new())
        } else {
            Value::Object(Default::default())
        };
    }
    insert_segments(child, rest, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSink {
        created: Mutex<Vec<Value>>,
        invalidations: AtomicUsize,
        reject_name: Option<String>,
    }

    impl RecordSink for FakeSink {
        async fn create(&self, _data_type: DataType, payload: &Value) -> FieldSalesResult<Value> {
            let name = payload["client"]["name"].as_str().unwrap_or_default();
            if self.reject_name.as_deref() == Some(name) {
                return Err(FieldSalesError::Api {
                    status: 409,
                    message: "Duplicate visit".into(),
                });
            }
            let mut created = payload.clone();
            created["_id"] = json!(format!("id-{}", name));
            self.created.lock().unwrap().push(created.clone());
            Ok(created)
        }

        fn invalidate(&self, _data_type: DataType) {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn good(i: usize) -> Value {
        json!({"client": {"name": format!("Clinic {}", i)}, "visitDate": "2025-10-01"})
    }

    fn items() -> Vec<Value> {
        let mut items: Vec<Value> = (0..5).map(good).collect();
        // no client name
        items.insert(2, json!({"client": {"name": ""}, "visitDate": "2025-10-01"}));
        // not an object
        items.push(json!("visit"));
        items
    }

    #[tokio::test]
    async fn test_bulk_add_counts() {
        let sink = FakeSink::default();
        let result = BulkService::new(&sink).bulk_add(DataType::Visits, &items()).await;

        assert_eq!(result.successful, 5);
        assert_eq!(result.failed, 2);
        assert_eq!(result.total(), 7);
        assert_eq!(sink.created.lock().unwrap().len(), 5);
        let indexes: Vec<usize> = result.failures.iter().map(|f| f.index).collect();
        assert_eq!(indexes, vec![2, 6]);
        assert_eq!(sink.invalidations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backend_rejection_is_tallied() {
        let sink = FakeSink {
            reject_name: Some("Clinic 1".into()),
            ..FakeSink::default()
        };
        let result = BulkService::new(&sink)
            .bulk_add(DataType::Visits, &[good(0), good(1)])
            .await;
        assert_eq!(result.successful, 1);
        assert_eq!(result.failed, 1);
        assert!(result.failures[0].reason.contains("Duplicate visit"));
    }

    #[test]
    fn test_parse_json_shapes() {
        assert_eq!(parse_bulk_input("[{\"a\":1},{\"a\":2}]", false).unwrap().len(), 2);
        assert_eq!(parse_bulk_input("{\"items\":[{\"a\":1}]}", false).unwrap().len(), 1);
        assert_eq!(parse_bulk_input("{\"a\":1}", false).unwrap().len(), 1);
        assert!(parse_bulk_input("42", false).is_err());
        assert!(parse_bulk_input("not json", false).is_err());
    }

    #[test]
    fn test_parse_csv_nested_columns() {
        let csv = "client.name,visitDate,potentialValue,followUpRequired,equipmentDiscussed\n\
                   City Hospital,2025-10-01,1500,yes,Ultrasound|ECG\n\
                   Mercy Clinic,2025-10-02,,no,\n";
        let items = parse_bulk_input(csv, true).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["client"]["name"], "City Hospital");
        assert_eq!(items[0]["potentialValue"], "1500");
        assert_eq!(items[0]["equipmentDiscussed"], json!(["Ultrasound", "ECG"]));
        assert!(items[1].get("potentialValue").is_none());

        let first = validate_payload(DataType::Visits, &items[0]).unwrap();
        assert_eq!(first["potentialValue"], 1500.0);
        assert_eq!(first["followUpRequired"], true);
        let second = validate_payload(DataType::Visits, &items[1]).unwrap();
        assert_eq!(second["followUpRequired"], false);
    }

    #[test]
    fn test_parse_csv_keeps_leading_zeros() {
        let csv = "clientName,phone,callDate\nCity Clinic,0712345678,2025-10-01\n";
        let items = parse_bulk_input(csv, true).unwrap();
        assert_eq!(items[0]["phone"], "0712345678");

        let log = validate_payload(DataType::CallLogs, &items[0]).unwrap();
        assert_eq!(log["phone"], "0712345678");
        assert_eq!(log["year"], 2025);
    }

    #[test]
    fn test_parse_csv_digit_only_names() {
        let csv = "client.name,visitDate,contacts.0.name,contacts.0.phone,contacts.1.name\n\
                   12345,2025-10-01,4567,0700111222,Dr. Otieno\n";
        let items = parse_bulk_input(csv, true).unwrap();
        assert_eq!(items[0]["contacts"][0]["phone"], "0700111222");

        let visit = validate_payload(DataType::Visits, &items[0]).unwrap();
        assert_eq!(visit["client"]["name"], "12345");
        assert_eq!(visit["contacts"][0]["name"], "4567");
        assert_eq!(visit["contacts"][0]["phone"], "0700111222");
        assert_eq!(visit["contacts"][1]["name"], "Dr. Otieno");
    }

    #[tokio::test]
    async fn test_bulk_add_csv_call_logs_with_phone() {
        let sink = FakeSink::default();
        let items = parse_bulk_input(
            "clientName,phone,callDate\nCity Clinic,0712345678,2025-10-01\n",
            true,
        )
        .unwrap();
        let result = BulkService::new(&sink).bulk_add(DataType::CallLogs, &items).await;
        assert_eq!(result.successful, 1);
        assert_eq!(result.failed, 0);
        let created = sink.created.lock().unwrap();
        assert_eq!(created[0]["phone"], "0712345678");
    }
}
