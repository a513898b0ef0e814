//! Field resolution against raw backend records
//!
//! A column key is looked up in three steps: computed fields by exact name,
//! indexed contact fields (`contact2Phone`), then a dotted path into the
//! record where numeric segments index arrays. Anything missing resolves to
//! the empty string.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Fields that may hold the owning user, in lookup order
const PERSON_FIELDS: [&str; 4] = ["user", "requestedBy", "assignedTo", "createdBy"];

fn contact_field_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^contact(\d+)(Name|Role|Phone)$").ok())
        .as_ref()
}

fn empty() -> Value {
    Value::String(String::new())
}

/// Resolve a column key against a record
pub fn resolve_field(record: &Value, key: &str) -> Value {
    if let Some(value) = computed_field(record, key) {
        return value;
    }
    if let Some(value) = indexed_contact_field(record, key) {
        return value;
    }
    resolve_path(record, key).cloned().unwrap_or_else(empty)
}

/// Walk a dotted path; `None` when any segment is missing
pub fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(record, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn contacts(record: &Value) -> &[Value] {
    record
        .get("contacts")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn join_contact_attr(record: &Value, attr: &str) -> Value {
    let parts: Vec<String> = contacts(record)
        .iter()
        .map(|c| text_of(c.get(attr)))
        .filter(|s| !s.trim().is_empty())
        .collect();
    Value::String(parts.join(", "))
}

fn computed_field(record: &Value, key: &str) -> Option<Value> {
    let value = match key {
        "contactNames" => join_contact_attr(record, "name"),
        "contactRoles" => join_contact_attr(record, "role"),
        "contactPhones" => join_contact_attr(record, "phone"),
        "contactCount" => Value::from(contacts(record).len()),
        "userFullName" => Value::String(user_full_name(record)),
        _ => return None,
    };
    Some(value)
}

fn indexed_contact_field(record: &Value, key: &str) -> Option<Value> {
    let captures = contact_field_pattern()?.captures(key)?;
    let index: usize = captures.get(1)?.as_str().parse().ok()?;
    let attr = match captures.get(2)?.as_str() {
        "Name" => "name",
        "Role" => "role",
        _ => "phone",
    };

    // 1-based; contact0 and out-of-range contacts are simply empty
    let contact = index.checked_sub(1).and_then(|i| contacts(record).get(i));
    Some(Value::String(text_of(contact.and_then(|c| c.get(attr)))))
}

/// Display name of the record's owner: "First Last", a plain `name`, or the
/// bare id when the reference is not populated
pub fn user_full_name(record: &Value) -> String {
    PERSON_FIELDS
        .iter()
        .filter_map(|field| record.get(*field))
        .find_map(person_name)
        .unwrap_or_default()
}

fn person_name(person: &Value) -> Option<String> {
    match person {
        Value::Object(map) => {
            let first = text_of(map.get("firstName"));
            let last = text_of(map.get("lastName"));
            let full = format!("{} {}", first.trim(), last.trim()).trim().to_string();
            if !full.is_empty() {
                return Some(full);
            }
            let name = text_of(map.get("name"));
            if !name.trim().is_empty() {
                return Some(name);
            }
            map.get("_id").map(|id| text_of(Some(id))).filter(|s| !s.is_empty())
        }
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        _ => None,
    }
}

/// Id of the user in the given person field, populated or not
pub fn person_id(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::Object(map) => map.get("_id").and_then(Value::as_str).map(str::to_string),
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        _ => None,
    }
}

/// Display name of the user in the given person field
pub fn person_display_name(record: &Value, field: &str) -> Option<String> {
    record.get(field).and_then(person_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn visit() -> Value {
        json!({
            "_id": "v1",
            "user": {"_id": "u1", "firstName": "Jane", "lastName": "Doe"},
            "client": {"name": "City Hospital", "location": "Nairobi"},
            "contacts": [
                {"name": "A", "role": "Matron", "phone": "0700"},
                {"name": "B", "role": "Biomed"}
            ],
            "equipmentDiscussed": ["Ultrasound", "ECG"]
        })
    }

    #[test]
    fn test_dotted_path() {
        assert_eq!(resolve_field(&visit(), "user.firstName"), json!("Jane"));
        assert_eq!(resolve_field(&visit(), "client.location"), json!("Nairobi"));
        assert_eq!(resolve_field(&visit(), "equipmentDiscussed.1"), json!("ECG"));
    }

    #[test]
    fn test_missing_path_is_empty() {
        assert_eq!(resolve_field(&visit(), "user.missing"), json!(""));
        assert_eq!(resolve_field(&visit(), "client.name.deeper"), json!(""));
        assert_eq!(resolve_field(&visit(), "equipmentDiscussed.9"), json!(""));
        assert_eq!(resolve_field(&visit(), ""), json!(""));
        assert_eq!(resolve_field(&json!(null), "a.b"), json!(""));
    }

    #[test]
    fn test_indexed_contacts() {
        let record = json!({"contacts": [{"name": "A"}]});
        assert_eq!(resolve_field(&record, "contact1Name"), json!("A"));
        assert_eq!(resolve_field(&record, "contact2Name"), json!(""));
        assert_eq!(resolve_field(&record, "contact0Name"), json!(""));
        assert_eq!(resolve_field(&visit(), "contact2Role"), json!("Biomed"));
        assert_eq!(resolve_field(&visit(), "contact2Phone"), json!(""));
    }

    #[test]
    fn test_indexed_contacts_without_contacts() {
        assert_eq!(resolve_field(&json!({"_id": "x"}), "contact1Phone"), json!(""));
    }

    #[test]
    fn test_computed_fields() {
        let record = visit();
        assert_eq!(resolve_field(&record, "contactNames"), json!("A, B"));
        assert_eq!(resolve_field(&record, "contactPhones"), json!("0700"));
        assert_eq!(resolve_field(&record, "contactCount"), json!(2));
        assert_eq!(resolve_field(&record, "userFullName"), json!("Jane Doe"));
    }

    #[test]
    fn test_user_full_name_fallbacks() {
        assert_eq!(user_full_name(&json!({"requestedBy": {"name": "Ops Desk"}})), "Ops Desk");
        assert_eq!(user_full_name(&json!({"assignedTo": "u7"})), "u7");
        assert_eq!(user_full_name(&json!({"notes": "x"})), "");
    }

    #[test]
    fn test_person_id() {
        assert_eq!(person_id(&visit(), "user"), Some("u1".to_string()));
        assert_eq!(person_id(&json!({"user": "u2"}), "user"), Some("u2".to_string()));
        assert_eq!(person_id(&json!({"user": null}), "user"), None);
    }
}
