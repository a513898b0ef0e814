//! Grouping of records by ISO week and by person

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

use super::fields::{person_display_name, person_id};
use crate::models::dates::parse_date;
use crate::models::{DataType, IsoWeek};

/// Date fields tried for every data type, in order
const COMMON_DATE_FIELDS: [&str; 3] = ["visitDate", "createdAt", "date"];

/// Label of the bucket holding undated records
pub const NO_DATE_LABEL: &str = "No Date";

pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// The date a record is filed under
pub fn record_date(record: &Value, data_type: DataType) -> Option<NaiveDate> {
    COMMON_DATE_FIELDS
        .iter()
        .chain(data_type.fallback_date_fields())
        .filter_map(|field| record.get(*field))
        .find_map(|value| value.as_str().and_then(parse_date))
}

/// Records of one ISO week, or the undated remainder
#[derive(Debug, Clone, PartialEq)]
pub struct WeekBucket<'a> {
    /// `None` for the "No Date" bucket
    pub week: Option<IsoWeek>,
    pub records: Vec<&'a Value>,
}

impl WeekBucket<'_> {
    pub fn label(&self) -> String {
        match self.week {
            Some(week) => week.label(),
            None => NO_DATE_LABEL.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Group records by ISO week: ascending (year, week), undated records last.
///
/// Records keep their input order within a bucket.
pub fn group_by_week(records: &[Value], data_type: DataType) -> Vec<WeekBucket<'_>> {
    let mut weeks: BTreeMap<IsoWeek, Vec<&Value>> = BTreeMap::new();
    let mut undated = Vec::new();

    for record in records {
        match record_date(record, data_type) {
            Some(date) => weeks.entry(IsoWeek::from_date(date)).or_default().push(record),
            None => undated.push(record),
        }
    }

    let mut buckets: Vec<WeekBucket<'_>> = weeks
        .into_iter()
        .map(|(week, records)| WeekBucket {
            week: Some(week),
            records,
        })
        .collect();

    if !undated.is_empty() {
        buckets.push(WeekBucket {
            week: None,
            records: undated,
        });
    }

    buckets
}

/// Records owned by one person
#[derive(Debug, Clone, PartialEq)]
pub struct PersonGroup<'a> {
    /// `None` for records without an owner
    pub user_id: Option<String>,
    pub name: String,
    pub records: Vec<&'a Value>,
}

/// Group records by their owner, sorted by display name; unowned records last
pub fn group_by_person(records: &[Value], data_type: DataType) -> Vec<PersonGroup<'_>> {
    let field = data_type.person_field();
    let mut groups: BTreeMap<String, PersonGroup<'_>> = BTreeMap::new();
    let mut unassigned = Vec::new();

    for record in records {
        let Some(id) = person_id(record, field) else {
            unassigned.push(record);
            continue;
        };
        groups
            .entry(id.clone())
            .or_insert_with(|| PersonGroup {
                name: person_display_name(record, field).unwrap_or_else(|| id.clone()),
                user_id: Some(id),
                records: Vec::new(),
            })
            .records
            .push(record);
    }

    let mut result: Vec<PersonGroup<'_>> = groups.into_values().collect();
    result.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    if !unassigned.is_empty() {
        result.push(PersonGroup {
            user_id: None,
            name: UNASSIGNED_LABEL.to_string(),
            records: unassigned,
        });
    }

    result
}

/// Whether a record falls inside an inclusive date range.
///
/// With no bounds every record matches; with bounds, undated records do not.
pub fn within_range(
    record: &Value,
    data_type: DataType,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    match record_date(record, data_type) {
        Some(date) => start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e),
        None => false,
    }
}

/// Whether a record belongs to one of the given users (empty = everyone)
pub fn owned_by(record: &Value, data_type: DataType, user_ids: &[String]) -> bool {
    user_ids.is_empty()
        || person_id(record, data_type.person_field())
            .is_some_and(|id| user_ids.iter().any(|u| *u == id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_date_preference() {
        let record = json!({"createdAt": "2025-10-09T10:00:00Z", "visitDate": "2025-10-01"});
        assert_eq!(
            record_date(&record, DataType::Visits),
            NaiveDate::from_ymd_opt(2025, 10, 1)
        );

        // Unparseable preferred field falls through to the next one
        let record = json!({"visitDate": "soon", "date": "2025-10-02"});
        assert_eq!(
            record_date(&record, DataType::Visits),
            NaiveDate::from_ymd_opt(2025, 10, 2)
        );
    }

    #[test]
    fn test_record_date_type_fallback() {
        let record = json!({"callDate": "2025-10-03"});
        assert_eq!(
            record_date(&record, DataType::CallLogs),
            NaiveDate::from_ymd_opt(2025, 10, 3)
        );
        assert_eq!(record_date(&record, DataType::Visits), None);
    }

    #[test]
    fn test_group_by_week_orders_buckets() {
        let records = vec![
            json!({"_id": "c", "visitDate": "2025-10-07"}),
            json!({"_id": "x"}),
            json!({"_id": "a", "visitDate": "2025-10-01"}),
            json!({"_id": "b", "visitDate": "2025-10-03"}),
        ];
        let buckets = group_by_week(&records, DataType::Visits);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].week, IsoWeek::new(2025, 40));
        assert_eq!(buckets[0].len(), 2);
        assert_eq!(buckets[0].records[0]["_id"], "a");
        assert_eq!(buckets[1].week, IsoWeek::new(2025, 41));
        assert_eq!(buckets[2].label(), NO_DATE_LABEL);
    }

    #[test]
    fn test_group_across_years() {
        let records = vec![
            json!({"date": "2025-01-02"}),
            json!({"date": "2024-12-20"}),
        ];
        let buckets = group_by_week(&records, DataType::Documents);
        assert_eq!(buckets[0].week, IsoWeek::new(2024, 51));
        assert_eq!(buckets[1].week, IsoWeek::new(2025, 1));
    }

    #[test]
    fn test_group_by_person() {
        let records = vec![
            json!({"user": {"_id": "u2", "firstName": "Zed"}}),
            json!({"user": {"_id": "u1", "firstName": "Amy", "lastName": "Lee"}}),
            json!({"user": "u2"}),
            json!({"notes": "orphan"}),
        ];
        let groups = group_by_person(&records, DataType::Visits);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].name, "Amy Lee");
        assert_eq!(groups[1].user_id.as_deref(), Some("u2"));
        assert_eq!(groups[1].records.len(), 2);
        assert_eq!(groups[2].name, UNASSIGNED_LABEL);
    }

    #[test]
    fn test_within_range() {
        let start = NaiveDate::from_ymd_opt(2025, 10, 1);
        let end = NaiveDate::from_ymd_opt(2025, 10, 31);
        let inside = json!({"visitDate": "2025-10-31"});
        let outside = json!({"visitDate": "2025-11-01"});
        let undated = json!({});
        assert!(within_range(&inside, DataType::Visits, start, end));
        assert!(!within_range(&outside, DataType::Visits, start, end));
        assert!(!within_range(&undated, DataType::Visits, start, end));
        assert!(within_range(&undated, DataType::Visits, None, None));
    }

    #[test]
    fn test_owned_by() {
        let record = json!({"requestedBy": {"_id": "u1"}});
        assert!(owned_by(&record, DataType::Quotations, &[]));
        assert!(owned_by(&record, DataType::Quotations, &["u1".to_string()]));
        assert!(!owned_by(&record, DataType::Quotations, &["u2".to_string()]));
    }
}
