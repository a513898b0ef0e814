//! Call log model
//!
//! Telesales calls are filed under year, month and ISO week so that the
//! dashboard can browse them as folders. The tags are derived from the call
//! date when the input does not carry them.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::dates::{flexible_date, option_flexible_date};
use super::ids::CallLogId;
use super::lenient::{option_number, option_text};
use super::user::UserRef;
use super::validation::{require, Record, RecordValidationError};
use super::week::IsoWeek;
use super::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLog {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CallLogId>,

    #[serde(default)]
    pub client_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility: Option<String>,

    #[serde(
        default,
        deserialize_with = "option_text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,

    #[serde(with = "flexible_date")]
    pub call_date: NaiveDate,

    /// Inbound, outbound, follow-up...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(
        default,
        with = "option_flexible_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub follow_up_date: Option<NaiveDate>,

    #[serde(
        default,
        deserialize_with = "option_number::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,

    #[serde(
        default,
        deserialize_with = "option_number::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub month: Option<u32>,

    #[serde(
        default,
        deserialize_with = "option_number::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub week: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CallLog {
    /// ISO week of the call
    pub fn iso_week(&self) -> IsoWeek {
        IsoWeek::from_date(self.call_date)
    }
}

impl Record for CallLog {
    const DATA_TYPE: DataType = DataType::CallLogs;

    fn validate(&self) -> Result<(), RecordValidationError> {
        require(&self.client_name, "clientName")?;

        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(RecordValidationError::InvalidValue {
                    field: "month",
                    reason: format!("{} is not a month", month),
                });
            }
        }
        if let Some(week) = self.week {
            if !(1..=53).contains(&week) {
                return Err(RecordValidationError::InvalidValue {
                    field: "week",
                    reason: format!("{} is not an ISO week", week),
                });
            }
        }
        if let Some(follow_up) = self.follow_up_date {
            if follow_up < self.call_date {
                return Err(RecordValidationError::DateOrder {
                    start: "callDate",
                    end: "followUpDate",
                });
            }
        }

        Ok(())
    }

    // Year and month are calendar values; week is the ISO week number.
    fn normalize(&mut self) {
        self.year.get_or_insert(self.call_date.year());
        self.month.get_or_insert(self.call_date.month());
        self.week.get_or_insert(self.call_date.iso_week().week());
    }
}
