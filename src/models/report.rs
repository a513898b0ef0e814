//! Weekly report model
//!
//! Reps submit one narrative report per week; admins approve or reject it
//! with optional notes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::dates::flexible_date;
use super::ids::ReportId;
use super::user::UserRef;
use super::validation::{require, Record, RecordValidationError};
use super::week::IsoWeek;
use super::DataType;

/// Admin review state of a weekly report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" | "approve" => Some(Self::Approved),
            "rejected" | "reject" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Approved => write!(f, "Approved"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ReportId>,

    #[serde(with = "flexible_date")]
    pub week_start: NaiveDate,

    #[serde(with = "flexible_date")]
    pub week_end: NaiveDate,

    /// Narrative summary of the week
    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_week_plan: Option<String>,

    #[serde(default)]
    pub status: ReviewStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WeeklyReport {
    /// The ISO week the report covers, keyed by its start date
    pub fn iso_week(&self) -> IsoWeek {
        IsoWeek::from_date(self.week_start)
    }

    /// Whether a date falls inside the reported period (inclusive)
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.week_start <= date && date <= self.week_end
    }

    pub fn rep_name(&self) -> String {
        self.user
            .as_ref()
            .map(UserRef::display_name)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

impl Record for WeeklyReport {
    const DATA_TYPE: DataType = DataType::Reports;

    fn validate(&self) -> Result<(), RecordValidationError> {
        if self.week_start > self.week_end {
            return Err(RecordValidationError::DateOrder {
                start: "weekStart",
                end: "weekEnd",
            });
        }
        require(&self.content, "content")
    }
}
