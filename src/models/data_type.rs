//! Record kinds served by the backend
//!
//! Every dashboard screen corresponds to one data type. The type knows its
//! REST endpoint, how it is labelled in exports, which field carries the
//! record date, and which field names the sales rep who owns the record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A kind of backend record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    /// Sales calls logged by field reps
    Visits,
    /// Installed equipment
    Machines,
    /// Manuals and links attached to equipment
    Documents,
    /// Requests for engineering service
    ServiceRequests,
    /// Telesales call records
    CallLogs,
    /// Weekly narrative reports
    Reports,
    /// Price requests from facilities
    Quotations,
}

impl DataType {
    /// All data types, in export order
    pub const ALL: [DataType; 7] = [
        DataType::Visits,
        DataType::Machines,
        DataType::Documents,
        DataType::ServiceRequests,
        DataType::CallLogs,
        DataType::Reports,
        DataType::Quotations,
    ];

    /// REST collection path, relative to the API base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Visits => "/visits",
            Self::Machines => "/machines",
            Self::Documents => "/documents",
            Self::ServiceRequests => "/service-requests",
            Self::CallLogs => "/telesales",
            Self::Reports => "/reports",
            Self::Quotations => "/quotations",
        }
    }

    /// Human label used for sheet names and headings
    pub fn label(&self) -> &'static str {
        match self {
            Self::Visits => "Visits",
            Self::Machines => "Machines",
            Self::Documents => "Documents",
            Self::ServiceRequests => "Service Requests",
            Self::CallLogs => "Call Logs",
            Self::Reports => "Weekly Reports",
            Self::Quotations => "Quotations",
        }
    }

    /// Singular entity name used in messages
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Visits => "Visit",
            Self::Machines => "Machine",
            Self::Documents => "Document",
            Self::ServiceRequests => "Service request",
            Self::CallLogs => "Call log",
            Self::Reports => "Report",
            Self::Quotations => "Quotation",
        }
    }

    /// Type-specific date fields, tried after the common
    /// `visitDate`/`createdAt`/`date` sequence
    pub fn fallback_date_fields(&self) -> &'static [&'static str] {
        match self {
            Self::CallLogs => &["callDate"],
            Self::Reports => &["weekStart"],
            Self::Machines => &["installedDate"],
            Self::ServiceRequests => &["requestDate"],
            Self::Visits | Self::Documents | Self::Quotations => &[],
        }
    }

    /// Field holding the rep (user) that owns the record
    pub fn person_field(&self) -> &'static str {
        match self {
            Self::Visits | Self::Reports | Self::CallLogs => "user",
            Self::Quotations => "requestedBy",
            Self::ServiceRequests => "assignedTo",
            Self::Machines | Self::Documents => "createdBy",
        }
    }

    /// Parse a data type from user input
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "visit" | "visits" => Some(Self::Visits),
            "machine" | "machines" | "equipment" => Some(Self::Machines),
            "document" | "documents" | "docs" | "manuals" => Some(Self::Documents),
            "servicerequest" | "servicerequests" | "service" | "services" => {
                Some(Self::ServiceRequests)
            }
            "calllog" | "calllogs" | "calls" | "telesales" => Some(Self::CallLogs),
            "report" | "reports" | "weeklyreports" => Some(Self::Reports),
            "quotation" | "quotations" | "quotes" => Some(Self::Quotations),
            _ => None,
        }
    }

    /// Parse a comma-separated list of data types, rejecting unknown names
    pub fn parse_list(s: &str) -> Result<Vec<Self>, String> {
        let mut types = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let data_type =
                Self::parse(part).ok_or_else(|| format!("Unknown data type: '{}'", part))?;
            if !types.contains(&data_type) {
                types.push(data_type);
            }
        }
        Ok(types)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
