//! Audit entry data structures
//!
//! One entry per mutation sent to the backend through this tool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::DataType;

/// Kinds of mutation that are audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
    /// Weekly report approved or rejected
    Review,
    /// Quotation answered
    Respond,
    /// Several records created at once
    BulkAdd,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Review => write!(f, "REVIEW"),
            Operation::Respond => write!(f, "RESPOND"),
            Operation::BulkAdd => write!(f, "BULK_ADD"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the request settled (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub data_type: DataType,

    /// Id of the affected record; absent for bulk runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    /// Who ran the command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// What was sent to the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Short outcome, e.g. "5 succeeded, 2 failed"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AuditEntry {
    pub fn new(operation: Operation, data_type: DataType) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            data_type,
            record_id: None,
            actor: None,
            payload: None,
            summary: None,
        }
    }

    pub fn record(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    pub fn actor(mut self, actor: Option<&str>) -> Self {
        self.actor = actor.map(str::to_string);
        self
    }

    pub fn payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload = serde_json::to_value(payload).ok();
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.data_type.entity_name()
        );

        if let Some(id) = &self.record_id {
            output.push_str(&format!(" {}", id));
        }
        if let Some(actor) = &self.actor {
            output.push_str(&format!(" by {}", actor));
        }
        if let Some(summary) = &self.summary {
            output.push_str(&format!("\n  {}", summary));
        }

        output
    }
}
