//! Machine document model
//!
//! Manuals, datasheets and links attached to equipment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::DocumentId;
use super::user::UserRef;
use super::validation::{require, Record, RecordValidationError};
use super::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_model: Option<String>,

    /// Uploaded file location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    /// External link, for documents hosted elsewhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MachineDocument {
    /// Where the document can be opened from
    pub fn location(&self) -> Option<&str> {
        self.file_url
            .as_deref()
            .or(self.link.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

impl Record for MachineDocument {
    const DATA_TYPE: DataType = DataType::Documents;

    fn validate(&self) -> Result<(), RecordValidationError> {
        require(&self.title, "title")?;

        let location = self
            .location()
            .ok_or(RecordValidationError::MissingField("fileUrl"))?;

        if self.link.as_deref() == Some(location)
            && !(location.starts_with("http://") || location.starts_with("https://"))
        {
            return Err(RecordValidationError::InvalidValue {
                field: "link",
                reason: "must be an http(s) URL".into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_prefers_file() {
        let doc: MachineDocument = serde_json::from_value(json!({
            "title": "Service manual",
            "fileUrl": "/uploads/manual.pdf",
            "link": "https://example.com/manual"
        }))
        .unwrap();
        assert_eq!(doc.location(), Some("/uploads/manual.pdf"));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_requires_a_location() {
        let doc: MachineDocument =
            serde_json::from_value(json!({"title": "Datasheet"})).unwrap();
        assert_eq!(
            doc.validate(),
            Err(RecordValidationError::MissingField("fileUrl"))
        );
    }

    #[test]
    fn test_link_must_be_http() {
        let doc: MachineDocument =
            serde_json::from_value(json!({"title": "Datasheet", "link": "ftp://x"})).unwrap();
        assert!(matches!(
            doc.validate(),
            Err(RecordValidationError::InvalidValue { field: "link", .. })
        ));
    }
}
