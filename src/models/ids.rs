//! Strongly-typed ID wrappers for backend records
//!
//! The backend issues opaque string identifiers (`_id`). Wrapping them keeps
//! a visit id from being passed where a machine id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FieldSalesError;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $entity:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier issued by the backend
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Parse an identifier typed by the user
            pub fn parse(s: &str) -> Result<Self, FieldSalesError> {
                let trimmed = s.trim();
                if trimmed.is_empty() || trimmed.contains(|c: char| c.is_whitespace() || c == '/') {
                    return Err(FieldSalesError::Validation(format!(
                        "Invalid {} id: '{}'",
                        $entity, s
                    )));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Name of the entity this id belongs to
            pub fn entity() -> &'static str {
                $entity
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = FieldSalesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(VisitId, "Visit");
define_id!(MachineId, "Machine");
define_id!(DocumentId, "Document");
define_id!(ServiceRequestId, "Service request");
define_id!(CallLogId, "Call log");
define_id!(ReportId, "Report");
define_id!(QuotationId, "Quotation");
define_id!(UserId, "User");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let id = VisitId::parse("  65f1a2b3c4d5e6f7a8b9c0d1 ").unwrap();
        assert_eq!(id.as_str(), "65f1a2b3c4d5e6f7a8b9c0d1");
    }

    #[test]
    fn test_parse_rejects_path_segments() {
        assert!(ReportId::parse("abc/../def").is_err());
        assert!(ReportId::parse("").is_err());
        assert!(ReportId::parse("two words").is_err());
    }

    #[test]
    fn test_serialization_is_transparent() {
        let id = MachineId::new("m-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m-1\"");
        let back: MachineId = serde_json::from_str("\"m-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_display() {
        assert_eq!(QuotationId::new("q9").to_string(), "q9");
        assert_eq!(QuotationId::entity(), "Quotation");
    }
}
