//! Sales rep references
//!
//! Records point at the rep who owns them. Depending on the endpoint the
//! backend either populates the reference or returns the bare id.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;

/// A populated user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: UserId,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl UserSummary {
    /// "First Last", trimmed when either part is missing
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Reference to a user: populated document or bare id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated(UserSummary),
    Id(UserId),
}

impl UserRef {
    pub fn id(&self) -> &UserId {
        match self {
            Self::Populated(user) => &user.id,
            Self::Id(id) => id,
        }
    }

    /// Display name when populated, otherwise the id
    pub fn display_name(&self) -> String {
        match self {
            Self::Populated(user) => {
                let name = user.full_name();
                if name.is_empty() {
                    user.id.to_string()
                } else {
                    name
                }
            }
            Self::Id(id) => id.to_string(),
        }
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}
