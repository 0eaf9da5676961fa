//! Client entity - the business record manipulated through natural language.
//!
//! Persistence lives behind the [`crate::ports::ClientStore`] port; this
//! module only defines the record shape and its creation rules.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::intent::{FieldKey, FieldMap, REQUIRED_CLIENT_FIELDS};

/// Numeric client identifier, assigned by the store.
pub type ClientId = u64;

/// Lifecycle status of a client record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
    Lead,
}

impl ClientStatus {
    /// Parses a status from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "lead" => Some(Self::Lead),
            _ => None,
        }
    }

    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Lead => "lead",
        }
    }
}

impl Default for ClientStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// A client record. First name, last name and email are required; email is
/// unique across the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    /// User who owns this record; linked at creation.
    pub owner: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub status: ClientStatus,
    pub created_at: Timestamp,
}

impl ClientRecord {
    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Validated input for creating a client, built from extracted fields.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub status: ClientStatus,
}

impl NewClient {
    /// Builds a creation request from a field map, or reports which
    /// required fields are missing, in request order.
    pub fn from_fields(fields: &FieldMap) -> Result<Self, Vec<FieldKey>> {
        let missing: Vec<FieldKey> = REQUIRED_CLIENT_FIELDS
            .iter()
            .copied()
            .filter(|key| fields.get(key).map(|v| v.trim().is_empty()).unwrap_or(true))
            .collect();

        if !missing.is_empty() {
            return Err(missing);
        }

        let get = |key: FieldKey| fields.get(&key).map(|v| v.trim().to_string());
        let required = |key: FieldKey| get(key).unwrap_or_default();

        Ok(Self {
            first_name: required(FieldKey::FirstName),
            last_name: required(FieldKey::LastName),
            email: required(FieldKey::Email),
            phone: get(FieldKey::Phone),
            company: get(FieldKey::Company),
            industry: get(FieldKey::Industry),
            status: get(FieldKey::Status)
                .and_then(|s| ClientStatus::parse(&s))
                .unwrap_or_default(),
        })
    }
}
