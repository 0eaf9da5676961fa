//! Intent value objects.
//!
//! An [`Intent`] is the structured result of classifying one message:
//! entity type + action + extracted fields + confidence. Classifier output
//! is validated here, at the boundary: unknown types and actions coerce to
//! safe defaults and confidence is always clamped to `[0, 1]`, so nothing
//! downstream ever sees an out-of-range value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Entity domain a message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentType {
    /// Client/customer entity management.
    Client,
    Project,
    Task,
    Proposal,
    Analytics,
    Calendar,
    General,
    System,
    /// Nothing recognized.
    None,
}

impl IntentType {
    /// Parses a type, coercing anything unknown to `General`.
    ///
    /// External classifiers return free-form strings; this is the safe
    /// default required at the boundary.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "client" | "customer" | "clients" => Self::Client,
            "project" | "projects" => Self::Project,
            "task" | "tasks" => Self::Task,
            "proposal" | "proposals" => Self::Proposal,
            "analytics" => Self::Analytics,
            "calendar" => Self::Calendar,
            "general" => Self::General,
            "system" => Self::System,
            "none" => Self::None,
            _ => Self::General,
        }
    }

    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Project => "project",
            Self::Task => "task",
            Self::Proposal => "proposal",
            Self::Analytics => "analytics",
            Self::Calendar => "calendar",
            Self::General => "general",
            Self::System => "system",
            Self::None => "none",
        }
    }
}

/// Operation the user wants performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentAction {
    Create,
    Read,
    Update,
    Delete,
    List,
    Analyze,
    Schedule,
    Configure,
    None,
}

impl IntentAction {
    /// Parses an action, coercing anything unknown to `None`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "create" | "add" => Self::Create,
            "read" | "get" | "show" | "find" => Self::Read,
            "update" | "edit" => Self::Update,
            "delete" | "remove" => Self::Delete,
            "list" => Self::List,
            "analyze" => Self::Analyze,
            "schedule" => Self::Schedule,
            "configure" => Self::Configure,
            _ => Self::None,
        }
    }

    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
            Self::Analyze => "analyze",
            Self::Schedule => "schedule",
            Self::Configure => "configure",
            Self::None => "none",
        }
    }
}

/// Recognized entity field keys. The extraction schema is fixed; anything
/// an external classifier returns outside this set is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    Industry,
    Status,
    Date,
    /// Numeric record identifier extracted from the message.
    Id,
}

impl FieldKey {
    /// Parses a field key from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "first_name" | "firstname" => Some(Self::FirstName),
            "last_name" | "lastname" => Some(Self::LastName),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "company" | "company_name" => Some(Self::Company),
            "industry" => Some(Self::Industry),
            "status" => Some(Self::Status),
            "date" => Some(Self::Date),
            "id" => Some(Self::Id),
            _ => None,
        }
    }

    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Company => "company",
            Self::Industry => "industry",
            Self::Status => "status",
            Self::Date => "date",
            Self::Id => "id",
        }
    }

    /// Human-readable name, used when asking the user for a missing field.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FirstName => "first name",
            Self::LastName => "last name",
            Self::Email => "email address",
            Self::Phone => "phone number",
            Self::Company => "company name",
            Self::Industry => "industry",
            Self::Status => "status",
            Self::Date => "date",
            Self::Id => "record id",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracted field values, keyed uniquely and iterated in schema order.
pub type FieldMap = BTreeMap<FieldKey, String>;

/// Clamps a confidence score into `[0, 1]`. NaN collapses to zero.
pub fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Structured classification of one message. Created fresh per message and
/// never persisted beyond the turn that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// Entity domain.
    pub intent_type: IntentType,
    /// Operation requested.
    pub action: IntentAction,
    /// Classifier confidence, always within `[0, 1]`.
    pub confidence: f32,
    /// Extracted field values.
    pub entities: FieldMap,
    /// True when this message answers a pending slot-filling question
    /// rather than opening a new request.
    pub is_followup: bool,
    /// The original message text.
    pub message: String,
}

impl Intent {
    /// Creates an intent, clamping confidence at the boundary.
    pub fn new(
        intent_type: IntentType,
        action: IntentAction,
        confidence: f32,
        entities: FieldMap,
        message: impl Into<String>,
    ) -> Self {
        Self {
            intent_type,
            action,
            confidence: clamp_confidence(confidence),
            entities,
            is_followup: false,
            message: message.into(),
        }
    }

    /// Creates the "nothing recognized" intent.
    pub fn none(message: impl Into<String>) -> Self {
        Self::new(IntentType::None, IntentAction::None, 0.0, FieldMap::new(), message)
    }

    /// Marks this intent as a slot-filling continuation.
    pub fn as_followup(mut self) -> Self {
        self.is_followup = true;
        self
    }

    /// True when this intent asks for a client-entity operation.
    pub fn is_client_management(&self) -> bool {
        self.intent_type == IntentType::Client && self.action != IntentAction::None
    }
}
