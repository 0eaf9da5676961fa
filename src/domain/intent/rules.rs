//! Rule-based intent classifier.
//!
//! Pure pattern matching over free text: ordered action keyword groups,
//! targeted field extraction, and slot-filling continuation handling. This
//! classifier is the floor the AI classifier falls back to, so it must work
//! with no I/O and never fail.

use super::extract;
use super::{clamp_confidence, FieldKey, FieldMap, Intent, IntentAction, IntentType, PendingSlotState};

/// Continuation answers longer than this are not treated as field values.
pub const CONTINUATION_MAX_CHARS: usize = 100;

/// Fixed confidence for slot-filling continuations.
pub const CONTINUATION_CONFIDENCE: f32 = 0.9;

const BASE_CONFIDENCE: f32 = 0.5;
const ACTION_HIT_BONUS: f32 = 0.2;
const DOMAIN_HIT_BONUS: f32 = 0.1;

/// Matching is on word boundaries, so plural forms are listed explicitly.
const DOMAIN_KEYWORDS: &[&str] =
    &["client", "clients", "customer", "customers", "contact", "contacts"];

/// Action keyword groups in priority order: ties go to the earlier group.
const ACTION_GROUPS: [(IntentAction, &[&str]); 5] = [
    (IntentAction::Create, &["create", "add", "make", "register", "new"]),
    (IntentAction::Read, &["show", "find", "get", "view", "look up", "search", "who is"]),
    (IntentAction::Update, &["update", "edit", "change", "modify", "set"]),
    (IntentAction::Delete, &["delete", "remove", "drop"]),
    (IntentAction::List, &["list", "enumerate"]),
];

/// Pattern-matching classifier for client-entity management messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classifies one message, using prior slot-filling state when present.
    pub fn detect(&self, message: &str, prior: Option<&PendingSlotState>) -> Intent {
        let normalized = message.trim().to_lowercase();
        if normalized.is_empty() {
            return Intent::none(message);
        }

        let domain_hits = DOMAIN_KEYWORDS
            .iter()
            .filter(|kw| contains_word(&normalized, kw))
            .count();

        for (action, keywords) in ACTION_GROUPS {
            let action_hits = keywords.iter().filter(|kw| contains_word(&normalized, kw)).count();
            if action_hits == 0 || domain_hits == 0 {
                continue;
            }

            let confidence = clamp_confidence(
                BASE_CONFIDENCE
                    + ACTION_HIT_BONUS * action_hits as f32
                    + DOMAIN_HIT_BONUS * domain_hits as f32,
            );
            let entities = extract_fields(message);
            return Intent::new(IntentType::Client, action, confidence, entities, message);
        }

        // No action pattern matched. A pending question turns the whole
        // message into the answer for the requested field.
        if let Some(state) = prior {
            if let Some(current) = state.current_field {
                let answer = message.trim();
                if !answer.is_empty() && answer.chars().count() < CONTINUATION_MAX_CHARS {
                    let mut entities = FieldMap::new();
                    entities.insert(current, answer.to_string());
                    return Intent::new(
                        IntentType::Client,
                        IntentAction::Create,
                        CONTINUATION_CONFIDENCE,
                        entities,
                        message,
                    )
                    .as_followup();
                }
            }
        }

        Intent::none(message)
    }
}

/// Runs every extraction pattern over the original-case message.
fn extract_fields(message: &str) -> FieldMap {
    let mut entities = FieldMap::new();

    if let Some(email) = extract::email(message) {
        entities.insert(FieldKey::Email, email);
    }
    if let Some(phone) = extract::phone(message) {
        entities.insert(FieldKey::Phone, phone);
    }
    if let Some(company) = extract::company(message) {
        entities.insert(FieldKey::Company, company);
    }
    if let Some(id) = extract::numeric_id(message) {
        entities.insert(FieldKey::Id, id.to_string());
    }
    if let Some(candidate) = extract::person_name(message) {
        let (first, last) = extract::split_name(&candidate);
        entities.insert(FieldKey::FirstName, first);
        if let Some(last) = last {
            entities.insert(FieldKey::LastName, last);
        }
    }

    entities
}

/// Keyword containment on word boundaries; multi-word keywords match as
/// plain substrings.
fn contains_word(haystack: &str, keyword: &str) -> bool {
    if keyword.contains(' ') {
        return haystack.contains(keyword);
    }
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == keyword)
}
