//! Pending slot-filling state for multi-turn entity creation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, Timestamp};

use super::{FieldKey, FieldMap};

/// Fields a client record cannot be created without, in the order they are
/// requested from the user.
pub const REQUIRED_CLIENT_FIELDS: [FieldKey; 3] =
    [FieldKey::FirstName, FieldKey::LastName, FieldKey::Email];

/// What is still missing for an in-flight entity creation.
///
/// Exists only while at least one required field is absent. The state is
/// stored with a short TTL; past it the state must be treated as gone even
/// if the backing store has not evicted it yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSlotState {
    /// Conversation this state belongs to.
    pub conversation_id: ConversationId,
    /// Required fields still missing, in request order.
    pub missing: Vec<FieldKey>,
    /// The field the assistant is currently asking for.
    pub current_field: Option<FieldKey>,
    /// Field values collected so far.
    pub partial: FieldMap,
    /// When this state was stored; expiry is measured from here.
    pub created_at: Timestamp,
}

impl PendingSlotState {
    /// Creates state for a creation attempt that came up short.
    ///
    /// `missing` keeps its order; the first missing field becomes the one
    /// to request next.
    pub fn new(conversation_id: ConversationId, missing: Vec<FieldKey>, partial: FieldMap) -> Self {
        let current_field = missing.first().copied();
        Self {
            conversation_id,
            missing,
            current_field,
            partial,
            created_at: Timestamp::now(),
        }
    }

    /// Merges newly extracted values and recomputes what is still missing.
    ///
    /// The timestamp resets: every answer keeps the window open for another
    /// full TTL.
    pub fn merged_with(&self, newly_extracted: &FieldMap) -> Self {
        let mut partial = self.partial.clone();
        for (key, value) in newly_extracted {
            if !value.trim().is_empty() {
                partial.insert(*key, value.trim().to_string());
            }
        }

        let missing: Vec<FieldKey> = REQUIRED_CLIENT_FIELDS
            .iter()
            .copied()
            .filter(|key| !partial.contains_key(key))
            .collect();

        Self::new(self.conversation_id, missing, partial)
    }

    /// True once every required field has a value.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// True when this state is older than the given TTL and must be treated
    /// as absent.
    pub fn is_expired(&self, ttl_secs: u64) -> bool {
        self.created_at.age_secs() > ttl_secs as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_missing_all() -> PendingSlotState {
        PendingSlotState::new(
            ConversationId::new(),
            REQUIRED_CLIENT_FIELDS.to_vec(),
            FieldMap::new(),
        )
    }

    #[test]
    fn current_field_is_first_missing() {
        let state = state_missing_all();
        assert_eq!(state.current_field, Some(FieldKey::FirstName));
    }

    #[test]
    fn merge_fills_and_advances() {
        let state = state_missing_all();

        let mut answer = FieldMap::new();
        answer.insert(FieldKey::FirstName, "Jane".to_string());
        let state = state.merged_with(&answer);

        assert_eq!(state.missing, vec![FieldKey::LastName, FieldKey::Email]);
        assert_eq!(state.current_field, Some(FieldKey::LastName));
        assert_eq!(state.partial[&FieldKey::FirstName], "Jane");
        assert!(!state.is_complete());
    }

    #[test]
    fn merge_ignores_blank_values() {
        let state = state_missing_all();

        let mut answer = FieldMap::new();
        answer.insert(FieldKey::FirstName, "   ".to_string());
        let state = state.merged_with(&answer);

        assert_eq!(state.current_field, Some(FieldKey::FirstName));
    }

    #[test]
    fn completes_when_all_required_present() {
        let mut fields = FieldMap::new();
        fields.insert(FieldKey::FirstName, "Jane".to_string());
        fields.insert(FieldKey::LastName, "Doe".to_string());
        fields.insert(FieldKey::Email, "jane@example.com".to_string());

        let state = state_missing_all().merged_with(&fields);
        assert!(state.is_complete());
        assert_eq!(state.current_field, None);
    }

    #[test]
    fn expiry_is_measured_against_ttl() {
        let mut state = state_missing_all();
        assert!(!state.is_expired(300));

        state.created_at = Timestamp::now().add_secs(-301);
        assert!(state.is_expired(300));
    }
}
