//! Conversation lifecycle: categories, titling rules, activity tracking.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, Timestamp, UserId};

/// Conversations with at most this many messages are transient: they never
/// receive a title and are excluded from listings.
pub const TRANSIENT_MESSAGE_LIMIT: u32 = 3;

/// Past this many messages an untitled conversation gets an AI-generated
/// title; between the two thresholds the heuristic title is used directly.
pub const AI_TITLE_THRESHOLD: u32 = 5;

/// Fixed category of a conversation. Selects the system prompt and the
/// context available on the general chat path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    General,
    Projects,
    Clients,
    Workflow,
    Calendar,
    System,
    Analytics,
}

impl ConversationType {
    /// Parses a type from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(Self::General),
            "projects" => Some(Self::Projects),
            "clients" => Some(Self::Clients),
            "workflow" => Some(Self::Workflow),
            "calendar" => Some(Self::Calendar),
            "system" => Some(Self::System),
            "analytics" => Some(Self::Analytics),
            _ => None,
        }
    }

    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Projects => "projects",
            Self::Clients => "clients",
            Self::Workflow => "workflow",
            Self::Calendar => "calendar",
            Self::System => "system",
            Self::Analytics => "analytics",
        }
    }
}

impl Default for ConversationType {
    fn default() -> Self {
        Self::General
    }
}

/// An ongoing exchange between one user and the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation id.
    pub id: ConversationId,
    /// Owning user. A conversation belongs to exactly one user.
    pub user_id: UserId,
    /// Fixed category.
    pub conversation_type: ConversationType,
    /// Null until explicitly set or auto-generated.
    pub title: Option<String>,
    /// Updated on every persisted message.
    pub last_activity_at: Timestamp,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Conversation {
    /// Creates a new untitled conversation for a user.
    pub fn new(user_id: UserId, conversation_type: ConversationType) -> Self {
        let now = Timestamp::now();
        Self {
            id: ConversationId::new(),
            user_id,
            conversation_type,
            title: None,
            last_activity_at: now,
            created_at: now,
        }
    }

    /// Sets an explicit title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Records message activity.
    pub fn touch(&mut self) {
        self.last_activity_at = Timestamp::now();
    }

    /// Decides how a title should be assigned given the current message
    /// count. Transient conversations stay untitled; mid-sized ones take
    /// the heuristic title; longer ones are worth an AI generation pass.
    pub fn title_rule(&self, message_count: u32) -> TitleRule {
        if self.title.is_some() || message_count <= TRANSIENT_MESSAGE_LIMIT {
            TitleRule::Keep
        } else if message_count > AI_TITLE_THRESHOLD {
            TitleRule::Generate
        } else {
            TitleRule::Heuristic
        }
    }
}

/// Outcome of the titling decision for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRule {
    /// Leave the title as it is (already set, or conversation is transient).
    Keep,
    /// Derive the title from the first message.
    Heuristic,
    /// Ask the AI for a title, falling back to the heuristic on failure.
    Generate,
}

/// Derives a short title from the first user message: truncated at a word
/// boundary, never empty.
pub fn heuristic_title(first_message: &str) -> String {
    const MAX_LEN: usize = 40;

    let trimmed = first_message.trim();
    if trimmed.is_empty() {
        return "New conversation".to_string();
    }
    if trimmed.chars().count() <= MAX_LEN {
        return trimmed.to_string();
    }

    let cut: String = trimmed.chars().take(MAX_LEN).collect();
    let cut = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Conversation {
        Conversation::new(UserId::new("user-1").unwrap(), ConversationType::Clients)
    }

    #[test]
    fn type_parses_all_categories() {
        for s in ["general", "projects", "clients", "workflow", "calendar", "system", "analytics"] {
            let parsed = ConversationType::parse(s).unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert_eq!(ConversationType::parse("billing"), None);
    }

    #[test]
    fn transient_conversations_stay_untitled() {
        let convo = conversation();
        assert_eq!(convo.title_rule(1), TitleRule::Keep);
        assert_eq!(convo.title_rule(3), TitleRule::Keep);
    }

    #[test]
    fn mid_sized_conversations_take_heuristic_title() {
        let convo = conversation();
        assert_eq!(convo.title_rule(4), TitleRule::Heuristic);
        assert_eq!(convo.title_rule(5), TitleRule::Heuristic);
    }

    #[test]
    fn long_conversations_get_generated_title() {
        let convo = conversation();
        assert_eq!(convo.title_rule(6), TitleRule::Generate);
    }

    #[test]
    fn existing_title_is_kept() {
        let convo = conversation().with_title("Q3 onboarding");
        assert_eq!(convo.title_rule(10), TitleRule::Keep);
    }

    #[test]
    fn heuristic_title_truncates_at_word_boundary() {
        let title = heuristic_title(
            "create a client named John Smith with email john@example.com please",
        );
        assert!(title.chars().count() <= 41);
        assert!(title.ends_with('…'));
    }

    #[test]
    fn heuristic_title_keeps_short_messages() {
        assert_eq!(heuristic_title("show my clients"), "show my clients");
    }

    #[test]
    fn heuristic_title_never_empty() {
        assert_eq!(heuristic_title("   "), "New conversation");
    }
}
