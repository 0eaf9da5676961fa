//! Static prompt suggestions shown when a conversation is empty.

use crate::domain::conversation::ConversationType;

/// Returns the suggested prompts for a conversation type.
pub fn suggestions_for(conversation_type: ConversationType) -> &'static [&'static str] {
    match conversation_type {
        ConversationType::General => &[
            "What can you help me with?",
            "Summarize my business at a glance",
            "Create a client named Jane Doe",
        ],
        ConversationType::Projects => &[
            "What projects are due this month?",
            "Create a project for my new client",
            "Which project needs attention first?",
        ],
        ConversationType::Clients => &[
            "List my clients",
            "Add a new client",
            "Who haven't I talked to recently?",
        ],
        ConversationType::Workflow => &[
            "What automations are available?",
            "Set up a follow-up reminder workflow",
            "Show my active workflows",
        ],
        ConversationType::Calendar => &[
            "What's on my calendar this week?",
            "Find a free slot for a client call",
            "Schedule a project review",
        ],
        ConversationType::System => &[
            "How do I connect my email?",
            "Change my notification settings",
            "What integrations are supported?",
        ],
        ConversationType::Analytics => &[
            "How is my revenue trending?",
            "Which client brings the most work?",
            "Show my proposal win rate",
        ],
    }
}
