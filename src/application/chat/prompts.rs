//! System prompts for the general chat path and auxiliary generations.

use crate::domain::conversation::ConversationType;
use crate::domain::foundation::UserId;
use crate::domain::intent::FieldKey;

const CAPABILITIES: &str = "You are the assistant inside a business management platform for \
independent professionals. Through chat the user can manage clients, projects, tasks, proposals, \
scheduling, and analytics. Answer concisely and concretely; when the user asks for something the \
platform can do, explain how or offer to do it.";

/// Builds the system prompt for a general (non-action) reply.
pub fn system_prompt(conversation_type: ConversationType, user: &UserId) -> String {
    let focus = match conversation_type {
        ConversationType::General => "Stay practical and friendly across any business topic.",
        ConversationType::Projects => {
            "This conversation is about the user's projects: scope, milestones, deliverables."
        }
        ConversationType::Clients => {
            "This conversation is about the user's clients: relationships, records, outreach."
        }
        ConversationType::Workflow => {
            "This conversation is about workflows and automation inside the platform."
        }
        ConversationType::Calendar => {
            "This conversation is about scheduling, availability, and upcoming events."
        }
        ConversationType::System => {
            "This conversation is about platform settings and configuration."
        }
        ConversationType::Analytics => {
            "This conversation is about business metrics, revenue, and reporting."
        }
    };

    format!("{CAPABILITIES}\n{focus}\nYou are assisting user {}.", user.as_str())
}

/// Prompt for generating a short conversation title from its first message.
pub fn title_prompt(first_message: &str) -> String {
    format!(
        "Write a title of at most six words for a conversation that starts with the \
         following message. Reply with the title only, no quotes.\n\nMessage: {first_message}"
    )
}

/// Prompt asking the model to phrase a follow-up question for one missing
/// field, given what is already collected.
pub fn followup_question_prompt(field: FieldKey, collected: &str) -> String {
    format!(
        "You are helping a user create a client record through chat. \
         Details collected so far: {collected}. \
         Ask one short, friendly question requesting the client's {}. \
         Reply with the question only.",
        field.display_name()
    )
}
