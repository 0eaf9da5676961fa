//! User-facing response text for completed actions and follow-up questions.

use crate::domain::client::ClientRecord;
use crate::domain::intent::{FieldKey, IntentAction};

use super::executor::{ActionData, ActionOutcome};

/// Fixed reply when every completion backend has failed.
pub const APOLOGY: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

/// Renders a completed or failed action outcome as chat text. `NeedsInput`
/// is not rendered here; the orchestrator phrases the follow-up question.
pub fn outcome_text(outcome: &ActionOutcome) -> Option<String> {
    match outcome {
        ActionOutcome::Done { action, data } => Some(confirmation(*action, data)),
        ActionOutcome::Failed { message } => Some(message.clone()),
        ActionOutcome::NeedsInput { .. } => None,
    }
}

fn confirmation(action: IntentAction, data: &ActionData) -> String {
    match (action, data) {
        (IntentAction::Create, ActionData::Client(record)) => format!(
            "Created client {} (#{}).\n{}",
            record.full_name(),
            record.id,
            field_lines(record)
        ),
        (IntentAction::Read, ActionData::Client(record)) => format!(
            "{} (#{})\n{}",
            record.full_name(),
            record.id,
            field_lines(record)
        ),
        (IntentAction::Update, ActionData::Client(record)) => format!(
            "Updated client {} (#{}).\n{}",
            record.full_name(),
            record.id,
            field_lines(record)
        ),
        (IntentAction::Delete, ActionData::Client(record)) => {
            format!("Deleted client {} (#{}).", record.full_name(), record.id)
        }
        (_, ActionData::Clients(records)) => list_text(records),
        // Unreachable combinations render the data generically.
        (_, ActionData::Client(record)) => format!("{} (#{})", record.full_name(), record.id),
    }
}

fn field_lines(record: &ClientRecord) -> String {
    let mut lines = vec![format!("Email: {}", record.email)];
    if let Some(phone) = &record.phone {
        lines.push(format!("Phone: {phone}"));
    }
    if let Some(company) = &record.company {
        lines.push(format!("Company: {company}"));
    }
    if let Some(industry) = &record.industry {
        lines.push(format!("Industry: {industry}"));
    }
    lines.push(format!("Status: {}", record.status.as_str()));
    lines.join("\n")
}

fn list_text(records: &[ClientRecord]) -> String {
    if records.is_empty() {
        return "No clients matched.".to_string();
    }

    let mut out = format!(
        "Found {} client{}:",
        records.len(),
        if records.len() == 1 { "" } else { "s" }
    );
    for (index, record) in records.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {} ({})",
            index + 1,
            record.full_name(),
            record.email
        ));
    }
    out
}

/// Canned follow-up question for missing required fields. Names everything
/// still missing but asks only for the first.
pub fn canned_question(missing: &[FieldKey]) -> String {
    match missing {
        [] => "What else should I add?".to_string(),
        [only] => format!("What is the client's {}?", only.display_name()),
        [first, rest @ ..] => {
            let names: Vec<&str> = std::iter::once(first)
                .chain(rest.iter())
                .map(|k| k.display_name())
                .collect();
            format!(
                "To create this client I still need the {}. What is the {}?",
                join_names(&names),
                first.display_name()
            )
        }
    }
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
