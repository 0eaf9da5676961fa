//! AI intent classifier.
//!
//! Asks the LLM gateway to classify one message into the same structured
//! intent the rule-based classifier produces. The model is prompted for
//! JSON only, but its output is still untrusted: the JSON block is located
//! inside whatever prose surrounds it, decoded leniently, and every field
//! is sanitized through the domain parsers before an [`Intent`] is built.

use std::sync::Arc;

use serde_json::Value;

use crate::adapters::ai::ProviderGateway;
use crate::domain::intent::{
    clamp_confidence, FieldKey, FieldMap, Intent, IntentAction, IntentType, PendingSlotState,
};
use crate::ports::{AIError, ChatRole, CompletionRequest};

/// Classification wants determinism, not creativity.
const CLASSIFICATION_TEMPERATURE: f32 = 0.1;
const CLASSIFICATION_MAX_TOKENS: u32 = 400;

/// Confidence assigned when the response carried no usable JSON and the
/// intent had to be guessed from keywords in the model's own text. Kept
/// below the execution threshold so a guess alone never triggers an action.
const KEYWORD_FALLBACK_CONFIDENCE: f32 = 0.35;

/// LLM-backed classifier over the provider gateway.
pub struct AiIntentClassifier {
    gateway: Arc<ProviderGateway>,
}

impl AiIntentClassifier {
    pub fn new(gateway: Arc<ProviderGateway>) -> Self {
        Self { gateway }
    }

    /// Classifies one message, serializing any pending slot-filling state
    /// into the prompt so the model can recognize continuations.
    pub async fn detect(
        &self,
        message: &str,
        context: Option<&PendingSlotState>,
    ) -> Result<Intent, AIError> {
        let request = CompletionRequest::new()
            .with_system_prompt(system_prompt())
            .with_message(ChatRole::User, user_prompt(message, context))
            .with_temperature(CLASSIFICATION_TEMPERATURE)
            .with_max_tokens(CLASSIFICATION_MAX_TOKENS);

        let completion = self.gateway.complete(request).await?;
        let content = completion.response.content;

        match parse_intent(&content, message) {
            Some(intent) => Ok(intent),
            None => {
                tracing::debug!("classifier response carried no usable JSON, scanning keywords");
                Ok(keyword_fallback(&content, message))
            }
        }
    }
}

fn system_prompt() -> String {
    "You classify messages sent to a business management assistant into a structured intent.\n\
     Respond with a single JSON object and nothing else, shaped exactly as:\n\
     {\"intent\": {\"type\": \"...\", \"action\": \"...\", \"confidence\": 0.0, \
     \"entities\": {}, \"is_followup\": false}}\n\
     Valid types: client, project, task, proposal, analytics, calendar, general, system, none.\n\
     Valid actions: create, read, update, delete, list, analyze, schedule, configure, none.\n\
     Valid entity keys: first_name, last_name, email, phone, company, industry, status, date, id.\n\
     Set confidence between 0.0 and 1.0. Extract only values actually present in the message.\n\
     Set is_followup to true only when the message answers a question the assistant just asked."
        .to_string()
}

fn user_prompt(message: &str, context: Option<&PendingSlotState>) -> String {
    let mut prompt = format!("Message: {message}");
    if let Some(state) = context {
        let collected = serde_json::to_string(&state.partial).unwrap_or_else(|_| "{}".to_string());
        let missing: Vec<&str> = state.missing.iter().map(|k| k.as_str()).collect();
        prompt.push_str(&format!(
            "\n\nThe assistant is collecting fields for a client record. \
             Collected so far: {collected}. Still missing: {missing:?}."
        ));
        if let Some(current) = state.current_field {
            prompt.push_str(&format!(
                " The assistant just asked for the {}.",
                current.display_name()
            ));
        }
    }
    prompt
}

/// Locates and decodes the intent object, sanitizing every field. `None`
/// means the response had no usable JSON at all.
fn parse_intent(content: &str, message: &str) -> Option<Intent> {
    let block = extract_json_block(content)?;
    let value: Value = serde_json::from_str(&block).ok()?;
    let raw = value.get("intent")?;

    let intent_type = raw
        .get("type")
        .and_then(Value::as_str)
        .map(IntentType::parse_lenient)
        .unwrap_or(IntentType::General);
    let action = raw
        .get("action")
        .and_then(Value::as_str)
        .map(IntentAction::parse_lenient)
        .unwrap_or(IntentAction::None);
    let confidence = raw
        .get("confidence")
        .map(coerce_confidence)
        .unwrap_or(0.0);

    let mut entities = FieldMap::new();
    if let Some(map) = raw.get("entities").and_then(Value::as_object) {
        for (key, value) in map {
            let Some(key) = FieldKey::parse(key) else {
                continue;
            };
            let text = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            if !text.is_empty() {
                entities.insert(key, text);
            }
        }
    }

    let mut intent = Intent::new(intent_type, action, confidence, entities, message);
    if raw.get("is_followup").and_then(Value::as_bool).unwrap_or(false) {
        intent = intent.as_followup();
    }
    Some(intent)
}

/// Coerces a confidence value that may arrive as a number or a string.
fn coerce_confidence(value: &Value) -> f32 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0) as f32,
        Value::String(s) => s.trim().parse::<f32>().unwrap_or(0.0),
        _ => 0.0,
    };
    clamp_confidence(raw)
}

/// Extracts the first balanced `{...}` block, tolerating prose and code
/// fences around it. Tracks string state so braces inside values do not
/// unbalance the scan.
fn extract_json_block(content: &str) -> Option<String> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in content[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(content[start..start + offset + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Last resort when no JSON could be decoded: scan the model's text for
/// domain and action keywords. Low confidence by construction.
fn keyword_fallback(content: &str, message: &str) -> Intent {
    let lowered = content.to_lowercase();
    let intent_type = if lowered.contains("client") || lowered.contains("customer") {
        IntentType::Client
    } else {
        IntentType::General
    };

    let action = [
        (IntentAction::Create, "create"),
        (IntentAction::Read, "read"),
        (IntentAction::Update, "update"),
        (IntentAction::Delete, "delete"),
        (IntentAction::List, "list"),
    ]
    .into_iter()
    .find(|(_, kw)| lowered.contains(kw))
    .map(|(action, _)| action)
    .unwrap_or(IntentAction::None);

    Intent::new(intent_type, action, KEYWORD_FALLBACK_CONFIDENCE, FieldMap::new(), message)
}
