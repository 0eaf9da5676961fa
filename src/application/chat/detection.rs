//! Two-tier intent detection.
//!
//! The AI classifier runs first; its result is only trusted above a fixed
//! confidence floor. Anything below the floor, and any provider failure,
//! falls back to the rule-based classifier. The caller can also force the
//! rule-based tier for a single message.

use std::sync::Arc;

use crate::domain::intent::{Intent, PendingSlotState, RuleBasedClassifier};

use super::classifier::AiIntentClassifier;

/// AI classifications below this confidence are discarded in favor of the
/// rule-based result.
pub const MIN_AI_CONFIDENCE: f32 = 0.7;

/// Which detection tiers to run for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionMode {
    /// AI first, rules as the floor.
    #[default]
    Auto,
    /// Skip the AI tier entirely.
    RulesOnly,
}

/// Facade over both classifier tiers.
pub struct IntentDetector {
    ai: Option<Arc<AiIntentClassifier>>,
    rules: RuleBasedClassifier,
}

impl IntentDetector {
    /// Creates a detector with both tiers.
    pub fn new(ai: Arc<AiIntentClassifier>) -> Self {
        Self {
            ai: Some(ai),
            rules: RuleBasedClassifier::new(),
        }
    }

    /// Creates a detector without an AI tier; every message goes through
    /// the rules.
    pub fn rules_only() -> Self {
        Self {
            ai: None,
            rules: RuleBasedClassifier::new(),
        }
    }

    /// Detects the intent of one message. Never fails: the rule-based tier
    /// is pure and always produces a result.
    pub async fn detect(
        &self,
        message: &str,
        context: Option<&PendingSlotState>,
        mode: DetectionMode,
    ) -> Intent {
        if mode == DetectionMode::Auto {
            if let Some(ai) = &self.ai {
                match ai.detect(message, context).await {
                    Ok(intent) if intent.confidence >= MIN_AI_CONFIDENCE => {
                        return intent;
                    }
                    Ok(intent) => {
                        tracing::debug!(
                            confidence = intent.confidence,
                            "AI classification below threshold, using rules"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "AI classification failed, using rules");
                    }
                }
            }
        }

        self.rules.detect(message, context)
    }
}
