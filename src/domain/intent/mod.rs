//! Intent detection domain: the structured classification of a free-text
//! message, the pure extraction patterns behind it, the rule-based
//! classifier, and the pending slot-filling state for multi-turn requests.

pub mod extract;
mod intent;
mod rules;
mod slots;

pub use intent::{clamp_confidence, FieldKey, FieldMap, Intent, IntentAction, IntentType};
pub use rules::{RuleBasedClassifier, CONTINUATION_CONFIDENCE, CONTINUATION_MAX_CHARS};
pub use slots::{PendingSlotState, REQUIRED_CLIENT_FIELDS};
