//! The chat pipeline: AI and rule-based intent detection, client action
//! execution, response formatting, and the per-message orchestrator.

mod classifier;
mod detection;
mod executor;
mod formatter;
mod orchestrator;
mod prompts;
mod suggestions;

pub use classifier::AiIntentClassifier;
pub use detection::{DetectionMode, IntentDetector, MIN_AI_CONFIDENCE};
pub use executor::{ActionData, ActionOutcome, ClientActionExecutor};
pub use formatter::APOLOGY;
pub use orchestrator::{ChatError, ChatExchange, ChatOptions, ChatOrchestrator};
pub use suggestions::suggestions_for;
