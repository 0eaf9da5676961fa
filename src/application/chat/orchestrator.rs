//! Chat orchestrator - the per-message state machine.
//!
//! One entry point, [`ChatOrchestrator::send_message`], drives the whole
//! exchange: load pending slot-filling state, classify, execute client
//! actions above the confidence floor, otherwise answer on the general
//! path through the provider gateway. Both messages are persisted and
//! conversation bookkeeping (activity, titling) runs at the end.
//!
//! Infrastructure hiccups degrade instead of failing the exchange: a dead
//! context store means intents are treated as fresh, a dead gateway means
//! a fixed apology. Only the conversation repository is load-bearing.

use std::sync::Arc;

use serde_json::json;

use crate::adapters::ai::ProviderGateway;
use crate::domain::conversation::{
    heuristic_title, Conversation, ConversationType, Message, MessageRole, TitleRule,
};
use crate::domain::foundation::{ConversationId, UserId};
use crate::domain::intent::{Intent, PendingSlotState};
use crate::ports::{ChatRole, CompletionRequest, ContextStore, ConversationRepository, RepositoryError};

use super::detection::{DetectionMode, IntentDetector, MIN_AI_CONFIDENCE};
use super::executor::{ActionOutcome, ClientActionExecutor};
use super::formatter::{self, APOLOGY};
use super::prompts;

/// How many recent messages accompany a general completion.
const HISTORY_LIMIT: usize = 10;

/// Generated follow-up questions longer than this are discarded for the
/// canned template.
const MAX_QUESTION_CHARS: usize = 200;

/// Per-message options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatOptions {
    /// Skip the AI classification tier for this message.
    pub rules_only: bool,
}

/// The persisted result of one exchange.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub conversation: Conversation,
    /// The message as posted.
    pub user_message: Message,
    /// The generated reply; absent when an assistant-role message was
    /// posted directly.
    pub assistant_message: Option<Message>,
}

/// Chat pipeline errors surfaced to the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Conversation does not exist or belongs to another user.
    #[error("conversation not found")]
    ConversationNotFound,

    /// Conversation repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Drives conversations end to end over the ports.
pub struct ChatOrchestrator {
    repository: Arc<dyn ConversationRepository>,
    context: Arc<dyn ContextStore>,
    detector: IntentDetector,
    executor: ClientActionExecutor,
    gateway: Arc<ProviderGateway>,
}

impl ChatOrchestrator {
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        context: Arc<dyn ContextStore>,
        detector: IntentDetector,
        executor: ClientActionExecutor,
        gateway: Arc<ProviderGateway>,
    ) -> Self {
        Self {
            repository,
            context,
            detector,
            executor,
            gateway,
        }
    }

    /// Creates a conversation, optionally titled.
    pub async fn create_conversation(
        &self,
        user: &UserId,
        conversation_type: ConversationType,
        title: Option<String>,
    ) -> Result<Conversation, ChatError> {
        let mut conversation = Conversation::new(user.clone(), conversation_type);
        if let Some(title) = title {
            conversation = conversation.with_title(title);
        }
        self.repository.insert(conversation.clone()).await?;
        Ok(conversation)
    }

    /// Returns a conversation with its messages, scoped to the owner.
    pub async fn get_conversation(
        &self,
        user: &UserId,
        id: ConversationId,
    ) -> Result<(Conversation, Vec<Message>), ChatError> {
        let conversation = self
            .repository
            .find(id, user)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;
        let messages = self.repository.messages(id).await?;
        Ok((conversation, messages))
    }

    /// Lists the user's non-transient conversations, most recent first.
    pub async fn list_conversations(
        &self,
        user: &UserId,
        conversation_type: Option<ConversationType>,
        limit: usize,
    ) -> Result<Vec<Conversation>, ChatError> {
        Ok(self.repository.list_visible(user, conversation_type, limit).await?)
    }

    /// Deletes a conversation along with its messages and any pending
    /// slot-filling state.
    pub async fn delete_conversation(
        &self,
        user: &UserId,
        id: ConversationId,
    ) -> Result<(), ChatError> {
        match self.repository.delete(id, user).await {
            Ok(()) => {}
            Err(RepositoryError::NotFound(_)) => return Err(ChatError::ConversationNotFound),
            Err(err) => return Err(err.into()),
        }
        if let Err(err) = self.context.clear(id).await {
            tracing::warn!(conversation = %id, error = %err, "failed to clear slot state");
        }
        Ok(())
    }

    /// Posts a message. User messages run the full pipeline and produce an
    /// assistant reply; assistant messages are persisted as-is.
    pub async fn send_message(
        &self,
        user: &UserId,
        conversation_id: ConversationId,
        content: &str,
        role: MessageRole,
        options: ChatOptions,
    ) -> Result<ChatExchange, ChatError> {
        let conversation = self
            .repository
            .find(conversation_id, user)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        let posted = Message::new(conversation_id, role, content);
        self.repository.append_message(posted.clone()).await?;

        if role == MessageRole::Assistant {
            return Ok(ChatExchange {
                conversation,
                user_message: posted,
                assistant_message: None,
            });
        }

        let pending = self.load_pending(conversation_id).await;
        let mode = if options.rules_only {
            DetectionMode::RulesOnly
        } else {
            DetectionMode::Auto
        };
        let intent = self.detector.detect(content, pending.as_ref(), mode).await;

        let reply = if intent.is_client_management() && intent.confidence >= MIN_AI_CONFIDENCE {
            self.run_action(&conversation, &intent, pending, user).await
        } else {
            self.run_general(&conversation, user).await
        };

        let mut assistant = Message::new(conversation_id, MessageRole::Assistant, reply.content)
            .with_metadata("intent_type", json!(intent.intent_type.as_str()))
            .with_metadata("intent_action", json!(intent.action.as_str()))
            .with_metadata("confidence", json!(intent.confidence));
        for (key, value) in reply.metadata {
            assistant = assistant.with_metadata(key, value);
        }
        self.repository.append_message(assistant.clone()).await?;

        self.apply_title_rule(&conversation).await;

        Ok(ChatExchange {
            conversation,
            user_message: posted,
            assistant_message: Some(assistant),
        })
    }

    /// Loads pending slot state, treating store failures as no state.
    async fn load_pending(&self, conversation_id: ConversationId) -> Option<PendingSlotState> {
        match self.context.get(conversation_id).await {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(conversation = %conversation_id, error = %err, "context store read failed");
                None
            }
        }
    }

    /// Executes a client-management intent and maps the outcome to a reply.
    async fn run_action(
        &self,
        conversation: &Conversation,
        intent: &Intent,
        pending: Option<PendingSlotState>,
        user: &UserId,
    ) -> Reply {
        let fields = match (&pending, intent.is_followup) {
            (Some(state), true) => state.merged_with(&intent.entities).partial,
            _ => intent.entities.clone(),
        };

        let outcome = self.executor.execute(intent, &fields, user).await;

        match outcome {
            ActionOutcome::NeedsInput { missing, partial } => {
                let state = PendingSlotState::new(conversation.id, missing, partial);
                if let Err(err) = self.context.put(state.clone()).await {
                    tracing::warn!(conversation = %conversation.id, error = %err, "context store write failed");
                }
                Reply {
                    content: self.followup_question(&state).await,
                    metadata: vec![("requires_interaction".to_string(), json!(true))],
                }
            }
            outcome => {
                if matches!(outcome, ActionOutcome::Done { .. }) {
                    if let Err(err) = self.context.clear(conversation.id).await {
                        tracing::warn!(conversation = %conversation.id, error = %err, "failed to clear slot state");
                    }
                }
                Reply {
                    // Done and Failed both render to text here.
                    content: formatter::outcome_text(&outcome)
                        .unwrap_or_else(|| APOLOGY.to_string()),
                    metadata: Vec::new(),
                }
            }
        }
    }

    /// Answers on the general path: typed system prompt, recent history,
    /// gateway completion with fallback provenance in metadata.
    async fn run_general(&self, conversation: &Conversation, user: &UserId) -> Reply {
        let history = match self.repository.messages(conversation.id).await {
            Ok(messages) => messages,
            Err(err) => {
                tracing::error!(conversation = %conversation.id, error = %err, "history load failed");
                Vec::new()
            }
        };

        let mut request = CompletionRequest::new()
            .with_system_prompt(prompts::system_prompt(conversation.conversation_type, user));
        let skip = history.len().saturating_sub(HISTORY_LIMIT);
        for message in history.into_iter().skip(skip) {
            let role = match message.role {
                MessageRole::User => ChatRole::User,
                MessageRole::Assistant => ChatRole::Assistant,
            };
            request = request.with_message(role, message.content);
        }

        match self.gateway.complete(request).await {
            Ok(completion) => {
                let usage = &completion.response.usage;
                let mut metadata = vec![
                    ("provider".to_string(), json!(completion.provider)),
                    ("model".to_string(), json!(completion.response.model)),
                    ("tokens_used".to_string(), json!(usage.total_tokens)),
                    ("cost_cents".to_string(), json!(usage.estimated_cost_cents)),
                ];
                if completion.fell_back {
                    metadata.push(("fallback".to_string(), json!(true)));
                }
                Reply {
                    content: completion.response.content,
                    metadata,
                }
            }
            Err(err) => {
                tracing::error!(conversation = %conversation.id, error = %err, "all completion backends failed");
                Reply {
                    content: APOLOGY.to_string(),
                    metadata: vec![("error".to_string(), json!(true))],
                }
            }
        }
    }

    /// Phrases the follow-up question for the next missing field, falling
    /// back to the canned template when generation fails or rambles.
    async fn followup_question(&self, state: &PendingSlotState) -> String {
        let Some(field) = state.current_field else {
            return formatter::canned_question(&state.missing);
        };

        let collected =
            serde_json::to_string(&state.partial).unwrap_or_else(|_| "{}".to_string());
        let request = CompletionRequest::new()
            .with_message(ChatRole::User, prompts::followup_question_prompt(field, &collected))
            .with_max_tokens(60);

        match self.gateway.complete(request).await {
            Ok(completion) => {
                let question = completion.response.content.trim().to_string();
                if question.is_empty() || question.chars().count() > MAX_QUESTION_CHARS {
                    formatter::canned_question(&state.missing)
                } else {
                    question
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "question generation failed, using template");
                formatter::canned_question(&state.missing)
            }
        }
    }

    /// Applies the titling rule after an exchange. Failures here never fail
    /// the exchange.
    async fn apply_title_rule(&self, conversation: &Conversation) {
        let count = match self.repository.message_count(conversation.id).await {
            Ok(count) => count,
            Err(_) => return,
        };

        let rule = conversation.title_rule(count);
        if rule == TitleRule::Keep {
            return;
        }

        let first = match self.repository.messages(conversation.id).await {
            Ok(messages) => messages
                .into_iter()
                .find(|m| m.role == MessageRole::User)
                .map(|m| m.content)
                .unwrap_or_default(),
            Err(_) => return,
        };

        let title = match rule {
            TitleRule::Generate => self.generate_title(&first).await,
            _ => heuristic_title(&first),
        };

        if let Err(err) = self.repository.set_title(conversation.id, &title).await {
            tracing::warn!(conversation = %conversation.id, error = %err, "title update failed");
        }
    }

    async fn generate_title(&self, first_message: &str) -> String {
        let request = CompletionRequest::new()
            .with_message(ChatRole::User, prompts::title_prompt(first_message))
            .with_max_tokens(20);

        match self.gateway.complete(request).await {
            Ok(completion) => {
                let title = completion.response.content.trim().trim_matches('"').to_string();
                if title.is_empty() {
                    heuristic_title(first_message)
                } else {
                    title
                }
            }
            Err(_) => heuristic_title(first_message),
        }
    }
}

/// Reply text plus metadata destined for the assistant message.
struct Reply {
    content: String,
    metadata: Vec<(String, serde_json::Value)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockProvider;
    use crate::adapters::context::InMemoryContextStore;
    use crate::adapters::storage::{InMemoryClientStore, InMemoryConversationRepository};
    use crate::ports::ClientStore;

    struct Harness {
        orchestrator: ChatOrchestrator,
        clients: Arc<InMemoryClientStore>,
        context: Arc<InMemoryContextStore>,
        provider: Arc<MockProvider>,
    }

    fn harness() -> Harness {
        harness_with(Arc::new(MockProvider::new()))
    }

    fn harness_with(provider: Arc<MockProvider>) -> Harness {
        let clients = Arc::new(InMemoryClientStore::new());
        let context = Arc::new(InMemoryContextStore::new());
        let gateway = Arc::new(ProviderGateway::single(provider.clone()));
        let orchestrator = ChatOrchestrator::new(
            Arc::new(InMemoryConversationRepository::new()),
            context.clone(),
            IntentDetector::rules_only(),
            ClientActionExecutor::new(clients.clone()),
            gateway,
        );
        Harness {
            orchestrator,
            clients,
            context,
            provider,
        }
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    async fn start(harness: &Harness) -> Conversation {
        harness
            .orchestrator
            .create_conversation(&user(), ConversationType::Clients, None)
            .await
            .unwrap()
    }

    async fn say(harness: &Harness, conversation: &Conversation, content: &str) -> Message {
        harness
            .orchestrator
            .send_message(
                &user(),
                conversation.id,
                content,
                MessageRole::User,
                ChatOptions::default(),
            )
            .await
            .unwrap()
            .assistant_message
            .unwrap()
    }

    #[tokio::test]
    async fn complete_create_request_executes_in_one_turn() {
        let h = harness();
        let conversation = start(&h).await;

        let reply = say(
            &h,
            &conversation,
            "Create a client named John Smith with email john@example.com",
        )
        .await;

        assert!(reply.content.contains("Created client John Smith"));
        assert_eq!(
            h.clients.find_by_email("john@example.com").await.unwrap().unwrap().first_name,
            "John"
        );
        // Nothing pending afterwards.
        assert!(h.context.get(conversation.id).await.unwrap().is_none());
        // No completion backend was needed.
        assert_eq!(h.provider.requests_seen(), 0);
    }

    #[tokio::test]
    async fn partial_create_fills_slots_over_turns() {
        let h = harness();
        h.provider.set_default_content("What is their last name?");
        let conversation = start(&h).await;

        let reply = say(&h, &conversation, "Add a new client named Jane").await;
        assert_eq!(reply.metadata["requires_interaction"], true);
        let pending = h.context.get(conversation.id).await.unwrap().unwrap();
        assert_eq!(pending.partial[&crate::domain::intent::FieldKey::FirstName], "Jane");

        say(&h, &conversation, "Doe").await;
        let pending = h.context.get(conversation.id).await.unwrap().unwrap();
        assert_eq!(pending.missing, vec![crate::domain::intent::FieldKey::Email]);

        let reply = say(&h, &conversation, "jane@example.com").await;
        assert!(reply.content.contains("Created client Jane Doe"), "{}", reply.content);
        assert!(h.context.get(conversation.id).await.unwrap().is_none());
        assert!(h.clients.find_by_email("jane@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn followup_question_uses_template_when_generation_fails() {
        let h = harness();
        // Script empty and no default: every completion fails.
        let conversation = start(&h).await;

        let reply = say(&h, &conversation, "Add a new client named Jane").await;
        assert!(reply.content.contains("last name"), "{}", reply.content);
    }

    #[tokio::test]
    async fn general_message_goes_through_the_gateway() {
        let h = harness();
        h.provider.push_content("You can ask me about clients and projects.");
        let conversation = start(&h).await;

        let reply = say(&h, &conversation, "What can you do?").await;
        assert_eq!(reply.content, "You can ask me about clients and projects.");
        assert_eq!(reply.metadata["provider"], "mock");
        assert_eq!(reply.metadata["intent_type"], "none");
        assert!(reply.metadata.get("fallback").is_none());
    }

    #[tokio::test]
    async fn fallback_completion_is_flagged_in_metadata() {
        let primary = Arc::new(MockProvider::named("primary"));
        primary.push_error(crate::ports::AIError::unavailable("down"));
        let secondary = Arc::new(MockProvider::named("secondary"));
        secondary.push_content("rescued");

        let clients = Arc::new(InMemoryClientStore::new());
        let orchestrator = ChatOrchestrator::new(
            Arc::new(InMemoryConversationRepository::new()),
            Arc::new(InMemoryContextStore::new()),
            IntentDetector::rules_only(),
            ClientActionExecutor::new(clients),
            Arc::new(ProviderGateway::new(vec![primary, secondary])),
        );

        let conversation = orchestrator
            .create_conversation(&user(), ConversationType::General, None)
            .await
            .unwrap();
        let reply = orchestrator
            .send_message(&user(), conversation.id, "hello", MessageRole::User, ChatOptions::default())
            .await
            .unwrap()
            .assistant_message
            .unwrap();

        assert_eq!(reply.content, "rescued");
        assert_eq!(reply.metadata["fallback"], true);
        assert_eq!(reply.metadata["provider"], "secondary");
    }

    #[tokio::test]
    async fn total_backend_failure_returns_the_apology() {
        let h = harness();
        let conversation = start(&h).await;

        let reply = say(&h, &conversation, "tell me a joke").await;
        assert_eq!(reply.content, APOLOGY);
        assert_eq!(reply.metadata["error"], true);
    }

    #[tokio::test]
    async fn failed_action_leaves_pending_state_alone() {
        let h = harness();
        h.provider.set_default_content("What is their last name?");
        let conversation = start(&h).await;

        say(&h, &conversation, "Add a new client named Jane").await;
        let reply = say(&h, &conversation, "Find client nobody-here with client record").await;
        // An unrelated failed lookup must not wipe the in-flight creation.
        assert!(h.context.get(conversation.id).await.unwrap().is_some(), "{}", reply.content);
    }

    #[tokio::test]
    async fn conversation_gains_heuristic_title_past_transient_limit() {
        let h = harness();
        h.provider.set_default_content("ok");
        let conversation = start(&h).await;

        say(&h, &conversation, "first question").await;
        say(&h, &conversation, "second question").await;

        let (titled, _) = h.orchestrator.get_conversation(&user(), conversation.id).await.unwrap();
        assert_eq!(titled.title.as_deref(), Some("first question"));
    }

    #[tokio::test]
    async fn assistant_role_messages_persist_without_a_reply() {
        let h = harness();
        let conversation = start(&h).await;

        let exchange = h
            .orchestrator
            .send_message(
                &user(),
                conversation.id,
                "imported reply",
                MessageRole::Assistant,
                ChatOptions::default(),
            )
            .await
            .unwrap();

        assert!(exchange.assistant_message.is_none());
        assert_eq!(h.provider.requests_seen(), 0);
    }

    #[tokio::test]
    async fn messages_to_foreign_conversations_are_rejected() {
        let h = harness();
        let conversation = start(&h).await;

        let stranger = UserId::new("user-2").unwrap();
        let err = h
            .orchestrator
            .send_message(&stranger, conversation.id, "hi", MessageRole::User, ChatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::ConversationNotFound));
    }

    #[tokio::test]
    async fn delete_clears_pending_state() {
        let h = harness();
        h.provider.set_default_content("What is their last name?");
        let conversation = start(&h).await;

        say(&h, &conversation, "Add a new client named Jane").await;
        h.orchestrator.delete_conversation(&user(), conversation.id).await.unwrap();

        assert!(h.context.get(conversation.id).await.unwrap().is_none());
        assert!(matches!(
            h.orchestrator.get_conversation(&user(), conversation.id).await,
            Err(ChatError::ConversationNotFound)
        ));
    }
}
