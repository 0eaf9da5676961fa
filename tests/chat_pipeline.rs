//! Integration tests for the chat pipeline.
//!
//! These tests drive the orchestrator end to end over in-memory adapters:
//! classification, slot filling, client CRUD, the general completion path
//! with provider fallback, and slot-state expiry.

use std::sync::Arc;

use taskpilot_assistant::adapters::ai::{MockProvider, ProviderGateway};
use taskpilot_assistant::adapters::context::InMemoryContextStore;
use taskpilot_assistant::adapters::storage::{InMemoryClientStore, InMemoryConversationRepository};
use taskpilot_assistant::application::chat::{
    AiIntentClassifier, ChatOptions, ChatOrchestrator, ClientActionExecutor, IntentDetector,
    APOLOGY,
};
use taskpilot_assistant::domain::conversation::{Conversation, ConversationType, Message, MessageRole};
use taskpilot_assistant::domain::foundation::{Timestamp, UserId};
use taskpilot_assistant::domain::intent::{FieldKey, FieldMap, PendingSlotState};
use taskpilot_assistant::ports::{AIError, ClientStore, ContextStore};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Pipeline {
    orchestrator: ChatOrchestrator,
    clients: Arc<InMemoryClientStore>,
    context: Arc<InMemoryContextStore>,
    provider: Arc<MockProvider>,
}

/// Pipeline with the rule-based tier only; the mock provider still backs
/// the general path and question generation.
fn rules_pipeline() -> Pipeline {
    let provider = Arc::new(MockProvider::new());
    build(provider.clone(), IntentDetector::rules_only())
}

/// Pipeline with the AI tier in front, scripted through the same provider.
fn ai_pipeline() -> Pipeline {
    let provider = Arc::new(MockProvider::new());
    let gateway = Arc::new(ProviderGateway::single(provider.clone()));
    let detector = IntentDetector::new(Arc::new(AiIntentClassifier::new(gateway)));
    build(provider, detector)
}

fn build(provider: Arc<MockProvider>, detector: IntentDetector) -> Pipeline {
    let clients = Arc::new(InMemoryClientStore::new());
    let context = Arc::new(InMemoryContextStore::new());
    let orchestrator = ChatOrchestrator::new(
        Arc::new(InMemoryConversationRepository::new()),
        context.clone(),
        detector,
        ClientActionExecutor::new(clients.clone()),
        Arc::new(ProviderGateway::single(provider.clone())),
    );
    Pipeline {
        orchestrator,
        clients,
        context,
        provider,
    }
}

fn user() -> UserId {
    UserId::new("user-1").unwrap()
}

async fn start(pipeline: &Pipeline, conversation_type: ConversationType) -> Conversation {
    pipeline
        .orchestrator
        .create_conversation(&user(), conversation_type, None)
        .await
        .unwrap()
}

async fn say(pipeline: &Pipeline, conversation: &Conversation, content: &str) -> Message {
    pipeline
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

/// Persists an assistant-role message directly, without running the
/// pipeline or the titling pass.
async fn import_reply(pipeline: &Pipeline, conversation: &Conversation, content: &str) {
    pipeline
        .orchestrator
        .send_message(
            &user(),
            conversation.id,
            content,
            MessageRole::Assistant,
            ChatOptions::default(),
        )
        .await
        .unwrap();
}

// =============================================================================
// Client actions through chat
// =============================================================================

#[tokio::test]
async fn one_shot_client_creation() {
    let pipeline = rules_pipeline();
    let conversation = start(&pipeline, ConversationType::Clients).await;

    let reply = say(
        &pipeline,
        &conversation,
        "Create a client named John Smith with email john@example.com",
    )
    .await;

    assert!(reply.content.contains("Created client John Smith"), "{}", reply.content);
    let record = pipeline
        .clients
        .find_by_email("john@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.first_name, "John");
    assert_eq!(record.last_name, "Smith");
    assert_eq!(record.owner, user());
    // No completion backend involved.
    assert_eq!(pipeline.provider.requests_seen(), 0);
}

#[tokio::test]
async fn slot_filling_conversation_creates_the_client() {
    let pipeline = rules_pipeline();
    pipeline.provider.set_default_content("And their last name?");
    let conversation = start(&pipeline, ConversationType::Clients).await;

    // Turn 1: only the first name is extractable.
    let reply = say(&pipeline, &conversation, "Add a new client called Maria").await;
    assert_eq!(reply.metadata["requires_interaction"], true);

    let pending = pipeline.context.get(conversation.id).await.unwrap().unwrap();
    assert_eq!(pending.partial[&FieldKey::FirstName], "Maria");
    assert_eq!(pending.missing, vec![FieldKey::LastName, FieldKey::Email]);

    // Turn 2: bare answer fills the requested field.
    say(&pipeline, &conversation, "Santos").await;
    let pending = pipeline.context.get(conversation.id).await.unwrap().unwrap();
    assert_eq!(pending.partial[&FieldKey::LastName], "Santos");
    assert_eq!(pending.missing, vec![FieldKey::Email]);

    // Turn 3: last field completes the record.
    let reply = say(&pipeline, &conversation, "maria@santos.dev").await;
    assert!(reply.content.contains("Created client Maria Santos"), "{}", reply.content);
    assert!(pipeline.context.get(conversation.id).await.unwrap().is_none());
    assert!(pipeline
        .clients
        .find_by_email("maria@santos.dev")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn canned_question_names_remaining_fields_when_generation_is_down() {
    let pipeline = rules_pipeline();
    // No script, no default: the question generator fails over to the template.
    let conversation = start(&pipeline, ConversationType::Clients).await;

    let reply = say(&pipeline, &conversation, "Add a new client called Maria").await;
    assert!(reply.content.contains("last name"), "{}", reply.content);
    assert!(reply.content.contains("email address"), "{}", reply.content);
}

#[tokio::test]
async fn duplicate_email_reports_the_existing_client() {
    let pipeline = rules_pipeline();
    let conversation = start(&pipeline, ConversationType::Clients).await;

    say(
        &pipeline,
        &conversation,
        "Create a client named John Smith with email john@example.com",
    )
    .await;
    let reply = say(
        &pipeline,
        &conversation,
        "Create a client named Johnny Smythe with email john@example.com",
    )
    .await;

    assert!(reply.content.contains("already exists"), "{}", reply.content);
    assert!(reply.content.contains("John Smith"), "{}", reply.content);
    // Still exactly one record.
    assert_eq!(pipeline.clients.search("Smith").await.unwrap().len(), 1);
}

#[tokio::test]
async fn lookup_and_delete_round_trip() {
    let pipeline = rules_pipeline();
    let conversation = start(&pipeline, ConversationType::Clients).await;

    say(
        &pipeline,
        &conversation,
        "Create a client named John Smith with email john@example.com",
    )
    .await;

    let reply = say(&pipeline, &conversation, "Show me the client john@example.com").await;
    assert!(reply.content.contains("John Smith"), "{}", reply.content);
    assert!(reply.content.contains("john@example.com"), "{}", reply.content);

    let reply = say(&pipeline, &conversation, "Delete the client john@example.com").await;
    assert!(reply.content.contains("Deleted client John Smith"), "{}", reply.content);
    assert!(pipeline
        .clients
        .find_by_email("john@example.com")
        .await
        .unwrap()
        .is_none());
}

// =============================================================================
// General path and provider fallback
// =============================================================================

#[tokio::test]
async fn general_questions_are_answered_by_the_model() {
    let pipeline = rules_pipeline();
    pipeline
        .provider
        .push_content("You can manage clients, projects, and more.");
    let conversation = start(&pipeline, ConversationType::General).await;

    let reply = say(&pipeline, &conversation, "What can you help me with?").await;
    assert_eq!(reply.content, "You can manage clients, projects, and more.");
    assert_eq!(reply.metadata["provider"], "mock");
    assert_eq!(reply.metadata["intent_type"], "none");
}

#[tokio::test]
async fn secondary_backend_rescues_the_reply_and_is_flagged() {
    let primary = Arc::new(MockProvider::named("primary"));
    primary.push_error(AIError::unavailable("503"));
    let secondary = Arc::new(MockProvider::named("secondary"));
    secondary.push_content("rescued reply");

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

    assert_eq!(reply.content, "rescued reply");
    assert_eq!(reply.metadata["fallback"], true);
    assert_eq!(reply.metadata["provider"], "secondary");
}

#[tokio::test]
async fn exhausted_backends_produce_the_apology() {
    let pipeline = rules_pipeline();
    let conversation = start(&pipeline, ConversationType::General).await;

    let reply = say(&pipeline, &conversation, "tell me something").await;
    assert_eq!(reply.content, APOLOGY);
    assert_eq!(reply.metadata["error"], true);
}

// =============================================================================
// AI classification tier
// =============================================================================

#[tokio::test]
async fn confident_ai_classification_drives_the_action() {
    let pipeline = ai_pipeline();
    pipeline.provider.push_content(
        r#"{"intent": {"type": "client", "action": "create", "confidence": 0.93,
            "entities": {"first_name": "Ana", "last_name": "Reyes",
                         "email": "ana@reyes.io"}}}"#,
    );
    let conversation = start(&pipeline, ConversationType::Clients).await;

    let reply = say(
        &pipeline,
        &conversation,
        "please onboard Ana Reyes, her address is ana@reyes.io",
    )
    .await;

    assert!(reply.content.contains("Created client Ana Reyes"), "{}", reply.content);
    assert!(pipeline.clients.find_by_email("ana@reyes.io").await.unwrap().is_some());
}

#[tokio::test]
async fn classifier_outage_falls_back_to_rules() {
    let pipeline = ai_pipeline();
    // Classification call fails; the rules still recognize the message.
    pipeline.provider.push_error(AIError::Timeout { timeout_secs: 30 });
    let conversation = start(&pipeline, ConversationType::Clients).await;

    let reply = say(
        &pipeline,
        &conversation,
        "Create a client named John Smith with email john@example.com",
    )
    .await;
    assert!(reply.content.contains("Created client John Smith"), "{}", reply.content);
}

// =============================================================================
// Slot-state expiry
// =============================================================================

#[tokio::test]
async fn expired_slot_state_is_ignored() {
    let pipeline = rules_pipeline();
    pipeline.provider.set_default_content("general reply");
    let conversation = start(&pipeline, ConversationType::Clients).await;

    // Plant state stored 301 seconds ago, just past the 300s window.
    let mut partial = FieldMap::new();
    partial.insert(FieldKey::FirstName, "Maria".to_string());
    let mut state = PendingSlotState::new(
        conversation.id,
        vec![FieldKey::LastName, FieldKey::Email],
        partial,
    );
    state.created_at = Timestamp::now().add_secs(-301);
    pipeline.context.put(state).await.unwrap();

    // A bare answer no longer counts as a continuation.
    let reply = say(&pipeline, &conversation, "Santos").await;
    assert_eq!(reply.content, "general reply");
    assert_eq!(reply.metadata["intent_type"], "none");
    assert!(pipeline.context.get(conversation.id).await.unwrap().is_none());
}

// =============================================================================
// Conversation lifecycle
// =============================================================================

#[tokio::test]
async fn conversations_become_visible_and_titled_as_they_grow() {
    let pipeline = rules_pipeline();
    pipeline.provider.set_default_content("sure");
    let conversation = start(&pipeline, ConversationType::General).await;

    // Two messages: still transient, hidden, untitled.
    say(&pipeline, &conversation, "plan my week").await;
    let listed = pipeline
        .orchestrator
        .list_conversations(&user(), None, 10)
        .await
        .unwrap();
    assert!(listed.is_empty());

    // Four messages: visible and titled from the first message.
    say(&pipeline, &conversation, "and my month").await;
    let listed = pipeline
        .orchestrator
        .list_conversations(&user(), None, 10)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title.as_deref(), Some("plan my week"));
}

#[tokio::test]
async fn long_conversations_receive_a_generated_title() {
    let pipeline = rules_pipeline();
    let conversation = start(&pipeline, ConversationType::General).await;

    // Imported assistant messages grow the conversation past the generation
    // threshold while leaving it untitled.
    for note in ["one", "two", "three", "four"] {
        import_reply(&pipeline, &conversation, note).await;
    }

    // First completion answers the message, second names the conversation.
    pipeline.provider.push_content("Happy to help with outreach.");
    pipeline.provider.push_content("\"Client outreach planning\"");

    say(&pipeline, &conversation, "help me plan outreach for the quarter").await;

    let (titled, _) = pipeline
        .orchestrator
        .get_conversation(&user(), conversation.id)
        .await
        .unwrap();
    assert_eq!(titled.title.as_deref(), Some("Client outreach planning"));
}

#[tokio::test]
async fn failed_title_generation_falls_back_to_heuristic() {
    let pipeline = rules_pipeline();
    let conversation = start(&pipeline, ConversationType::General).await;

    for note in ["one", "two", "three", "four"] {
        import_reply(&pipeline, &conversation, note).await;
    }

    // The reply succeeds but the title request does not.
    pipeline.provider.push_content("Happy to help with outreach.");
    pipeline.provider.push_error(AIError::unavailable("503"));

    say(&pipeline, &conversation, "help me plan outreach for the quarter").await;

    let (titled, _) = pipeline
        .orchestrator
        .get_conversation(&user(), conversation.id)
        .await
        .unwrap();
    // Never left untitled past the threshold.
    assert_eq!(titled.title.as_deref(), Some("help me plan outreach for the quarter"));
}
