//! Client action executor.
//!
//! Turns a classified client-management intent into store calls. Outcomes
//! are a tagged enum: completed with data, needs more input, or failed with
//! a user-facing message. Store failures never leak raw errors into chat;
//! they are logged and reported as a generic failure.

use std::sync::Arc;

use crate::domain::client::{ClientId, ClientRecord, ClientStatus, NewClient};
use crate::domain::foundation::UserId;
use crate::domain::intent::{FieldKey, FieldMap, Intent, IntentAction};
use crate::ports::{ClientFilters, ClientStore, ClientStoreError, ClientUpdate};

/// Shown whenever the store fails for reasons the user cannot fix.
const GENERIC_FAILURE: &str =
    "Something went wrong while working with your clients. Please try again.";

/// What an executed action produced.
#[derive(Debug, Clone)]
pub enum ActionData {
    /// A single record (create, read, update, delete).
    Client(ClientRecord),
    /// Zero or more records (list).
    Clients(Vec<ClientRecord>),
}

/// Result of executing one client-management intent.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// The action completed.
    Done {
        action: IntentAction,
        data: ActionData,
    },
    /// Required fields are missing; the caller should ask for them.
    NeedsInput {
        missing: Vec<FieldKey>,
        partial: FieldMap,
    },
    /// The action could not complete; `message` is shown to the user verbatim.
    Failed { message: String },
}

impl ActionOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// How an existing record was (or was not) located from extracted fields.
enum Resolution {
    Found(ClientRecord),
    NotFound,
    NoIdentifier,
}

/// Executes client CRUD intents against the store.
pub struct ClientActionExecutor {
    store: Arc<dyn ClientStore>,
}

impl ClientActionExecutor {
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self { store }
    }

    /// Executes the intent using `fields`, which the caller has already
    /// merged with any pending slot-filling state.
    pub async fn execute(
        &self,
        intent: &Intent,
        fields: &FieldMap,
        owner: &UserId,
    ) -> ActionOutcome {
        let result = match intent.action {
            IntentAction::Create => self.create(fields, owner).await,
            IntentAction::Read => self.read(fields).await,
            IntentAction::Update => self.update(fields).await,
            IntentAction::Delete => self.delete(fields).await,
            IntentAction::List => self.list(fields).await,
            _ => Ok(ActionOutcome::failed(
                "I can create, look up, update, delete, or list clients. \
                 What would you like to do?",
            )),
        };

        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(action = intent.action.as_str(), error = %err, "client action failed");
                ActionOutcome::failed(GENERIC_FAILURE)
            }
        }
    }

    async fn create(&self, fields: &FieldMap, owner: &UserId) -> Result<ActionOutcome, ClientStoreError> {
        let new_client = match NewClient::from_fields(fields) {
            Ok(new_client) => new_client,
            Err(missing) => {
                return Ok(ActionOutcome::NeedsInput {
                    missing,
                    partial: fields.clone(),
                });
            }
        };

        match self.store.insert(new_client, owner).await {
            Ok(record) => Ok(ActionOutcome::Done {
                action: IntentAction::Create,
                data: ActionData::Client(record),
            }),
            Err(ClientStoreError::DuplicateEmail { email, existing }) => {
                Ok(ActionOutcome::failed(format!(
                    "A client with the email {email} already exists: {} (#{}).",
                    existing.full_name(),
                    existing.id
                )))
            }
            Err(err) => Err(err),
        }
    }

    async fn read(&self, fields: &FieldMap) -> Result<ActionOutcome, ClientStoreError> {
        match self.resolve(fields).await? {
            Resolution::Found(record) => Ok(ActionOutcome::Done {
                action: IntentAction::Read,
                data: ActionData::Client(record),
            }),
            Resolution::NotFound => Ok(ActionOutcome::failed(
                "I couldn't find a client matching that.",
            )),
            Resolution::NoIdentifier => Ok(ActionOutcome::failed(
                "Which client should I look up? Give me a name, email, or id.",
            )),
        }
    }

    async fn update(&self, fields: &FieldMap) -> Result<ActionOutcome, ClientStoreError> {
        let record = match self.resolve(fields).await? {
            Resolution::Found(record) => record,
            Resolution::NotFound => {
                return Ok(ActionOutcome::failed("I couldn't find a client matching that."));
            }
            Resolution::NoIdentifier => {
                return Ok(ActionOutcome::failed(
                    "Which client should I update? Give me a name, email, or id.",
                ));
            }
        };

        let update = build_update(fields);
        if update.is_empty() {
            return Ok(ActionOutcome::failed(format!(
                "What should I change about {}?",
                record.full_name()
            )));
        }

        let updated = self.store.update(record.id, update).await?;
        Ok(ActionOutcome::Done {
            action: IntentAction::Update,
            data: ActionData::Client(updated),
        })
    }

    async fn delete(&self, fields: &FieldMap) -> Result<ActionOutcome, ClientStoreError> {
        let record = match self.resolve(fields).await? {
            Resolution::Found(record) => record,
            Resolution::NotFound => {
                return Ok(ActionOutcome::failed("I couldn't find a client matching that."));
            }
            Resolution::NoIdentifier => {
                return Ok(ActionOutcome::failed(
                    "Which client should I delete? Give me a name, email, or id.",
                ));
            }
        };

        let removed = self.store.delete(record.id).await?;
        Ok(ActionOutcome::Done {
            action: IntentAction::Delete,
            data: ActionData::Client(removed),
        })
    }

    async fn list(&self, fields: &FieldMap) -> Result<ActionOutcome, ClientStoreError> {
        let filters = ClientFilters {
            status: fields.get(&FieldKey::Status).and_then(|s| ClientStatus::parse(s)),
            industry: fields.get(&FieldKey::Industry).cloned(),
            search: fields.get(&FieldKey::Company).cloned(),
        };

        let records = self.store.list(filters).await?;
        Ok(ActionOutcome::Done {
            action: IntentAction::List,
            data: ActionData::Clients(records),
        })
    }

    /// Locates an existing record: numeric id first, then exact email, then
    /// a substring search over name and company. The first search hit wins.
    async fn resolve(&self, fields: &FieldMap) -> Result<Resolution, ClientStoreError> {
        if let Some(id) = fields.get(&FieldKey::Id).and_then(|v| v.parse::<ClientId>().ok()) {
            return Ok(match self.store.find_by_id(id).await? {
                Some(record) => Resolution::Found(record),
                None => Resolution::NotFound,
            });
        }

        if let Some(email) = fields.get(&FieldKey::Email) {
            if let Some(record) = self.store.find_by_email(email).await? {
                return Ok(Resolution::Found(record));
            }
            // An email that matches nothing still counts as an attempt to
            // identify; fall through to a name search if one is possible.
        }

        let term = search_term(fields);
        let Some(term) = term else {
            return Ok(if fields.contains_key(&FieldKey::Email) {
                Resolution::NotFound
            } else {
                Resolution::NoIdentifier
            });
        };

        Ok(match self.store.search(&term).await?.into_iter().next() {
            Some(record) => Resolution::Found(record),
            None => Resolution::NotFound,
        })
    }
}

/// Builds the search term from extracted name or company fields.
fn search_term(fields: &FieldMap) -> Option<String> {
    match (fields.get(&FieldKey::FirstName), fields.get(&FieldKey::LastName)) {
        (Some(first), Some(last)) => return Some(format!("{first} {last}")),
        (Some(first), None) => return Some(first.clone()),
        _ => {}
    }
    fields.get(&FieldKey::Company).cloned()
}

/// Collects updatable fields. The record id never updates, and a lone name
/// used to identify the record is not treated as a change.
fn build_update(fields: &FieldMap) -> ClientUpdate {
    ClientUpdate {
        first_name: None,
        last_name: None,
        email: fields.get(&FieldKey::Email).cloned(),
        phone: fields.get(&FieldKey::Phone).cloned(),
        company: fields.get(&FieldKey::Company).cloned(),
        industry: fields.get(&FieldKey::Industry).cloned(),
        status: fields.get(&FieldKey::Status).and_then(|s| ClientStatus::parse(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryClientStore;
    use crate::domain::intent::IntentType;

    fn owner() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn intent(action: IntentAction) -> Intent {
        Intent::new(IntentType::Client, action, 0.9, FieldMap::new(), "m")
    }

    fn fields(pairs: &[(FieldKey, &str)]) -> FieldMap {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    async fn executor_with_jane() -> (ClientActionExecutor, ClientRecord) {
        let store = Arc::new(InMemoryClientStore::new());
        let record = store
            .insert(
                NewClient {
                    first_name: "Jane".to_string(),
                    last_name: "Doe".to_string(),
                    email: "jane@example.com".to_string(),
                    phone: None,
                    company: Some("Acme Corp".to_string()),
                    industry: None,
                    status: ClientStatus::Active,
                },
                &owner(),
            )
            .await
            .unwrap();
        (ClientActionExecutor::new(store), record)
    }

    #[tokio::test]
    async fn create_with_complete_fields_succeeds() {
        let store = Arc::new(InMemoryClientStore::new());
        let executor = ClientActionExecutor::new(store);

        let outcome = executor
            .execute(
                &intent(IntentAction::Create),
                &fields(&[
                    (FieldKey::FirstName, "John"),
                    (FieldKey::LastName, "Smith"),
                    (FieldKey::Email, "john@example.com"),
                ]),
                &owner(),
            )
            .await;

        match outcome {
            ActionOutcome::Done {
                action: IntentAction::Create,
                data: ActionData::Client(record),
            } => assert_eq!(record.full_name(), "John Smith"),
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_with_missing_fields_needs_input() {
        let store = Arc::new(InMemoryClientStore::new());
        let executor = ClientActionExecutor::new(store);

        let outcome = executor
            .execute(
                &intent(IntentAction::Create),
                &fields(&[(FieldKey::Email, "john@example.com")]),
                &owner(),
            )
            .await;

        match outcome {
            ActionOutcome::NeedsInput { missing, partial } => {
                assert_eq!(missing, vec![FieldKey::FirstName, FieldKey::LastName]);
                assert_eq!(partial.get(&FieldKey::Email).unwrap(), "john@example.com");
            }
            other => panic!("expected NeedsInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_create_fails_naming_the_existing_record() {
        let (executor, _) = executor_with_jane().await;

        let outcome = executor
            .execute(
                &intent(IntentAction::Create),
                &fields(&[
                    (FieldKey::FirstName, "Janet"),
                    (FieldKey::LastName, "Doherty"),
                    (FieldKey::Email, "jane@example.com"),
                ]),
                &owner(),
            )
            .await;

        match outcome {
            ActionOutcome::Failed { message } => {
                assert!(message.contains("jane@example.com"));
                assert!(message.contains("Jane Doe"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_resolves_by_id_email_and_name() {
        let (executor, record) = executor_with_jane().await;

        for identifier in [
            fields(&[(FieldKey::Id, "1")]),
            fields(&[(FieldKey::Email, "jane@example.com")]),
            fields(&[(FieldKey::FirstName, "Jane"), (FieldKey::LastName, "Doe")]),
            fields(&[(FieldKey::Company, "Acme")]),
        ] {
            let outcome = executor
                .execute(&intent(IntentAction::Read), &identifier, &owner())
                .await;
            match outcome {
                ActionOutcome::Done {
                    data: ActionData::Client(found),
                    ..
                } => assert_eq!(found.id, record.id),
                other => panic!("expected Done for {identifier:?}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn read_without_identifier_asks_for_one() {
        let (executor, _) = executor_with_jane().await;
        let outcome = executor
            .execute(&intent(IntentAction::Read), &FieldMap::new(), &owner())
            .await;
        assert!(matches!(outcome, ActionOutcome::Failed { message } if message.contains("Which client")));
    }

    #[tokio::test]
    async fn update_applies_extracted_changes() {
        let (executor, _) = executor_with_jane().await;

        let outcome = executor
            .execute(
                &intent(IntentAction::Update),
                &fields(&[(FieldKey::Id, "1"), (FieldKey::Phone, "555-123-4567")]),
                &owner(),
            )
            .await;

        match outcome {
            ActionOutcome::Done {
                data: ActionData::Client(updated),
                ..
            } => assert_eq!(updated.phone.as_deref(), Some("555-123-4567")),
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_without_changes_asks_what_to_change() {
        let (executor, _) = executor_with_jane().await;
        let outcome = executor
            .execute(
                &intent(IntentAction::Update),
                &fields(&[(FieldKey::Id, "1")]),
                &owner(),
            )
            .await;
        assert!(matches!(outcome, ActionOutcome::Failed { message } if message.contains("Jane Doe")));
    }

    #[tokio::test]
    async fn delete_returns_the_removed_record() {
        let (executor, record) = executor_with_jane().await;

        let outcome = executor
            .execute(
                &intent(IntentAction::Delete),
                &fields(&[(FieldKey::FirstName, "Jane")]),
                &owner(),
            )
            .await;

        match outcome {
            ActionOutcome::Done {
                action: IntentAction::Delete,
                data: ActionData::Client(removed),
            } => assert_eq!(removed.id, record.id),
            other => panic!("expected Done, got {other:?}"),
        }

        let outcome = executor
            .execute(&intent(IntentAction::Read), &fields(&[(FieldKey::Id, "1")]), &owner())
            .await;
        assert!(matches!(outcome, ActionOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn list_applies_status_filter() {
        let (executor, _) = executor_with_jane().await;

        let outcome = executor
            .execute(
                &intent(IntentAction::List),
                &fields(&[(FieldKey::Status, "lead")]),
                &owner(),
            )
            .await;

        match outcome {
            ActionOutcome::Done {
                data: ActionData::Clients(records),
                ..
            } => assert!(records.is_empty()),
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsupported_action_fails_gracefully() {
        let (executor, _) = executor_with_jane().await;
        let outcome = executor
            .execute(&intent(IntentAction::Analyze), &FieldMap::new(), &owner())
            .await;
        assert!(matches!(outcome, ActionOutcome::Failed { .. }));
    }
}
