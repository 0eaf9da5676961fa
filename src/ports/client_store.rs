//! Client Store Port - the entity store consumed by the action executor.
//!
//! The real persistence layer lives in the platform's CRUD modules; this
//! port specifies only what the chat core needs: email-unique creation,
//! numeric id lookup, fuzzy search, partial update, delete, filtered list.

use async_trait::async_trait;

use crate::domain::client::{ClientId, ClientRecord, ClientStatus, NewClient};
use crate::domain::foundation::UserId;

/// Port over the client entity store.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Inserts a new client owned by `owner`. Fails with
    /// [`ClientStoreError::DuplicateEmail`] carrying the existing record if
    /// the email is already taken.
    async fn insert(&self, client: NewClient, owner: &UserId) -> Result<ClientRecord, ClientStoreError>;

    /// Looks up by numeric id.
    async fn find_by_id(&self, id: ClientId) -> Result<Option<ClientRecord>, ClientStoreError>;

    /// Looks up by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<ClientRecord>, ClientStoreError>;

    /// Case-insensitive substring search over name and company.
    async fn search(&self, term: &str) -> Result<Vec<ClientRecord>, ClientStoreError>;

    /// Applies a partial update.
    async fn update(&self, id: ClientId, update: ClientUpdate) -> Result<ClientRecord, ClientStoreError>;

    /// Deletes a record, returning it.
    async fn delete(&self, id: ClientId) -> Result<ClientRecord, ClientStoreError>;

    /// Lists records matching the filters.
    async fn list(&self, filters: ClientFilters) -> Result<Vec<ClientRecord>, ClientStoreError>;
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub status: Option<ClientStatus>,
}

impl ClientUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.industry.is_none()
            && self.status.is_none()
    }
}

/// Listing filters; all optional and combined with AND.
#[derive(Debug, Clone, Default)]
pub struct ClientFilters {
    pub status: Option<ClientStatus>,
    pub industry: Option<String>,
    /// Free-text substring over name, email and company.
    pub search: Option<String>,
}

/// Client store errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientStoreError {
    /// A record with this email already exists; carries it so callers can
    /// report the collision without a second lookup.
    #[error("client with email {email} already exists")]
    DuplicateEmail {
        email: String,
        existing: Box<ClientRecord>,
    },

    /// No record matched the identifier.
    #[error("client {0} not found")]
    NotFound(ClientId),

    /// Store infrastructure failure.
    #[error("client store unavailable: {0}")]
    Unavailable(String),
}
