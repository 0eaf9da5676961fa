//! In-memory client store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::client::{ClientId, ClientRecord, NewClient};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{ClientFilters, ClientStore, ClientStoreError, ClientUpdate};

/// HashMap-backed client store with sequential numeric ids.
#[derive(Debug, Default)]
pub struct InMemoryClientStore {
    records: Arc<RwLock<HashMap<ClientId, ClientRecord>>>,
    next_id: AtomicU64,
}

impl InMemoryClientStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }
}

fn matches_term(record: &ClientRecord, term: &str) -> bool {
    let term = term.to_lowercase();
    record.full_name().to_lowercase().contains(&term)
        || record.email.to_lowercase().contains(&term)
        || record
            .company
            .as_deref()
            .map(|c| c.to_lowercase().contains(&term))
            .unwrap_or(false)
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn insert(
        &self,
        client: NewClient,
        owner: &UserId,
    ) -> Result<ClientRecord, ClientStoreError> {
        let mut records = self.records.write().await;

        let email_lowered = client.email.to_lowercase();
        if let Some(existing) = records
            .values()
            .find(|r| r.email.to_lowercase() == email_lowered)
        {
            return Err(ClientStoreError::DuplicateEmail {
                email: client.email,
                existing: Box::new(existing.clone()),
            });
        }

        let record = ClientRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            owner: owner.clone(),
            first_name: client.first_name,
            last_name: client.last_name,
            email: client.email,
            phone: client.phone,
            company: client.company,
            industry: client.industry,
            status: client.status,
            created_at: Timestamp::now(),
        };
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: ClientId) -> Result<Option<ClientRecord>, ClientStoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<ClientRecord>, ClientStoreError> {
        let email = email.to_lowercase();
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| r.email.to_lowercase() == email)
            .cloned())
    }

    async fn search(&self, term: &str) -> Result<Vec<ClientRecord>, ClientStoreError> {
        let mut matches: Vec<ClientRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| matches_term(r, term))
            .cloned()
            .collect();
        matches.sort_by_key(|r| r.id);
        Ok(matches)
    }

    async fn update(
        &self,
        id: ClientId,
        update: ClientUpdate,
    ) -> Result<ClientRecord, ClientStoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(ClientStoreError::NotFound(id))?;

        if let Some(first_name) = update.first_name {
            record.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            record.last_name = last_name;
        }
        if let Some(email) = update.email {
            record.email = email;
        }
        if let Some(phone) = update.phone {
            record.phone = Some(phone);
        }
        if let Some(company) = update.company {
            record.company = Some(company);
        }
        if let Some(industry) = update.industry {
            record.industry = Some(industry);
        }
        if let Some(status) = update.status {
            record.status = status;
        }
        Ok(record.clone())
    }

    async fn delete(&self, id: ClientId) -> Result<ClientRecord, ClientStoreError> {
        self.records
            .write()
            .await
            .remove(&id)
            .ok_or(ClientStoreError::NotFound(id))
    }

    async fn list(&self, filters: ClientFilters) -> Result<Vec<ClientRecord>, ClientStoreError> {
        let records = self.records.read().await;
        let mut matches: Vec<ClientRecord> = records
            .values()
            .filter(|r| filters.status.map(|s| r.status == s).unwrap_or(true))
            .filter(|r| {
                filters
                    .industry
                    .as_deref()
                    .map(|industry| {
                        r.industry
                            .as_deref()
                            .map(|i| i.eq_ignore_ascii_case(industry))
                            .unwrap_or(false)
                    })
                    .unwrap_or(true)
            })
            .filter(|r| filters.search.as_deref().map(|t| matches_term(r, t)).unwrap_or(true))
            .cloned()
            .collect();
        matches.sort_by_key(|r| r.id);
        Ok(matches)
    }
}
