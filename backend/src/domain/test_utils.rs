//! Test utilities for the stores
//!
//! Every helper builds over a fresh in-memory namespace, so tests never share
//! state and need no cleanup.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

use super::admin_store::AdminStore;
use super::catalog_store::CatalogStore;
use super::participant_store::ParticipantStore;
use super::session_store::{SessionStore, DEFAULT_ADMIN_EMAIL};
use crate::storage::{KeyValueStorage, MemoryStorage, Storage};
use shared::{LoginRequest, Payment, PaymentStatus, Pricing, User};

/// In-memory storage plus a handle over it, for inspecting raw entries
pub fn memory_storage() -> (MemoryStorage, Storage) {
    let memory = MemoryStorage::new();
    let storage = Storage::new(Arc::new(memory.clone()));
    (memory, storage)
}

/// Storage whose reads succeed (empty) and whose writes always fail
pub fn failing_storage() -> Storage {
    Storage::new(Arc::new(ReadOnlyStorage))
}

struct ReadOnlyStorage;

#[async_trait]
impl KeyValueStorage for ReadOnlyStorage {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, key: &str, _value: String) -> Result<()> {
        bail!("Storage is read-only, cannot write '{}'", key)
    }

    async fn set_many(&self, _entries: Vec<(String, String)>) -> Result<()> {
        bail!("Storage is read-only")
    }

    async fn remove(&self, key: &str) -> Result<()> {
        bail!("Storage is read-only, cannot remove '{}'", key)
    }

    async fn remove_many(&self, _keys: &[&str]) -> Result<()> {
        bail!("Storage is read-only")
    }

    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

pub fn payment(id: &str, user_id: &str, amount: f64, status: PaymentStatus) -> Payment {
    Payment {
        id: id.to_string(),
        user_id: user_id.to_string(),
        amount,
        currency: Pricing::CURRENCY.to_string(),
        status,
        method: None,
        description: None,
        bookings: None,
        transaction_id: None,
        paid_at: None,
        created_at: "2025-01-01T00:00:00Z".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

/// All four stores wired over one shared namespace
pub struct TestStores {
    pub memory: MemoryStorage,
    pub storage: Storage,
    pub session: SessionStore,
    pub catalog: CatalogStore,
    pub participant: ParticipantStore,
    pub admin: AdminStore,
}

impl TestStores {
    pub fn new() -> Self {
        let (memory, storage) = memory_storage();
        let session = SessionStore::new(storage.clone());
        let catalog = CatalogStore::new(storage.clone(), session.clone());
        let participant = ParticipantStore::new(storage.clone(), session.clone());
        let admin = AdminStore::new(storage.clone(), session.clone(), catalog.clone());

        Self {
            memory,
            storage,
            session,
            catalog,
            participant,
            admin,
        }
    }

    pub async fn login_user(&self, email: &str) -> User {
        self.login(email).await
    }

    pub async fn login_admin(&self) -> User {
        self.login(DEFAULT_ADMIN_EMAIL).await
    }

    /// Log out and drop cached data, as the backend facade does
    pub async fn logout(&self) {
        self.session.logout().await;
        self.participant.clear_data().await;
        self.admin.clear_data().await;
    }

    async fn login(&self, email: &str) -> User {
        self.session
            .login(LoginRequest {
                email: email.to_string(),
                password: None,
            })
            .await
            .expect("login request should be valid")
            .expect("login should persist")
    }
}
