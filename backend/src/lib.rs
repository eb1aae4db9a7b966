//! # Studio Backend
//!
//! Client-side data layer for a studio-management application: sessions, the
//! class catalog, participants with their bookings and payments, and
//! administration reporting. Everything persists through a key-value storage
//! port, so a network-backed implementation can replace local storage with the
//! same call signatures.

use anyhow::Result;
use log::info;
use std::sync::Arc;

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

pub use config::{Locale, StudioConfig};
pub use domain::{AdminStore, CatalogStore, ParticipantStore, SessionStore, StoreError, StoreResult};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, Storage};

/// Main backend struct that wires every store over one storage namespace
#[derive(Clone)]
pub struct Backend {
    pub config: StudioConfig,
    pub session: SessionStore,
    pub catalog: CatalogStore,
    pub participant: ParticipantStore,
    pub admin: AdminStore,
}

impl Backend {
    /// Create a backend over an existing storage handle
    pub fn new(config: StudioConfig, storage: Storage) -> Self {
        let session = SessionStore::with_admin_email(storage.clone(), config.admin_email.clone());
        let catalog = CatalogStore::new(storage.clone(), session.clone());
        let participant = ParticipantStore::new(storage.clone(), session.clone());
        let admin = AdminStore::new(storage, session.clone(), catalog.clone())
            .with_financial_window(config.financial_window_days);

        Backend {
            config,
            session,
            catalog,
            participant,
            admin,
        }
    }

    /// Create a backend persisting to the configured data directory
    pub fn open(config: StudioConfig) -> Result<Self> {
        let file_storage = FileStorage::open(&config.data_directory)?;
        info!("Using storage at {:?}", file_storage.path());
        Ok(Self::new(config, Storage::new(Arc::new(file_storage))))
    }

    /// Restore the persisted session and load what every visitor sees
    pub async fn start(&self) {
        self.session.restore_session().await;
        self.catalog.load_groups().await;
        self.catalog.load_schedule().await;
    }

    /// End the session and drop every account's cached data
    pub async fn logout(&self) {
        self.session.logout().await;
        self.participant.clear_data().await;
        self.admin.clear_data().await;
    }

    /// Check a route against the current session
    pub async fn navigate(&self, path: &str) -> io::Navigation {
        io::resolve(path, &self.session.snapshot().await)
    }
}
