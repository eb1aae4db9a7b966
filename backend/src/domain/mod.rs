//! # Domain Module
//!
//! The four stores that make up the studio data layer, plus the pieces they
//! share:
//!
//! - **SessionStore**: current identity and token, injected into every other store
//! - **CatalogStore**: class groups and the weekly schedule
//! - **ParticipantStore**: the signed-in account's participants, bookings, payments
//! - **AdminStore**: cross-account views and reporting, composed over session and catalog
//!
//! Each store is cheap to clone; clones share state. Cached lists are only as
//! fresh as the last explicit load, while persisted storage stays the source
//! of truth. Stores expose a revision receiver via `subscribe()` so callers
//! know when to re-read derived views.

pub mod admin_store;
pub mod catalog_store;
pub mod errors;
pub mod participant_store;
pub mod revision;
pub mod seed;
pub mod session_store;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

pub use admin_store::AdminStore;
pub use catalog_store::{group_schedule_by_day, CatalogStore};
pub use errors::{StoreError, StoreResult};
pub use participant_store::ParticipantStore;
pub use revision::Revision;
pub use session_store::{SessionSnapshot, SessionStore, DEFAULT_ADMIN_EMAIL};
