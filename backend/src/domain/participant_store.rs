use anyhow::Result;
use chrono::Utc;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use super::errors::{StoreError, StoreResult};
use super::revision::Revision;
use super::session_store::SessionStore;
use super::validation::{require_non_blank, validate_birth_date, validate_occurrence_date};
use crate::storage::{keys, Storage};
use shared::{
    AddChildRequest, BookClassRequest, Child, ClassBooking, ClassStatus, ClassType, Payment,
    PaymentStatus, Pricing,
};

#[derive(Default)]
struct ParticipantState {
    children: Vec<Child>,
    bookings: Vec<ClassBooking>,
    payments: Vec<Payment>,
    error: Option<String>,
}

/// Service for the signed-in account's participants, bookings and payments
///
/// Every list lives under a key scoped to the owning user id. Loads without a
/// session are no-ops; mutations without one are rejected.
#[derive(Clone)]
pub struct ParticipantStore {
    storage: Storage,
    session: SessionStore,
    pricing: Pricing,
    state: Arc<RwLock<ParticipantState>>,
    revision: Revision,
}

impl ParticipantStore {
    pub fn new(storage: Storage, session: SessionStore) -> Self {
        Self {
            storage,
            session,
            pricing: Pricing::STANDARD,
            state: Arc::new(RwLock::new(ParticipantState::default())),
            revision: Revision::new(),
        }
    }

    pub async fn load_children(&self) {
        if let Some(children) = self.load_owned_list(keys::children, "participants").await {
            self.state.write().await.children = children;
            self.revision.bump();
        }
    }

    pub async fn load_bookings(&self) {
        if let Some(bookings) = self.load_owned_list(keys::bookings, "bookings").await {
            self.state.write().await.bookings = bookings;
            self.revision.bump();
        }
    }

    pub async fn load_payments(&self) {
        if let Some(payments) = self.load_owned_list(keys::payments, "payments").await {
            self.state.write().await.payments = payments;
            self.revision.bump();
        }
    }

    /// Add a participant to the current account
    pub async fn add_child(&self, request: AddChildRequest) -> StoreResult<Child> {
        let user = self.session.require_user().await?;
        info!(
            "Adding participant: {} {} for {}",
            request.first_name, request.last_name, user.id
        );

        // Validate the request
        require_non_blank(&request.first_name, "First name")?;
        require_non_blank(&request.last_name, "Last name")?;
        let birth_date = validate_birth_date(&request.birth_date)?;

        let now = Utc::now().to_rfc3339();
        let child = Child {
            id: Child::generate_id(),
            user_id: user.id.clone(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            birth_date: birth_date.format("%Y-%m-%d").to_string(),
            phone: request.phone.trim().to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        let new_child = child.clone();
        let persisted = self
            .storage
            .update_list(&keys::children(&user.id), move |children: &mut Vec<Child>| {
                children.push(new_child);
                Ok(())
            })
            .await;

        self.commit(persisted, "add participant", |state, children| {
            state.children = children
        })
        .await?;

        info!("Added participant {} ({})", child.full_name(), child.id);
        Ok(child)
    }

    /// Remove a participant from the current account. Unknown ids are a no-op.
    pub async fn remove_child(&self, id: &str) -> StoreResult<()> {
        let user = self.session.require_user().await?;
        info!("Removing participant: {}", id);

        let persisted = self
            .storage
            .update_list(&keys::children(&user.id), |children: &mut Vec<Child>| {
                let before = children.len();
                children.retain(|child| child.id != id);
                Ok(before != children.len())
            })
            .await;

        let removed = self
            .commit(persisted, "remove participant", |state, children| {
                state.children = children
            })
            .await?;

        if !removed {
            debug!("Participant {} was not present", id);
        }
        Ok(())
    }

    /// Reserve one occurrence of a scheduled class for a participant of this account
    pub async fn book_class(&self, request: BookClassRequest) -> StoreResult<ClassBooking> {
        let user = self.session.require_user().await?;
        info!(
            "Booking class {} on {} for participant {}",
            request.schedule_class_id, request.date, request.child_id
        );

        require_non_blank(&request.schedule_class_id, "Class")?;
        validate_occurrence_date(&request.date)?;

        let children: Vec<Child> = match self.storage.read_list(&keys::children(&user.id)).await {
            Ok(children) => children,
            Err(e) => return Err(self.record_failure("book class", e).await),
        };
        if !children.iter().any(|child| child.id == request.child_id) {
            warn!(
                "Participant {} does not belong to account {}",
                request.child_id, user.id
            );
            return Err(StoreError::validation(format!(
                "Participant {} does not belong to this account",
                request.child_id
            )));
        }

        let now = Utc::now().to_rfc3339();
        let booking = ClassBooking {
            id: ClassBooking::generate_id(),
            child_id: request.child_id,
            schedule_class_id: request.schedule_class_id,
            class_type: request.class_type,
            status: ClassStatus::Planned,
            date: request.date.trim().to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        let new_booking = booking.clone();
        let persisted = self
            .storage
            .update_list(&keys::bookings(&user.id), move |bookings: &mut Vec<ClassBooking>| {
                bookings.push(new_booking);
                Ok(())
            })
            .await;

        self.commit(persisted, "book class", |state, bookings| {
            state.bookings = bookings
        })
        .await?;

        info!("Created booking {} ({:?})", booking.id, booking.class_type);
        Ok(booking)
    }

    /// Cancel a planned booking of this account
    pub async fn cancel_booking(&self, id: &str) -> StoreResult<ClassBooking> {
        let user = self.session.require_user().await?;
        info!("Cancelling booking: {}", id);

        let now = Utc::now().to_rfc3339();
        let persisted = self
            .storage
            .update_list(&keys::bookings(&user.id), |bookings: &mut Vec<ClassBooking>| {
                let booking = bookings
                    .iter_mut()
                    .find(|booking| booking.id == id)
                    .ok_or_else(|| StoreError::NotFound(format!("booking {}", id)))?;

                if booking.status != ClassStatus::Planned {
                    return Err(StoreError::validation(format!(
                        "Only planned bookings can be cancelled; booking {} is {:?}",
                        id, booking.status
                    ))
                    .into());
                }

                booking.status = ClassStatus::Cancelled;
                booking.updated_at = now;
                Ok(booking.clone())
            })
            .await;

        let cancelled = self
            .commit(persisted, "cancel booking", |state, bookings| {
                state.bookings = bookings
            })
            .await?;

        info!("Cancelled booking {}", cancelled.id);
        Ok(cancelled)
    }

    pub async fn children(&self) -> Vec<Child> {
        self.state.read().await.children.clone()
    }

    pub async fn bookings(&self) -> Vec<ClassBooking> {
        self.state.read().await.bookings.clone()
    }

    pub async fn payments(&self) -> Vec<Payment> {
        self.state.read().await.payments.clone()
    }

    pub async fn has_children(&self) -> bool {
        !self.state.read().await.children.is_empty()
    }

    pub async fn planned_bookings(&self) -> Vec<ClassBooking> {
        self.bookings_with_status(ClassStatus::Planned).await
    }

    pub async fn attended_bookings(&self) -> Vec<ClassBooking> {
        self.bookings_with_status(ClassStatus::Attended).await
    }

    /// Sum of pending payments in the cache
    pub async fn calculate_total_amount(&self) -> f64 {
        pending_total(&self.state.read().await.payments)
    }

    pub fn pricing(&self) -> Pricing {
        self.pricing
    }

    pub fn price_for(&self, class_type: ClassType) -> f64 {
        self.pricing.price_for(class_type)
    }

    /// Drop every cached list; called on logout so nothing leaks into the next session
    pub async fn clear_data(&self) {
        let mut state = self.state.write().await;
        *state = ParticipantState::default();
        drop(state);
        debug!("Cleared participant data");
        self.revision.bump();
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    async fn bookings_with_status(&self, status: ClassStatus) -> Vec<ClassBooking> {
        self.state
            .read()
            .await
            .bookings
            .iter()
            .filter(|booking| booking.status == status)
            .cloned()
            .collect()
    }

    /// Read a list owned by the current user; `None` without a session or on failure
    async fn load_owned_list<T: DeserializeOwned>(
        &self,
        key_for: fn(&str) -> String,
        what: &str,
    ) -> Option<Vec<T>> {
        let Some(user) = self.session.current_user().await else {
            debug!("No session, skipping {} load", what);
            return None;
        };

        match self.storage.read_list(&key_for(&user.id)).await {
            Ok(list) => {
                debug!("Loaded {} {} for {}", list.len(), what, user.id);
                self.state.write().await.error = None;
                Some(list)
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", what, e);
                self.state.write().await.error = Some(format!("Failed to load {}: {}", what, e));
                self.revision.bump();
                None
            }
        }
    }

    /// Swap a cached list to its persisted value, or surface why the change failed
    async fn commit<T, R>(
        &self,
        persisted: Result<(Vec<T>, R)>,
        action: &str,
        apply: impl FnOnce(&mut ParticipantState, Vec<T>),
    ) -> StoreResult<R> {
        let mut state = self.state.write().await;
        match persisted {
            Ok((list, outcome)) => {
                apply(&mut *state, list);
                state.error = None;
                drop(state);
                self.revision.bump();
                Ok(outcome)
            }
            Err(e) => {
                drop(state);
                Err(self.record_failure(action, e).await)
            }
        }
    }

    /// Record a storage failure in `error`; typed rejections pass through unrecorded
    async fn record_failure(&self, action: &str, e: anyhow::Error) -> StoreError {
        let error = StoreError::from_storage(e);
        if let StoreError::Storage(cause) = &error {
            warn!("Failed to {}: {:#}", action, cause);
            self.state.write().await.error = Some(format!("Failed to {}: {}", action, cause));
        }
        error
    }
}

/// Total amount of pending payments
pub fn pending_total(payments: &[Payment]) -> f64 {
    payments
        .iter()
        .filter(|payment| payment.status == PaymentStatus::Pending)
        .map(|payment| payment.amount)
        .sum()
}
