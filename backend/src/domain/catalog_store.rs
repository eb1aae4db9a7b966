use anyhow::Result;
use chrono::Utc;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use super::errors::{StoreError, StoreResult};
use super::revision::Revision;
use super::seed;
use super::session_store::SessionStore;
use super::validation::{require_non_blank, validate_time_range};
use crate::storage::{keys, Storage};
use shared::{CreateScheduleClassRequest, Group, ScheduleClass, WeekDay};

#[derive(Default)]
struct CatalogState {
    schedule: Vec<ScheduleClass>,
    groups: Vec<Group>,
    error: Option<String>,
}

/// Service for the class catalog: groups and the weekly schedule
#[derive(Clone)]
pub struct CatalogStore {
    storage: Storage,
    session: SessionStore,
    state: Arc<RwLock<CatalogState>>,
    revision: Revision,
}

impl CatalogStore {
    pub fn new(storage: Storage, session: SessionStore) -> Self {
        Self {
            storage,
            session,
            state: Arc::new(RwLock::new(CatalogState::default())),
            revision: Revision::new(),
        }
    }

    /// Load the weekly schedule, seeding the default one on first run
    pub async fn load_schedule(&self) {
        debug!("Loading schedule");
        let loaded = self.load_or_seed(keys::SCHEDULE, seed::default_schedule).await;

        let mut state = self.state.write().await;
        match loaded {
            Ok(schedule) => {
                info!("Loaded {} schedule classes", schedule.len());
                state.schedule = schedule;
                state.error = None;
            }
            Err(e) => {
                warn!("Failed to load schedule: {:#}", e);
                state.error = Some(format!("Failed to load schedule: {}", e));
            }
        }
        drop(state);
        self.revision.bump();
    }

    /// Load class groups, seeding the default ones on first run
    pub async fn load_groups(&self) {
        debug!("Loading groups");
        let loaded = self.load_or_seed(keys::GROUPS, seed::default_groups).await;

        let mut state = self.state.write().await;
        match loaded {
            Ok(groups) => {
                info!("Loaded {} groups", groups.len());
                state.groups = groups;
                state.error = None;
            }
            Err(e) => {
                warn!("Failed to load groups: {:#}", e);
                state.error = Some(format!("Failed to load groups: {}", e));
            }
        }
        drop(state);
        self.revision.bump();
    }

    /// Add a class to the weekly schedule (admin only)
    pub async fn create_schedule_class(
        &self,
        request: CreateScheduleClassRequest,
    ) -> StoreResult<ScheduleClass> {
        let admin = self.session.require_admin().await?;
        info!(
            "Creating schedule class: group={}, day={}, {}-{}",
            request.group_id, request.day_of_week, request.start_time, request.end_time
        );

        // Validate the request
        require_non_blank(&request.group_id, "Group")?;
        validate_time_range(&request.start_time, &request.end_time)?;
        if self.get_group_by_id(&request.group_id).await.is_none() {
            warn!("Schedule class references unknown group: {}", request.group_id);
        }

        let now = Utc::now().to_rfc3339();
        let class = ScheduleClass {
            id: ScheduleClass::generate_id(),
            group_id: request.group_id,
            day_of_week: request.day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
            trainer_id: request.trainer_id,
            trainer_name: request.trainer_name,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };

        let new_class = class.clone();
        let persisted = self
            .storage
            .update_list(keys::SCHEDULE, move |schedule: &mut Vec<ScheduleClass>| {
                schedule.push(new_class);
                Ok(())
            })
            .await;

        let (len, ()) = self.commit_schedule(persisted, "create schedule class").await?;
        info!(
            "Created schedule class {} by {}; schedule has {} classes",
            class.id, admin.id, len
        );
        Ok(class)
    }

    /// Remove a class from the weekly schedule (admin only). Unknown ids are a no-op.
    pub async fn delete_schedule_class(&self, id: &str) -> StoreResult<()> {
        let admin = self.session.require_admin().await?;
        info!("Deleting schedule class: {}", id);

        let persisted = self
            .storage
            .update_list(keys::SCHEDULE, |schedule: &mut Vec<ScheduleClass>| {
                let before = schedule.len();
                schedule.retain(|class| class.id != id);
                Ok(before != schedule.len())
            })
            .await;

        let (_, removed) = self.commit_schedule(persisted, "delete schedule class").await?;
        if removed {
            info!("Deleted schedule class {} by {}", id, admin.id);
        } else {
            debug!("Schedule class {} was not present", id);
        }
        Ok(())
    }

    pub async fn schedule(&self) -> Vec<ScheduleClass> {
        self.state.read().await.schedule.clone()
    }

    pub async fn groups(&self) -> Vec<Group> {
        self.state.read().await.groups.clone()
    }

    /// Active classes of the cached schedule, bucketed by weekday
    pub async fn schedule_by_day(&self) -> BTreeMap<WeekDay, Vec<ScheduleClass>> {
        group_schedule_by_day(&self.state.read().await.schedule)
    }

    pub async fn get_class_by_id(&self, id: &str) -> Option<ScheduleClass> {
        self.state
            .read()
            .await
            .schedule
            .iter()
            .find(|class| class.id == id)
            .cloned()
    }

    pub async fn get_group_by_id(&self, id: &str) -> Option<Group> {
        self.state
            .read()
            .await
            .groups
            .iter()
            .find(|group| group.id == id)
            .cloned()
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

    async fn load_or_seed<T>(&self, key: &str, seed: fn(&str) -> Vec<T>) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self.storage.lock_key(key).await;

        let existing: Vec<T> = self.storage.read_list(key).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let seeded = seed(&Utc::now().to_rfc3339());
        self.storage.write_json(key, &seeded).await?;
        info!("Seeded '{}' with {} default entries", key, seeded.len());
        Ok(seeded)
    }

    /// Swap the cache to the persisted schedule, or record why persisting failed
    async fn commit_schedule<R>(
        &self,
        persisted: Result<(Vec<ScheduleClass>, R)>,
        action: &str,
    ) -> StoreResult<(usize, R)> {
        let mut state = self.state.write().await;
        match persisted {
            Ok((schedule, outcome)) => {
                let len = schedule.len();
                state.schedule = schedule;
                state.error = None;
                drop(state);
                self.revision.bump();
                Ok((len, outcome))
            }
            Err(e) => {
                warn!("Failed to {}: {:#}", action, e);
                state.error = Some(format!("Failed to {}: {}", action, e));
                Err(StoreError::Storage(e))
            }
        }
    }
}

/// Partition active classes into the seven weekday buckets, each sorted by start time
pub fn group_schedule_by_day(schedule: &[ScheduleClass]) -> BTreeMap<WeekDay, Vec<ScheduleClass>> {
    let mut by_day: BTreeMap<WeekDay, Vec<ScheduleClass>> =
        WeekDay::ALL.iter().map(|day| (*day, Vec::new())).collect();

    for class in schedule.iter().filter(|class| class.is_active) {
        by_day.entry(class.day_of_week).or_default().push(class.clone());
    }

    // Zero-padded HH:mm sorts correctly as a string
    for classes in by_day.values_mut() {
        classes.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    }

    by_day
}
