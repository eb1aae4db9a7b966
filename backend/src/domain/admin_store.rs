use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use super::catalog_store::CatalogStore;
use super::errors::{StoreError, StoreResult};
use super::revision::Revision;
use super::session_store::SessionStore;
use super::validation::{require_non_blank, validate_occurrence_date};
use crate::storage::{keys, Storage};
use shared::{
    attendance_rate, Attendance, AttendanceStats, Child, ClassBooking, ClassStatus,
    FinancialStats, MarkAttendanceRequest, Payment, PaymentStatus, RateBreakdown, StatsPeriod,
    User,
};

/// Trailing window used for financial stats when no bounds are given
pub const DEFAULT_FINANCIAL_WINDOW_DAYS: i64 = 30;

/// Longest trailing window accepted, about ten years
pub const MAX_FINANCIAL_WINDOW_DAYS: i64 = 3660;

#[derive(Default)]
struct AdminState {
    users: Vec<User>,
    children: Vec<Child>,
    attendances: Vec<Attendance>,
    financial_stats: Option<FinancialStats>,
    attendance_stats: Option<AttendanceStats>,
    error: Option<String>,
}

/// Service for cross-account administration views and reporting
///
/// Every operation checks the session's admin role at call time and changes
/// nothing when the check fails.
#[derive(Clone)]
pub struct AdminStore {
    storage: Storage,
    session: SessionStore,
    catalog: CatalogStore,
    financial_window_days: i64,
    state: Arc<RwLock<AdminState>>,
    revision: Revision,
}

impl AdminStore {
    pub fn new(storage: Storage, session: SessionStore, catalog: CatalogStore) -> Self {
        Self {
            storage,
            session,
            catalog,
            financial_window_days: DEFAULT_FINANCIAL_WINDOW_DAYS,
            state: Arc::new(RwLock::new(AdminState::default())),
            revision: Revision::new(),
        }
    }

    pub fn with_financial_window(mut self, days: i64) -> Self {
        self.financial_window_days = days;
        self
    }

    /// Load every identity that has signed in on this storage
    pub async fn load_users(&self) -> StoreResult<()> {
        self.session.require_admin().await?;
        info!("Loading all users");

        match self.scan_users().await {
            Ok(users) => {
                info!("Found {} users", users.len());
                self.update_state(|state| state.users = users).await;
            }
            Err(e) => self.record_failure("load users", e).await,
        }
        Ok(())
    }

    /// Load the participants of every account
    pub async fn load_all_children(&self) -> StoreResult<()> {
        self.session.require_admin().await?;
        info!("Loading participants of all accounts");

        match self.scan_lists::<Child>(keys::CHILDREN_PREFIX).await {
            Ok(children) => {
                info!("Found {} participants", children.len());
                self.update_state(|state| state.children = children).await;
            }
            Err(e) => self.record_failure("load participants", e).await,
        }
        Ok(())
    }

    pub async fn load_attendances(&self) -> StoreResult<()> {
        self.session.require_admin().await?;
        debug!("Loading attendance records");

        match self.storage.read_list::<Attendance>(keys::ATTENDANCES).await {
            Ok(attendances) => {
                info!("Loaded {} attendance records", attendances.len());
                self.update_state(|state| state.attendances = attendances).await;
            }
            Err(e) => self.record_failure("load attendance records", e).await,
        }
        Ok(())
    }

    /// Record whether a booked occurrence was attended
    ///
    /// Records are appended, never updated in place. The referenced booking
    /// moves to attended or missed unless it was cancelled.
    pub async fn mark_attendance(&self, request: MarkAttendanceRequest) -> StoreResult<Attendance> {
        let admin = self.session.require_admin().await?;
        info!(
            "Marking attendance: booking={}, attended={}",
            request.booking_id, request.attended
        );

        // Validate the request
        require_non_blank(&request.booking_id, "Booking")?;
        require_non_blank(&request.child_id, "Participant")?;
        require_non_blank(&request.schedule_class_id, "Class")?;
        validate_occurrence_date(&request.date)?;

        let now = Utc::now().to_rfc3339();
        let attendance = Attendance {
            id: Attendance::generate_id(),
            booking_id: request.booking_id,
            child_id: request.child_id,
            schedule_class_id: request.schedule_class_id,
            date: request.date.trim().to_string(),
            attended: request.attended,
            notes: request.notes.filter(|notes| !notes.trim().is_empty()),
            marked_by: Some(admin.id),
            created_at: now.clone(),
            updated_at: now,
        };

        let record = attendance.clone();
        let persisted = self
            .storage
            .update_list(keys::ATTENDANCES, move |attendances: &mut Vec<Attendance>| {
                attendances.push(record);
                Ok(())
            })
            .await;

        match persisted {
            Ok((attendances, ())) => {
                self.update_state(|state| state.attendances = attendances).await;
            }
            Err(e) => {
                let error = StoreError::from_storage(e);
                if let StoreError::Storage(cause) = &error {
                    self.set_error(format!("Failed to mark attendance: {}", cause)).await;
                }
                return Err(error);
            }
        }

        match self.sync_booking_status(&attendance).await {
            Ok(true) => debug!("Booking {} status updated", attendance.booking_id),
            Ok(false) => debug!("Booking {} left unchanged", attendance.booking_id),
            Err(e) => warn!(
                "Attendance {} recorded but booking status was not updated: {:#}",
                attendance.id, e
            ),
        }

        info!("Recorded attendance {}", attendance.id);
        Ok(attendance)
    }

    /// Sum paid and pending payments across all accounts
    ///
    /// Bounds default to the trailing financial window ending now. The period
    /// is reported back but does not filter payments yet.
    pub async fn load_financial_stats(
        &self,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> StoreResult<()> {
        self.session.require_admin().await?;

        let now = Utc::now();
        let period = StatsPeriod {
            start: start_date.unwrap_or_else(|| {
                window_start(now, self.financial_window_days)
                    .unwrap_or_else(|| {
                        warn!(
                            "Financial window of {} days is out of range, using {}",
                            self.financial_window_days, DEFAULT_FINANCIAL_WINDOW_DAYS
                        );
                        now - Duration::days(DEFAULT_FINANCIAL_WINDOW_DAYS)
                    })
                    .to_rfc3339()
            }),
            end: end_date.unwrap_or_else(|| now.to_rfc3339()),
        };
        info!("Loading financial stats for {} - {}", period.start, period.end);

        match self.scan_lists::<Payment>(keys::PAYMENTS_PREFIX).await {
            Ok(payments) => {
                let stats = financial_stats(&payments, period);
                info!(
                    "Revenue {:.2}, pending {:.2} over {} payments",
                    stats.total_revenue,
                    stats.pending_payments,
                    payments.len()
                );
                self.update_state(|state| state.financial_stats = Some(stats)).await;
            }
            Err(e) => self.record_failure("load financial stats", e).await,
        }
        Ok(())
    }

    /// Compute attendance stats from the loaded attendance records
    pub async fn load_attendance_stats(&self) -> StoreResult<()> {
        self.session.require_admin().await?;

        let class_groups: HashMap<String, String> = self
            .catalog
            .schedule()
            .await
            .into_iter()
            .map(|class| (class.id, class.group_id))
            .collect();

        let mut state = self.state.write().await;
        let stats = attendance_stats(&state.attendances, &class_groups);
        info!(
            "Attendance rate {:.1}% over {} records",
            stats.attendance_rate, stats.total_bookings
        );
        state.attendance_stats = Some(stats);
        drop(state);
        self.revision.bump();
        Ok(())
    }

    pub async fn get_children_by_user_id(&self, user_id: &str) -> Vec<Child> {
        self.state
            .read()
            .await
            .children
            .iter()
            .filter(|child| child.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn users(&self) -> Vec<User> {
        self.state.read().await.users.clone()
    }

    pub async fn all_children(&self) -> Vec<Child> {
        self.state.read().await.children.clone()
    }

    pub async fn attendances(&self) -> Vec<Attendance> {
        self.state.read().await.attendances.clone()
    }

    pub async fn financial_stats(&self) -> Option<FinancialStats> {
        self.state.read().await.financial_stats.clone()
    }

    pub async fn attendance_stats(&self) -> Option<AttendanceStats> {
        self.state.read().await.attendance_stats.clone()
    }

    /// Drop every cached view; called on logout
    pub async fn clear_data(&self) {
        *self.state.write().await = AdminState::default();
        debug!("Cleared administration data");
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

    async fn scan_users(&self) -> Result<Vec<User>> {
        let mut user_keys = self.storage.keys_with_prefix(keys::AUTH_USER).await?;
        user_keys.extend(self.storage.keys_with_prefix(keys::USER_PREFIX).await?);

        let mut seen = HashSet::new();
        let mut users = Vec::new();
        for key in user_keys {
            match self.storage.read_json::<User>(&key).await {
                Ok(Some(user)) if user.id.trim().is_empty() || user.email.trim().is_empty() => {
                    warn!("Skipping {}: missing id or email", key);
                }
                Ok(Some(user)) => {
                    if seen.insert(user.id.clone()) {
                        users.push(user);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable {}: {:#}", key, e),
            }
        }
        Ok(users)
    }

    /// Concatenate every per-user list under `prefix`, skipping corrupt entries
    async fn scan_lists<T: serde::de::DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let mut all = Vec::new();
        for key in self.storage.keys_with_prefix(prefix).await? {
            match self.storage.read_list::<T>(&key).await {
                Ok(list) => all.extend(list),
                Err(e) => warn!("Skipping unreadable {}: {:#}", key, e),
            }
        }
        Ok(all)
    }

    /// Find the booking an attendance refers to and move it to attended or missed
    async fn sync_booking_status(&self, attendance: &Attendance) -> Result<bool> {
        let status = if attendance.attended {
            ClassStatus::Attended
        } else {
            ClassStatus::Missed
        };

        for key in self.storage.keys_with_prefix(keys::BOOKINGS_PREFIX).await? {
            let bookings: Vec<ClassBooking> = match self.storage.read_list(&key).await {
                Ok(bookings) => bookings,
                Err(e) => {
                    warn!("Skipping unreadable {}: {:#}", key, e);
                    continue;
                }
            };
            if !bookings.iter().any(|booking| booking.id == attendance.booking_id) {
                continue;
            }

            let updated_at = attendance.created_at.clone();
            let (_, changed) = self
                .storage
                .update_list(&key, |bookings: &mut Vec<ClassBooking>| {
                    let booking = bookings
                        .iter_mut()
                        .find(|booking| booking.id == attendance.booking_id);
                    Ok(match booking {
                        Some(booking) if booking.status != ClassStatus::Cancelled => {
                            booking.status = status;
                            booking.updated_at = updated_at;
                            true
                        }
                        _ => false,
                    })
                })
                .await?;
            return Ok(changed);
        }

        debug!("No stored booking matches {}", attendance.booking_id);
        Ok(false)
    }

    async fn update_state(&self, change: impl FnOnce(&mut AdminState)) {
        let mut state = self.state.write().await;
        change(&mut *state);
        state.error = None;
        drop(state);
        self.revision.bump();
    }

    async fn set_error(&self, message: String) {
        self.state.write().await.error = Some(message);
        self.revision.bump();
    }

    async fn record_failure(&self, action: &str, error: anyhow::Error) {
        warn!("Failed to {}: {:#}", action, error);
        self.set_error(format!("Failed to {}: {}", action, error)).await;
    }
}

/// Start of a trailing window of `days` ending at `now`, if it is representable
fn window_start(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    if !(1..=MAX_FINANCIAL_WINDOW_DAYS).contains(&days) {
        return None;
    }
    Duration::try_days(days).and_then(|window| now.checked_sub_signed(window))
}

/// Paid amounts are revenue, pending amounts are outstanding. Breakdowns stay empty.
pub fn financial_stats(payments: &[Payment], period: StatsPeriod) -> FinancialStats {
    let sum_with = |status: PaymentStatus| -> f64 {
        payments
            .iter()
            .filter(|payment| payment.status == status)
            .map(|payment| payment.amount)
            .sum()
    };

    FinancialStats {
        total_revenue: sum_with(PaymentStatus::Paid),
        pending_payments: sum_with(PaymentStatus::Pending),
        revenue_by_class: HashMap::new(),
        revenue_by_group: HashMap::new(),
        revenue_by_user: HashMap::new(),
        period,
    }
}

/// Overall and per-participant/per-group attendance rates
///
/// Records whose class is not in `class_groups` are bucketed under the class id.
pub fn attendance_stats(
    attendances: &[Attendance],
    class_groups: &HashMap<String, String>,
) -> AttendanceStats {
    let mut by_group: HashMap<String, RateBreakdown> = HashMap::new();
    let mut by_child: HashMap<String, RateBreakdown> = HashMap::new();

    for attendance in attendances {
        let group = class_groups
            .get(&attendance.schedule_class_id)
            .unwrap_or(&attendance.schedule_class_id);
        by_group.entry(group.clone()).or_default().record(attendance.attended);
        by_child
            .entry(attendance.child_id.clone())
            .or_default()
            .record(attendance.attended);
    }

    let total = attendances.len();
    let attended = attendances.iter().filter(|a| a.attended).count();

    AttendanceStats {
        total_bookings: total,
        attended,
        missed: total - attended,
        attendance_rate: attendance_rate(attended, total),
        by_group,
        by_child,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_utils::{payment, TestStores};
    use crate::storage::KeyValueStorage;
    use shared::{AddChildRequest, BookClassRequest, ClassType, UserRole};

    fn attendance(child_id: &str, class_id: &str, attended: bool) -> Attendance {
        Attendance {
            id: Attendance::generate_id(),
            booking_id: "booking_1".to_string(),
            child_id: child_id.to_string(),
            schedule_class_id: class_id.to_string(),
            date: "2025-03-10".to_string(),
            attended,
            notes: None,
            marked_by: Some(User::ADMIN_ID.to_string()),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn mark_request(booking: &ClassBooking, attended: bool) -> MarkAttendanceRequest {
        MarkAttendanceRequest {
            booking_id: booking.id.clone(),
            child_id: booking.child_id.clone(),
            schedule_class_id: booking.schedule_class_id.clone(),
            date: booking.date.clone(),
            attended,
            notes: Some("On time".to_string()),
        }
    }

    /// A parent with one participant and one planned booking, then an admin session
    async fn booked_as_parent(stores: &TestStores) -> (User, ClassBooking) {
        let parent = stores.login_user("parent@example.com").await;
        let child = stores
            .participant
            .add_child(AddChildRequest {
                first_name: "Ala".to_string(),
                last_name: "Nowak".to_string(),
                birth_date: "2015-06-15".to_string(),
                phone: String::new(),
            })
            .await
            .unwrap();
        let booking = stores
            .participant
            .book_class(BookClassRequest {
                child_id: child.id,
                schedule_class_id: "schedule_1".to_string(),
                class_type: ClassType::Single,
                date: "2025-03-10".to_string(),
            })
            .await
            .unwrap();

        stores.logout().await;
        stores.login_admin().await;
        (parent, booking)
    }

    #[test]
    fn test_attendance_stats_rate() {
        let mut records: Vec<Attendance> =
            (0..7).map(|_| attendance("child_1", "schedule_1", true)).collect();
        records.extend((0..3).map(|_| attendance("child_2", "schedule_9", false)));

        let groups = HashMap::from([("schedule_1".to_string(), "group_1".to_string())]);
        let stats = attendance_stats(&records, &groups);

        assert_eq!(stats.total_bookings, 10);
        assert_eq!(stats.attended, 7);
        assert_eq!(stats.missed, 3);
        assert_eq!(stats.attendance_rate, 70.0);
        assert_eq!(stats.by_group["group_1"].rate, 100.0);
        assert_eq!(stats.by_group["schedule_9"].total, 3);
        assert_eq!(stats.by_child["child_2"].rate, 0.0);

        let empty = attendance_stats(&[], &groups);
        assert_eq!(empty.attendance_rate, 0.0);
        assert_eq!(empty.total_bookings, 0);
    }

    #[tokio::test]
    async fn test_admin_operations_reject_non_admins() {
        let stores = TestStores::new();
        let (_, booking) = booked_as_parent(&stores).await;
        stores.logout().await;

        let before = stores.memory.get(keys::ATTENDANCES).await.unwrap();

        assert!(matches!(stores.admin.load_users().await, Err(StoreError::Unauthenticated)));
        assert!(matches!(
            stores.admin.load_all_children().await,
            Err(StoreError::Unauthenticated)
        ));
        assert!(matches!(
            stores.admin.load_attendance_stats().await,
            Err(StoreError::Unauthenticated)
        ));
        assert!(matches!(
            stores.admin.mark_attendance(mark_request(&booking, true)).await,
            Err(StoreError::Unauthenticated)
        ));
        assert_eq!(stores.memory.get(keys::ATTENDANCES).await.unwrap(), before);
        assert!(stores.admin.all_children().await.is_empty());
        assert!(stores.admin.attendance_stats().await.is_none());

        stores.login_user("parent@example.com").await;
        let before = stores.memory.get(keys::ATTENDANCES).await.unwrap();

        assert!(matches!(stores.admin.load_users().await, Err(StoreError::Forbidden)));
        assert!(matches!(stores.admin.load_all_children().await, Err(StoreError::Forbidden)));
        assert!(matches!(
            stores.admin.load_financial_stats(None, None).await,
            Err(StoreError::Forbidden)
        ));
        assert!(matches!(
            stores.admin.mark_attendance(mark_request(&booking, true)).await,
            Err(StoreError::Forbidden)
        ));

        assert_eq!(stores.memory.get(keys::ATTENDANCES).await.unwrap(), before);
        assert!(stores.admin.users().await.is_empty());
        assert!(stores.admin.attendances().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_users_skips_corrupt_and_deduplicates() {
        let stores = TestStores::new();
        let (parent, _) = booked_as_parent(&stores).await;
        stores
            .memory
            .set_many(vec![
                (keys::user("user_broken"), "{oops".to_string()),
                (
                    keys::user("user_blank"),
                    r#"{"id":"user_blank","email":"","phone":"","role":"user","createdAt":"","updatedAt":""}"#
                        .to_string(),
                ),
            ])
            .await
            .unwrap();

        stores.admin.load_users().await.unwrap();

        let users = stores.admin.users().await;
        let mut ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        ids.sort();
        let mut expected = vec![User::ADMIN_ID, parent.id.as_str()];
        expected.sort();
        assert_eq!(ids, expected);
        assert!(users.iter().any(|u| u.role == UserRole::Admin));
        assert!(stores.admin.error().await.is_none());
    }

    #[tokio::test]
    async fn test_load_all_children_across_accounts() {
        let stores = TestStores::new();
        let (parent, _) = booked_as_parent(&stores).await;
        stores
            .memory
            .set(&keys::children("user_corrupt"), "[1, 2".to_string())
            .await
            .unwrap();

        stores.admin.load_all_children().await.unwrap();

        assert_eq!(stores.admin.all_children().await.len(), 1);
        assert_eq!(stores.admin.get_children_by_user_id(&parent.id).await.len(), 1);
        assert!(stores.admin.get_children_by_user_id("user_other").await.is_empty());
    }

    #[tokio::test]
    async fn test_mark_attendance_appends_and_updates_booking() {
        let stores = TestStores::new();
        let (parent, booking) = booked_as_parent(&stores).await;

        let first = stores.admin.mark_attendance(mark_request(&booking, false)).await.unwrap();
        assert_eq!(first.marked_by.as_deref(), Some(User::ADMIN_ID));
        assert_eq!(first.notes.as_deref(), Some("On time"));

        let bookings: Vec<ClassBooking> =
            stores.storage.read_list(&keys::bookings(&parent.id)).await.unwrap();
        assert_eq!(bookings[0].status, ClassStatus::Missed);

        // Marking again appends a second record and corrects the booking
        stores.admin.mark_attendance(mark_request(&booking, true)).await.unwrap();

        let persisted: Vec<Attendance> = stores.storage.read_list(keys::ATTENDANCES).await.unwrap();
        assert_eq!(persisted.len(), 2);
        assert_eq!(stores.admin.attendances().await, persisted);

        let bookings: Vec<ClassBooking> =
            stores.storage.read_list(&keys::bookings(&parent.id)).await.unwrap();
        assert_eq!(bookings[0].status, ClassStatus::Attended);
    }

    #[tokio::test]
    async fn test_mark_attendance_keeps_cancelled_booking() {
        let stores = TestStores::new();
        let parent = stores.login_user("parent@example.com").await;
        let cancelled = ClassBooking {
            id: "booking_cancelled".to_string(),
            child_id: "child_1".to_string(),
            schedule_class_id: "schedule_1".to_string(),
            class_type: ClassType::Single,
            status: ClassStatus::Cancelled,
            date: "2025-03-10".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        stores
            .storage
            .write_json(&keys::bookings(&parent.id), &vec![cancelled.clone()])
            .await
            .unwrap();
        stores.logout().await;
        stores.login_admin().await;

        stores.admin.mark_attendance(mark_request(&cancelled, true)).await.unwrap();

        let bookings: Vec<ClassBooking> =
            stores.storage.read_list(&keys::bookings(&parent.id)).await.unwrap();
        assert_eq!(bookings[0].status, ClassStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_mark_attendance_validation() {
        let stores = TestStores::new();
        let (_, booking) = booked_as_parent(&stores).await;

        let mut request = mark_request(&booking, true);
        request.date = "someday".to_string();
        let result = stores.admin.mark_attendance(request).await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(stores.memory.get(keys::ATTENDANCES).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_financial_stats() {
        let stores = TestStores::new();
        stores.login_admin().await;
        stores
            .storage
            .write_json(
                &keys::payments("user_a"),
                &vec![
                    payment("p1", "user_a", 250.0, PaymentStatus::Paid),
                    payment("p2", "user_a", 70.0, PaymentStatus::Pending),
                ],
            )
            .await
            .unwrap();
        stores
            .storage
            .write_json(
                &keys::payments("user_b"),
                &vec![
                    payment("p3", "user_b", 120.0, PaymentStatus::Paid),
                    payment("p4", "user_b", 380.0, PaymentStatus::Refunded),
                ],
            )
            .await
            .unwrap();
        stores
            .memory
            .set(&keys::payments("user_c"), "corrupt".to_string())
            .await
            .unwrap();

        stores.admin.load_financial_stats(None, None).await.unwrap();

        let stats = stores.admin.financial_stats().await.unwrap();
        assert_eq!(stats.total_revenue, 370.0);
        assert_eq!(stats.pending_payments, 70.0);
        assert!(stats.revenue_by_class.is_empty());
        assert!(stats.revenue_by_group.is_empty());
        assert!(stats.revenue_by_user.is_empty());

        let start = chrono::DateTime::parse_from_rfc3339(&stats.period.start).unwrap();
        let end = chrono::DateTime::parse_from_rfc3339(&stats.period.end).unwrap();
        assert_eq!((end - start).num_days(), 30);
    }

    #[tokio::test]
    async fn test_financial_stats_with_out_of_range_window() {
        let stores = TestStores::new();
        stores.login_admin().await;

        for days in [100_000_000, i64::MAX, 0] {
            let admin = stores.admin.clone().with_financial_window(days);
            admin.load_financial_stats(None, None).await.unwrap();

            let stats = admin.financial_stats().await.unwrap();
            let start = chrono::DateTime::parse_from_rfc3339(&stats.period.start).unwrap();
            let end = chrono::DateTime::parse_from_rfc3339(&stats.period.end).unwrap();
            assert_eq!((end - start).num_days(), DEFAULT_FINANCIAL_WINDOW_DAYS, "{}", days);
        }
    }

    #[tokio::test]
    async fn test_financial_stats_echoes_period() {
        let stores = TestStores::new();
        stores.login_admin().await;

        stores
            .admin
            .load_financial_stats(
                Some("2025-01-01T00:00:00Z".to_string()),
                Some("2025-01-31T23:59:59Z".to_string()),
            )
            .await
            .unwrap();

        let stats = stores.admin.financial_stats().await.unwrap();
        assert_eq!(stats.period.start, "2025-01-01T00:00:00Z");
        assert_eq!(stats.period.end, "2025-01-31T23:59:59Z");
        assert_eq!(stats.total_revenue, 0.0);
    }

    #[tokio::test]
    async fn test_attendance_stats_use_catalog_groups() {
        let stores = TestStores::new();
        stores.login_admin().await;
        stores.catalog.load_schedule().await;

        let mut records: Vec<Attendance> =
            (0..7).map(|_| attendance("child_1", "schedule_2", true)).collect();
        records.extend((0..3).map(|_| attendance("child_1", "schedule_2", false)));
        stores.storage.write_json(keys::ATTENDANCES, &records).await.unwrap();

        // Stats reflect only what has been loaded
        stores.admin.load_attendance_stats().await.unwrap();
        assert_eq!(stores.admin.attendance_stats().await.unwrap().attendance_rate, 0.0);

        stores.admin.load_attendances().await.unwrap();
        stores.admin.load_attendance_stats().await.unwrap();

        let stats = stores.admin.attendance_stats().await.unwrap();
        assert_eq!(stats.attendance_rate, 70.0);
        assert_eq!(stats.by_group["group_2"].total, 10);
        assert_eq!(stats.by_child["child_1"].attended, 7);
    }

    #[tokio::test]
    async fn test_clear_data() {
        let stores = TestStores::new();
        booked_as_parent(&stores).await;
        stores.admin.load_users().await.unwrap();
        stores.admin.load_all_children().await.unwrap();

        stores.admin.clear_data().await;

        assert!(stores.admin.users().await.is_empty());
        assert!(stores.admin.all_children().await.is_empty());
        assert!(stores.admin.financial_stats().await.is_none());
    }
}
