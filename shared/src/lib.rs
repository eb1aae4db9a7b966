use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Role of an authenticated identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Parent or guardian managing participants
    User,
    /// Studio administrator
    Admin,
}

/// Kind of class a booking was made for; drives pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassType {
    Single,
    SubscriptionWeekly,
    SubscriptionBiweekly,
    Individual,
}

/// Lifecycle of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    Planned,
    Attended,
    Missed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Blik,
    Przelewy24,
    Other,
}

/// Day of the week a class runs on, ordered Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WeekDay {
    pub const ALL: [WeekDay; 7] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
        WeekDay::Sunday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WeekDay::Monday => "Monday",
            WeekDay::Tuesday => "Tuesday",
            WeekDay::Wednesday => "Wednesday",
            WeekDay::Thursday => "Thursday",
            WeekDay::Friday => "Friday",
            WeekDay::Saturday => "Saturday",
            WeekDay::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for WeekDay {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => WeekDay::Monday,
            chrono::Weekday::Tue => WeekDay::Tuesday,
            chrono::Weekday::Wed => WeekDay::Wednesday,
            chrono::Weekday::Thu => WeekDay::Thursday,
            chrono::Weekday::Fri => WeekDay::Friday,
            chrono::Weekday::Sat => WeekDay::Saturday,
            chrono::Weekday::Sun => WeekDay::Sunday,
        }
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An account holder (parent) or administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub created_at: String, // RFC 3339 timestamp
    pub updated_at: String, // RFC 3339 timestamp
}

/// A participant attending classes, owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String, // ISO 8601 date format (YYYY-MM-DD)
    /// Contact phone for the participant
    pub phone: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A class group (level) that scheduled classes belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    pub created_at: String,
    pub updated_at: String,
}

/// A recurring weekly time slot for a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleClass {
    pub id: String,
    /// Weak reference to a `Group`
    pub group_id: String,
    pub day_of_week: WeekDay,
    pub start_time: String, // "HH:mm"
    pub end_time: String,   // "HH:mm"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_name: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A participant's reservation for one occurrence of a scheduled class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBooking {
    pub id: String,
    pub child_id: String,
    pub schedule_class_id: String,
    pub class_type: ClassType,
    pub status: ClassStatus,
    /// Date of the class occurrence (ISO 8601)
    pub date: String,
    pub created_at: String,
    pub updated_at: String,
}

/// An administrator's record of whether a booked occurrence was attended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub booking_id: String,
    pub child_id: String,
    pub schedule_class_id: String,
    pub date: String,
    pub attended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Id of the administrator who marked the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marked_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    /// Amount in `currency` units (PLN)
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookings: Option<Vec<ClassBooking>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Price list for classes, in PLN
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub single: f64,
    pub subscription_weekly: f64,
    pub subscription_biweekly: f64,
    pub individual_min: f64,
}

impl Pricing {
    pub const STANDARD: Pricing = Pricing {
        single: 70.0,
        subscription_weekly: 250.0,
        subscription_biweekly: 380.0,
        individual_min: 120.0,
    };

    pub const CURRENCY: &'static str = "PLN";

    /// List price for a class type. Individual sessions are priced from the minimum.
    pub fn price_for(&self, class_type: ClassType) -> f64 {
        match class_type {
            ClassType::Single => self.single,
            ClassType::SubscriptionWeekly => self.subscription_weekly,
            ClassType::SubscriptionBiweekly => self.subscription_biweekly,
            ClassType::Individual => self.individual_min,
        }
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Request for registering a new account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>, // Unused until a real auth backend exists
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Request for adding a participant to the current account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChildRequest {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String, // ISO 8601 date format (YYYY-MM-DD)
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookClassRequest {
    pub child_id: String,
    pub schedule_class_id: String,
    pub class_type: ClassType,
    pub date: String,
}

/// Request for adding a class to the weekly schedule (admin)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleClassRequest {
    pub group_id: String,
    pub day_of_week: WeekDay,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub booking_id: String,
    pub child_id: String,
    pub schedule_class_id: String,
    pub date: String,
    pub attended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Reporting window for statistics (RFC 3339 bounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsPeriod {
    pub start: String,
    pub end: String,
}

/// Revenue summary across all accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStats {
    pub total_revenue: f64,
    pub pending_payments: f64,
    pub revenue_by_class: HashMap<String, f64>,
    pub revenue_by_group: HashMap<String, f64>,
    pub revenue_by_user: HashMap<String, f64>,
    pub period: StatsPeriod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateBreakdown {
    pub total: usize,
    pub attended: usize,
    pub rate: f64, // Percentage
}

impl RateBreakdown {
    pub fn record(&mut self, attended: bool) {
        self.total += 1;
        if attended {
            self.attended += 1;
        }
        self.rate = attendance_rate(self.attended, self.total);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total_bookings: usize,
    pub attended: usize,
    pub missed: usize,
    pub attendance_rate: f64, // Percentage
    pub by_group: HashMap<String, RateBreakdown>,
    pub by_child: HashMap<String, RateBreakdown>,
}

/// Attended share in percent; zero when nothing was recorded
pub fn attendance_rate(attended: usize, total: usize) -> f64 {
    if total > 0 {
        (attended as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

fn prefixed_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

impl User {
    /// Fixed id used for the development administrator identity
    pub const ADMIN_ID: &'static str = "admin_1";

    pub fn generate_id() -> String {
        prefixed_id("user")
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl Child {
    pub fn generate_id() -> String {
        prefixed_id("child")
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl ScheduleClass {
    pub fn generate_id() -> String {
        prefixed_id("schedule")
    }
}

impl ClassBooking {
    pub fn generate_id() -> String {
        prefixed_id("booking")
    }
}

impl Attendance {
    pub fn generate_id() -> String {
        prefixed_id("attendance")
    }
}

/// Mint an opaque session token
pub fn generate_token() -> String {
    prefixed_id("token")
}

/// Parse an "HH:mm" clock time into minutes after midnight
pub fn parse_clock_time(value: &str) -> Result<u16, ClockTimeError> {
    let (hours, minutes) = value.split_once(':').ok_or(ClockTimeError::InvalidFormat)?;
    let is_two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !is_two_digits(hours) || !is_two_digits(minutes) {
        return Err(ClockTimeError::InvalidFormat);
    }

    let hours: u16 = hours.parse().map_err(|_| ClockTimeError::InvalidFormat)?;
    let minutes: u16 = minutes.parse().map_err(|_| ClockTimeError::InvalidFormat)?;
    if hours > 23 || minutes > 59 {
        return Err(ClockTimeError::OutOfRange);
    }

    Ok(hours * 60 + minutes)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClockTimeError {
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for ClockTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockTimeError::InvalidFormat => write!(f, "Time must be in HH:mm format"),
            ClockTimeError::OutOfRange => write!(f, "Time is outside 00:00-23:59"),
        }
    }
}

impl std::error::Error for ClockTimeError {}
