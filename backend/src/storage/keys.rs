//! Persisted key names. Administration scans rely on these exact prefixes.

pub const AUTH_TOKEN: &str = "auth_token";
pub const AUTH_USER: &str = "auth_user";
pub const SCHEDULE: &str = "schedule";
pub const GROUPS: &str = "groups";
pub const ATTENDANCES: &str = "attendances";

pub const USER_PREFIX: &str = "user_";
pub const CHILDREN_PREFIX: &str = "children_";
pub const BOOKINGS_PREFIX: &str = "bookings_";
pub const PAYMENTS_PREFIX: &str = "payments_";

pub fn user(user_id: &str) -> String {
    format!("{}{}", USER_PREFIX, user_id)
}

pub fn children(user_id: &str) -> String {
    format!("{}{}", CHILDREN_PREFIX, user_id)
}

pub fn bookings(user_id: &str) -> String {
    format!("{}{}", BOOKINGS_PREFIX, user_id)
}

pub fn payments(user_id: &str) -> String {
    format!("{}{}", PAYMENTS_PREFIX, user_id)
}
