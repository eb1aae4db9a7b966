use log::{debug, warn};

use crate::domain::SessionSnapshot;

/// Public landing route guards redirect to
pub const LANDING: &str = "/";

/// Who may enter a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Session,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub access: Access,
}

const fn route(path: &'static str, name: &'static str, access: Access) -> Route {
    Route { path, name, access }
}

pub const ROUTES: &[Route] = &[
    route("/", "home", Access::Public),
    route("/philosophy", "philosophy", Access::Public),
    route("/classes", "classes", Access::Public),
    route("/schedule", "schedule", Access::Public),
    route("/trainers", "trainers", Access::Public),
    route("/contact", "contact", Access::Public),
    route("/dashboard", "dashboard", Access::Session),
    route("/dashboard/participants", "dashboard-participants", Access::Session),
    route("/dashboard/schedule", "dashboard-schedule", Access::Session),
    route("/dashboard/bookings", "dashboard-bookings", Access::Session),
    route("/dashboard/payments", "dashboard-payments", Access::Session),
    route("/admin", "admin", Access::Admin),
    route("/admin/users", "admin-users", Access::Admin),
    route("/admin/schedule", "admin-schedule", Access::Admin),
    route("/admin/attendance", "admin-attendance", Access::Admin),
    route("/admin/finances", "admin-finances", Access::Admin),
];

/// Outcome of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow(&'static Route),
    Redirect { to: &'static str },
    NotFound,
}

/// Guard for the participant dashboard
pub fn require_auth(session: &SessionSnapshot) -> bool {
    session.is_authenticated()
}

/// Guard for the administration panel
pub fn require_admin(session: &SessionSnapshot) -> bool {
    session.is_authenticated() && session.is_admin()
}

pub fn find_route(path: &str) -> Option<&'static Route> {
    let normalized = match path.trim_end_matches('/') {
        "" => LANDING,
        trimmed => trimmed,
    };
    ROUTES.iter().find(|route| route.path == normalized)
}

pub fn find_route_by_name(name: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.name == name)
}

/// Decide whether `path` may be entered with the given session
pub fn resolve(path: &str, session: &SessionSnapshot) -> Navigation {
    let Some(route) = find_route(path) else {
        debug!("No route for {}", path);
        return Navigation::NotFound;
    };

    let allowed = match route.access {
        Access::Public => true,
        Access::Session => require_auth(session),
        Access::Admin => require_admin(session),
    };

    if allowed {
        Navigation::Allow(route)
    } else {
        warn!("Blocked navigation to {} ({:?})", route.path, route.access);
        Navigation::Redirect { to: LANDING }
    }
}
