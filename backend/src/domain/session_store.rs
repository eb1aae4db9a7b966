use anyhow::Result;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use super::errors::{StoreError, StoreResult};
use super::revision::Revision;
use super::validation::require_non_blank;
use crate::storage::{keys, Storage};
use shared::{generate_token, LoginRequest, RegisterRequest, User, UserRole};

/// Email that signs in as the studio administrator during development
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@flowsyndicate.pl";

/// Consistent copy of the current identity and its token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl SessionSnapshot {
    /// Both identity and token are present
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }

    pub fn is_user(&self) -> bool {
        self.has_role(UserRole::User)
    }

    fn has_role(&self, role: UserRole) -> bool {
        self.user.as_ref().is_some_and(|user| user.role == role)
    }
}

#[derive(Default)]
struct SessionState {
    session: SessionSnapshot,
    error: Option<String>,
}

/// Holds the authenticated identity shared by every other store
#[derive(Clone)]
pub struct SessionStore {
    storage: Storage,
    admin_email: String,
    state: Arc<RwLock<SessionState>>,
    revision: Revision,
}

impl SessionStore {
    pub fn new(storage: Storage) -> Self {
        Self::with_admin_email(storage, DEFAULT_ADMIN_EMAIL)
    }

    /// Create a session store with a custom administrator email
    pub fn with_admin_email(storage: Storage, admin_email: impl Into<String>) -> Self {
        Self {
            storage,
            admin_email: admin_email.into().trim().to_lowercase(),
            state: Arc::new(RwLock::new(SessionState::default())),
            revision: Revision::new(),
        }
    }

    /// Register a new account and sign it in
    ///
    /// Returns `Ok(None)` when persistence failed; the reason is in `error()`.
    pub async fn register(&self, request: RegisterRequest) -> StoreResult<Option<User>> {
        require_non_blank(&request.email, "Email")?;
        require_non_blank(&request.phone, "Phone")?;

        let email = request.email.trim().to_string();
        info!("Registering account: {}", email);

        // Lookup and registry write happen under one lock so an email registers once
        let _registry = self.storage.lock_key(keys::USER_PREFIX).await;
        let existing = match self.find_registered(&email).await {
            Ok(existing) => existing,
            Err(e) => {
                self.record_failure("Registration failed", e).await;
                return Ok(None);
            }
        };
        if existing.is_some() {
            return Err(StoreError::validation(format!(
                "An account with email {} already exists",
                email
            )));
        }

        let now = Utc::now().to_rfc3339();
        let user = User {
            id: self.id_for(&email),
            role: self.role_for(&email),
            email,
            phone: request.phone.trim().to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        Ok(self.establish(user, "Registration").await)
    }

    /// Sign in by email
    ///
    /// A previously registered identity with the same email is reused so its
    /// participants and bookings stay reachable. Returns `Ok(None)` when
    /// persistence failed; the reason is in `error()`.
    pub async fn login(&self, request: LoginRequest) -> StoreResult<Option<User>> {
        require_non_blank(&request.email, "Email")?;

        let email = request.email.trim().to_string();
        info!("Signing in: {}", email);

        let _registry = self.storage.lock_key(keys::USER_PREFIX).await;
        let registered = match self.find_registered(&email).await {
            Ok(registered) => registered,
            Err(e) => {
                self.record_failure("Login failed", e).await;
                return Ok(None);
            }
        };

        let now = Utc::now().to_rfc3339();
        let user = match registered {
            Some(mut user) => {
                user.role = self.role_for(&user.email);
                user.updated_at = now;
                user
            }
            None => User {
                id: self.id_for(&email),
                role: self.role_for(&email),
                email,
                phone: String::new(),
                created_at: now.clone(),
                updated_at: now,
            },
        };

        Ok(self.establish(user, "Login").await)
    }

    /// Clear the current identity and its persisted copy. Idempotent.
    pub async fn logout(&self) {
        let mut state = self.state.write().await;
        state.error = None;
        self.clear_session(&mut state).await;
        drop(state);
        self.revision.bump();
    }

    /// Repopulate the session from storage at process start
    ///
    /// A corrupt or half-written stored session is cleared entirely.
    pub async fn restore_session(&self) {
        let mut state = self.state.write().await;
        state.error = None;

        let token = self.storage.get_raw(keys::AUTH_TOKEN).await;
        let raw_user = self.storage.get_raw(keys::AUTH_USER).await;

        match (token, raw_user) {
            (Ok(Some(token)), Ok(Some(raw_user))) => match serde_json::from_str::<User>(&raw_user) {
                Ok(user) if !token.trim().is_empty() => {
                    info!("Restored session for {}", user.email);
                    state.session = SessionSnapshot {
                        user: Some(user),
                        token: Some(token),
                    };
                }
                Ok(_) => {
                    warn!("Stored session token is empty, clearing session");
                    self.clear_session(&mut state).await;
                }
                Err(e) => {
                    warn!("Stored identity is corrupt ({}), clearing session", e);
                    self.clear_session(&mut state).await;
                }
            },
            (Ok(None), Ok(None)) => {
                debug!("No stored session");
                state.session = SessionSnapshot::default();
            }
            (Ok(_), Ok(_)) => {
                warn!("Stored session is incomplete, clearing session");
                self.clear_session(&mut state).await;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to read stored session: {}", e);
                state.session = SessionSnapshot::default();
                state.error = Some(format!("Failed to restore session: {}", e));
            }
        }

        drop(state);
        self.revision.bump();
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.session.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.session.user.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.session.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.session.is_authenticated()
    }

    pub async fn is_admin(&self) -> bool {
        self.state.read().await.session.is_admin()
    }

    pub async fn is_user(&self) -> bool {
        self.state.read().await.session.is_user()
    }

    /// Current identity, or `Unauthenticated`
    pub async fn require_user(&self) -> StoreResult<User> {
        self.current_user().await.ok_or(StoreError::Unauthenticated)
    }

    /// Current identity if it is an administrator, checked at call time
    pub async fn require_admin(&self) -> StoreResult<User> {
        let user = self.require_user().await?;
        if user.role != UserRole::Admin {
            warn!("Rejected admin operation for {}", user.email);
            return Err(StoreError::Forbidden);
        }
        Ok(user)
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

    fn is_admin_email(&self, email: &str) -> bool {
        email.trim().to_lowercase() == self.admin_email
    }

    fn role_for(&self, email: &str) -> UserRole {
        if self.is_admin_email(email) {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }

    fn id_for(&self, email: &str) -> String {
        if self.is_admin_email(email) {
            User::ADMIN_ID.to_string()
        } else {
            User::generate_id()
        }
    }

    /// Look up a registry entry by email, skipping unreadable entries
    async fn find_registered(&self, email: &str) -> Result<Option<User>> {
        for key in self.storage.keys_with_prefix(keys::USER_PREFIX).await? {
            match self.storage.read_json::<User>(&key).await {
                Ok(Some(user)) if user.email.eq_ignore_ascii_case(email) => return Ok(Some(user)),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable registry entry {}: {}", key, e),
            }
        }
        Ok(None)
    }

    /// Persist identity and token as one write, then make them current
    async fn establish(&self, user: User, action: &str) -> Option<User> {
        let token = generate_token();
        let mut state = self.state.write().await;
        state.error = None;

        let persisted = match session_entries(&user, &token) {
            Ok(entries) => self.storage.set_many(entries).await,
            Err(e) => Err(e),
        };

        match persisted {
            Ok(()) => {
                info!("{} succeeded for {} ({:?})", action, user.email, user.role);
                state.session = SessionSnapshot {
                    user: Some(user.clone()),
                    token: Some(token),
                };
                drop(state);
                self.revision.bump();
                Some(user)
            }
            Err(e) => {
                warn!("{} failed for {}: {}", action, user.email, e);
                state.error = Some(format!("{} failed: {}", action, e));
                None
            }
        }
    }

    async fn clear_session(&self, state: &mut SessionState) {
        state.session = SessionSnapshot::default();
        if let Err(e) = self
            .storage
            .remove_many(&[keys::AUTH_USER, keys::AUTH_TOKEN])
            .await
        {
            warn!("Failed to remove stored session: {}", e);
            state.error = Some(format!("Failed to clear stored session: {}", e));
        }
    }

    async fn record_failure(&self, context: &str, error: anyhow::Error) {
        warn!("{}: {}", context, error);
        self.state.write().await.error = Some(format!("{}: {}", context, error));
    }
}

fn session_entries(user: &User, token: &str) -> Result<Vec<(String, String)>> {
    let user_json = serde_json::to_string(user)?;
    Ok(vec![
        (keys::AUTH_USER.to_string(), user_json.clone()),
        (keys::AUTH_TOKEN.to_string(), token.to_string()),
        (keys::user(&user.id), user_json),
    ])
}
