// ============================================================================
// SESSION STORE - Single source of truth for "who is logged in"
// ============================================================================
// Persisted layout: `token` -> raw credential, `user` -> JSON profile.
// Both keys are written by login() and deleted by logout(), and only read
// once, when the store is initialised.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::models::{AuthResponse, LogoutReason, Session, UserProfile, VerifyOtpRequest};
use crate::services::{ApiClient, AuthApi};
use crate::state::reactivity::Subscribers;
use crate::utils::{remove_all, save_to_storage, KeyValueStorage, STORAGE_KEY_TOKEN, STORAGE_KEY_USER};

/// Result of an OTP verification that reached the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct OtpVerification {
    /// Response body exactly as the backend sent it.
    pub body: Map<String, Value>,
    /// Whether this response logged the user in.
    pub session_established: bool,
}

#[derive(Clone)]
pub struct SessionStore {
    session: Rc<RefCell<Session>>,
    generation: Rc<Cell<u64>>,
    storage: Rc<dyn KeyValueStorage>,
    subscribers: Rc<Subscribers<Session>>,
}

impl SessionStore {
    /// Restores the persisted session. Inconsistent persisted state is cleared
    /// and the store starts logged out.
    pub fn initialize(storage: Rc<dyn KeyValueStorage>) -> Self {
        let store = Self {
            session: Rc::new(RefCell::new(Session::loading())),
            generation: Rc::new(Cell::new(0)),
            storage,
            subscribers: Rc::new(Subscribers::new()),
        };

        let restored = restore_session(store.storage.as_ref());
        if restored.is_authenticated() {
            log::info!(
                "💾 [SESSION] Session restored for {}",
                restored.user.as_ref().map(UserProfile::display_name).unwrap_or_default()
            );
        }
        *store.session.borrow_mut() = restored;
        store
    }

    pub fn login(&self, token: impl Into<String>, user: UserProfile) {
        let token = token.into();
        if token.is_empty() {
            log::warn!("⚠️ [SESSION] Ignoring login without a credential");
            return;
        }

        if let Err(e) = self.storage.set_item(STORAGE_KEY_TOKEN, &token) {
            log::error!("❌ [SESSION] Could not persist token: {}", e);
        }
        if let Err(e) = save_to_storage(self.storage.as_ref(), STORAGE_KEY_USER, &user) {
            log::error!("❌ [SESSION] Could not persist user: {}", e);
            // Never leave a token persisted without its user
            if let Err(e) = self.storage.remove_item(STORAGE_KEY_TOKEN) {
                log::error!("❌ [SESSION] Could not remove orphaned token: {}", e);
            }
        }

        log::info!("🔓 [SESSION] Logged in as {}", user.display_name());
        *self.session.borrow_mut() = Session::active(token, user);
        self.bump_generation();
        self.notify();
    }

    pub fn logout(&self) {
        self.logout_with_reason(LogoutReason::Manual);
    }

    /// Ends the session. Safe to call when already logged out.
    pub fn logout_with_reason(&self, reason: LogoutReason) {
        if let Err(e) = remove_all(self.storage.as_ref(), &[STORAGE_KEY_TOKEN, STORAGE_KEY_USER]) {
            log::error!("❌ [SESSION] Could not clear persisted session: {}", e);
        }

        let was_active = {
            let session = self.session.borrow();
            session.token.is_some() || session.user.is_some()
        };
        if !was_active {
            log::debug!("👋 [SESSION] Logout ({}) with no active session", reason);
            return;
        }

        log::info!("👋 [SESSION] Logged out ({})", reason);
        *self.session.borrow_mut() = Session::default();
        self.bump_generation();
        self.notify();
    }

    /// Verifies an OTP and, when the backend issues a credential, logs in with
    /// the remaining response fields as the profile.
    ///
    /// The raw response body is returned whether or not a session was
    /// established; failures are returned unchanged.
    pub async fn verify_otp<A: AuthApi>(
        &self,
        api: &A,
        email: &str,
        code: &str,
    ) -> Result<OtpVerification, ApiError> {
        let generation = self.generation();
        let request = VerifyOtpRequest {
            email: email.to_string(),
            otp: code.to_string(),
        };
        let body = api.verify_otp(&request).await?;
        let session_established = self.apply_auth_response(generation, AuthResponse::from_body(&body));
        Ok(OtpVerification {
            body,
            session_established,
        })
    }

    /// Logs in with the credential carried by `response`, unless the session
    /// changed since `generation` was read. Returns whether a session was
    /// established.
    pub fn apply_auth_response(&self, generation: u64, response: AuthResponse) -> bool {
        match response {
            AuthResponse::Authenticated { token, user } => {
                if generation != self.generation() {
                    log::warn!("⚠️ [SESSION] Discarding credential from a response issued before the session changed");
                    return false;
                }
                self.login(token, user);
                true
            }
            AuthResponse::Pending => {
                log::info!("ℹ️ [SESSION] Response carried no credential");
                false
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.session.borrow().loading
    }

    pub fn token(&self) -> Option<String> {
        self.session.borrow().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.session.borrow().user.clone()
    }

    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Bumped on every login and on every logout that ended a session.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Client that sends the current credential as a bearer token.
    pub fn authorized_client(&self, api: &ApiClient) -> ApiClient {
        api.with_token(self.token())
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&Session) + 'static,
    {
        self.subscribers.subscribe(callback);
    }

    fn bump_generation(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
    }

    fn notify(&self) {
        let snapshot = self.session();
        self.subscribers.notify(&snapshot);
    }
}

fn restore_session(storage: &dyn KeyValueStorage) -> Session {
    let token = storage.get_item(STORAGE_KEY_TOKEN);
    let user = storage.get_item(STORAGE_KEY_USER);

    let restored = match (token, user) {
        (None, None) => return Session::default(),
        (Some(token), Some(raw_user)) if !token.is_empty() => match parse_user(&raw_user) {
            Some(user) => Some(Session::active(token, user)),
            None => {
                log::warn!("⚠️ [SESSION] Invalid session data in storage, clearing it");
                None
            }
        },
        _ => {
            log::warn!("⚠️ [SESSION] Token and user are not both persisted, clearing them");
            None
        }
    };

    restored.unwrap_or_else(|| {
        if let Err(e) = remove_all(storage, &[STORAGE_KEY_TOKEN, STORAGE_KEY_USER]) {
            log::error!("❌ [SESSION] Could not clear persisted session: {}", e);
        }
        Session::default()
    })
}

fn parse_user(raw: &str) -> Option<UserProfile> {
    if raw == "undefined" {
        return None;
    }
    serde_json::from_str(raw).ok()
}
