//! The session manager: the single source of truth for the current actor.
//!
//! # Concurrency note
//!
//! State commits happen behind short `std::sync` locks that are never
//! held across an `await` — the manager behaves like the single-threaded
//! UI model it replaces: transitions are serialized, and the only real
//! hazard is a *late* async completion, not a racing one. Two guards
//! cover that:
//!
//! - every commit path checks the teardown flag first, so a probe or
//!   popup result that arrives after [`shutdown`](SessionManager::shutdown)
//!   can no longer change state;
//! - recovery runs behind an async mutex, so simultaneous 401s from
//!   parallel requests collapse into one refresh instead of a stampede.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use hopon_api::TokenCell;
use hopon_protocol::{
    AuthPayload, Credentials, DemoLoginRequest, EventId, SignupRequest,
    UserProfile,
};
use hopon_store::{keys, ClientStore};

use crate::handshake::AuthWindow;
use crate::{AuthBackend, GuestVault, SessionConfig, SessionError, SessionStatus};

/// The mutable session record: status plus the user snapshot.
/// The access token lives in the shared [`TokenCell`], not here, because
/// the HTTP layer reads it directly.
#[derive(Debug)]
struct AuthState {
    status: SessionStatus,
    user: Option<UserProfile>,
}

/// Owns authentication state and mediates every transition.
///
/// Created once at application start (status `Loading`), shut down at
/// teardown. Generic over the backend and store seams so it can be
/// driven entirely by scripted fakes in tests.
pub struct SessionManager<B, S> {
    backend: Arc<B>,
    store: Arc<S>,
    token: TokenCell,
    config: SessionConfig,
    state: RwLock<AuthState>,
    guests: GuestVault<S>,
    /// The pending login popup, if any. Shared so `logout` can close a
    /// popup that `login_with_google` is still polling.
    pub(crate) popup: Mutex<Option<Box<dyn AuthWindow>>>,
    pub(crate) login_in_flight: AtomicBool,
    refresh_gate: tokio::sync::Mutex<()>,
    torn_down: AtomicBool,
}

impl<B: AuthBackend, S: ClientStore> SessionManager<B, S> {
    /// Creates a manager in the `Loading` state and hydrates guest
    /// bookkeeping from the store.
    pub fn new(
        backend: Arc<B>,
        store: Arc<S>,
        token: TokenCell,
        config: SessionConfig,
    ) -> Self {
        let guests = GuestVault::hydrate(Arc::clone(&store));
        Self {
            backend,
            store,
            token,
            config,
            state: RwLock::new(AuthState {
                status: SessionStatus::Loading,
                user: None,
            }),
            guests,
            popup: Mutex::new(None),
            login_in_flight: AtomicBool::new(false),
            refresh_gate: tokio::sync::Mutex::new(()),
            torn_down: AtomicBool::new(false),
        }
    }

    // -- State snapshots --------------------------------------------------

    /// The current authentication status.
    pub fn status(&self) -> SessionStatus {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
    }

    /// The current user profile snapshot, if authenticated.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    /// The current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.token.get()
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    // -- Initialization ---------------------------------------------------

    /// Runs the startup protocol: consume a pending handoff payload if
    /// one exists, otherwise probe the backend session; on any failure,
    /// settle on `Guest` rather than staying stuck in `Loading`.
    ///
    /// Returns the status the session settled on.
    pub async fn initialize(&self) -> SessionStatus {
        if let Some(payload) = self.pending_handoff() {
            // A popup from a previous page life wrote its result to
            // storage. Apply it and skip the network entirely.
            self.apply_payload(&payload);
            return self.status();
        }

        match self.backend.probe_session().await {
            Ok(probe) => match probe.into_payload() {
                Some(payload) => self.apply_payload(&payload),
                None => self.reset_to_guest(),
            },
            Err(error) => {
                tracing::debug!(%error, "session probe failed");
                self.reset_to_guest();
            }
        }
        self.status()
    }

    /// Reads and deletes the stored handoff payload, if present.
    ///
    /// The delete happens before parsing: whichever consumer takes the
    /// payload first leaves nothing behind, so a handoff is applied at
    /// most once even with both the init path and a popup poll looking
    /// for it.
    pub(crate) fn pending_handoff(&self) -> Option<AuthPayload> {
        let raw = match self.store.take(keys::AUTH_HANDOFF) {
            Ok(raw) => raw?,
            Err(error) => {
                tracing::warn!(%error, "could not read stored auth handoff");
                return None;
            }
        };
        match AuthPayload::from_json(&raw) {
            Ok(payload) => Some(payload),
            Err(error) => {
                tracing::warn!(%error, "discarding corrupt auth handoff");
                None
            }
        }
    }

    // -- Payload application ----------------------------------------------

    /// Applies an authentication payload — the single path by which
    /// external auth results enter the state.
    ///
    /// A present user and a present (non-empty) token each independently
    /// mark the session authenticated; either alone is enough to flip
    /// status. The payload-level `needs_username_setup` flag is
    /// normalized onto the stored user, defaulting to `false`.
    pub fn apply_payload(&self, payload: &AuthPayload) {
        if self.is_torn_down() {
            return;
        }

        let mut state =
            self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut authenticated = false;

        if let Some(user) = &payload.user {
            let mut user = user.clone();
            user.needs_username_setup =
                payload.needs_username_setup.unwrap_or(false);
            state.user = Some(user);
            authenticated = true;
        }
        if payload.has_access_token() {
            // `has_access_token` already rejected the empty string.
            if let Some(token) = &payload.access_token {
                self.token.set(token.clone());
            }
            authenticated = true;
        }

        if authenticated && state.status != SessionStatus::Authenticated {
            state.status = SessionStatus::Authenticated;
            tracing::info!("session authenticated");
        }
    }

    /// Drops user and token and settles on `Guest`. Guest bookkeeping is
    /// left untouched — it is an independent, durable identity.
    pub(crate) fn reset_to_guest(&self) {
        if self.is_torn_down() {
            return;
        }
        let mut state =
            self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.user = None;
        self.token.clear();
        if state.status != SessionStatus::Guest {
            state.status = SessionStatus::Guest;
            tracing::info!("session is now guest");
        }
    }

    // -- Credential operations --------------------------------------------

    /// Signs in with email and password.
    ///
    /// On failure the backend's message propagates verbatim and state is
    /// left exactly as it was.
    pub async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<(), SessionError> {
        let grant = self.backend.login(credentials).await?;
        self.apply_payload(&grant.into());
        Ok(())
    }

    /// Creates an account and signs in.
    pub async fn signup(
        &self,
        request: &SignupRequest,
    ) -> Result<(), SessionError> {
        let grant = self.backend.signup(request).await?;
        self.apply_payload(&grant.into());
        Ok(())
    }

    /// Development sign-in without the OAuth provider.
    pub async fn login_as_demo(
        &self,
        request: &DemoLoginRequest,
    ) -> Result<(), SessionError> {
        let grant = self.backend.demo_login(request).await?;
        self.apply_payload(&grant.into());
        Ok(())
    }

    /// Signs out. Always succeeds locally: the backend call is
    /// best-effort, any pending login popup is closed, and state resets
    /// to `Guest`. Calling it again is a no-op.
    pub async fn logout(&self) {
        if let Err(error) = self.backend.logout().await {
            tracing::debug!(
                %error,
                "logout request failed, clearing local session anyway"
            );
        }
        self.close_popup();
        self.reset_to_guest();
    }

    /// Replaces the stored user snapshot — for profile-editing flows that
    /// already hold the fresh profile. Ignored unless authenticated, so a
    /// stray update can't fabricate a session.
    pub fn replace_user(&self, user: UserProfile) {
        if self.is_torn_down() {
            return;
        }
        let mut state =
            self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.status == SessionStatus::Authenticated {
            state.user = Some(user);
        }
    }

    // -- Unauthorized recovery --------------------------------------------

    /// The 401 recovery protocol, registered with the HTTP layer at
    /// wiring time: attempt a silent refresh; on success apply the new
    /// grant and report `true` (the caller retries its request once); on
    /// any failure demote to `Guest` and report `false`.
    ///
    /// Serialized: concurrent 401s wait for the first recovery rather
    /// than each firing their own refresh.
    pub async fn recover_unauthorized(&self) -> bool {
        let _serialized = self.refresh_gate.lock().await;
        match self.backend.refresh_access_token().await {
            Ok(grant) => {
                if self.is_torn_down() {
                    return false;
                }
                self.apply_payload(&grant.into());
                tracing::info!("access token refreshed");
                true
            }
            Err(error) => {
                tracing::debug!(%error, "token refresh failed");
                self.reset_to_guest();
                false
            }
        }
    }

    // -- Guest bookkeeping ------------------------------------------------

    /// The guest display name, if one was chosen.
    pub fn guest_name(&self) -> Option<String> {
        self.guests.name()
    }

    /// Sets the guest display name.
    pub fn set_guest_name(&self, value: &str) -> Result<(), SessionError> {
        Ok(self.guests.set_name(value)?)
    }

    /// The guest token remembered for `event`, if any.
    pub fn guest_token(&self, event: EventId) -> Option<String> {
        self.guests.token(event)
    }

    /// Remembers a guest token handed out by an event join.
    pub fn remember_guest_token(
        &self,
        event: EventId,
        token: &str,
    ) -> Result<(), SessionError> {
        Ok(self.guests.remember(event, token)?)
    }

    /// Forgets the guest token for `event`.
    pub fn clear_guest_token(
        &self,
        event: EventId,
    ) -> Result<(), SessionError> {
        Ok(self.guests.clear(event)?)
    }

    /// Direct access to the guest vault.
    pub fn guests(&self) -> &GuestVault<S> {
        &self.guests
    }

    // -- Teardown ---------------------------------------------------------

    /// Marks the manager as torn down. Late-arriving async results (a
    /// slow probe, a popup completing after the app navigated away) will
    /// no longer commit state.
    pub fn shutdown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
        self.close_popup();
    }

    pub(crate) fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    /// Closes and forgets the pending login popup, if any. The polling
    /// login flow observes the empty slot and reports cancellation.
    pub(crate) fn close_popup(&self) {
        let mut slot =
            self.popup.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut window) = slot.take() {
            window.close();
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
