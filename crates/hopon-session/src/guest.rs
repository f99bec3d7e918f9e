//! Guest bookkeeping: durable identity for visitors who never sign in.
//!
//! A guest who joins an event gets a per-event token from the backend.
//! That token is the *only* proof this device is the same guest — there
//! is no server-side session to fall back on, and a lost token is
//! unrecoverable by design. So every mutation is written through to the
//! durable store immediately, and the vault survives both reloads and
//! `Authenticated` ↔ `Guest` transitions (logout does not clear it).

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use hopon_protocol::EventId;
use hopon_store::{keys, ClientStore, StoreError};

/// The durable guest state: a display name and an event → token map.
///
/// Reads come from the in-memory copy; writes go through to the store
/// before returning. Hydration happens once, at construction.
#[derive(Debug)]
pub struct GuestVault<S> {
    store: Arc<S>,
    name: RwLock<Option<String>>,
    tokens: RwLock<HashMap<EventId, String>>,
}

impl<S: ClientStore> GuestVault<S> {
    /// Loads guest state from the store.
    ///
    /// A corrupt token map is discarded (and its key removed) rather than
    /// surfaced — matching how the web client recovers from a bad
    /// `localStorage` entry. Store read failures hydrate empty.
    pub fn hydrate(store: Arc<S>) -> Self {
        let name = match store.get(keys::GUEST_NAME) {
            Ok(name) => name,
            Err(error) => {
                tracing::warn!(%error, "could not read guest name");
                None
            }
        };

        let tokens = match store.get(keys::GUEST_TOKENS) {
            Ok(Some(raw)) => {
                match serde_json::from_str::<HashMap<EventId, String>>(&raw) {
                    Ok(tokens) => tokens,
                    Err(error) => {
                        tracing::warn!(
                            %error,
                            "discarding corrupt guest token map"
                        );
                        let _ = store.remove(keys::GUEST_TOKENS);
                        HashMap::new()
                    }
                }
            }
            Ok(None) => HashMap::new(),
            Err(error) => {
                tracing::warn!(%error, "could not read guest token map");
                HashMap::new()
            }
        };

        Self {
            store,
            name: RwLock::new(name),
            tokens: RwLock::new(tokens),
        }
    }

    /// The guest's chosen display name, if any.
    pub fn name(&self) -> Option<String> {
        self.name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sets the display name and persists it.
    pub fn set_name(&self, value: &str) -> Result<(), StoreError> {
        let mut name =
            self.name.write().unwrap_or_else(PoisonError::into_inner);
        *name = Some(value.to_string());
        self.store.set(keys::GUEST_NAME, value)
    }

    /// The guest token remembered for `event`, if any.
    pub fn token(&self, event: EventId) -> Option<String> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event)
            .cloned()
    }

    /// Remembers `token` for `event` and persists the map.
    pub fn remember(
        &self,
        event: EventId,
        token: &str,
    ) -> Result<(), StoreError> {
        let mut tokens =
            self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        tokens.insert(event, token.to_string());
        self.persist(&tokens)
    }

    /// Forgets the token for `event`. A no-op (no write) when no token
    /// is held.
    pub fn clear(&self, event: EventId) -> Result<(), StoreError> {
        let mut tokens =
            self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        if tokens.remove(&event).is_none() {
            return Ok(());
        }
        self.persist(&tokens)
    }

    /// A snapshot of the full event → token map.
    pub fn tokens(&self) -> HashMap<EventId, String> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn persist(
        &self,
        tokens: &HashMap<EventId, String>,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(tokens)?;
        self.store.set(keys::GUEST_TOKENS, &raw)
    }
}

// =========================================================================
// Tests
// =========================================================================
