//! The shared access-token cell.

use std::sync::{Arc, PoisonError, RwLock};

/// A shared slot holding the current access token, if any.
///
/// One cell is created per client and handed to both the session manager
/// (which writes it on every auth transition) and the [`ApiClient`]
/// (which reads it on every outgoing request). Cloning is cheap — clones
/// share the same slot.
///
/// The token lives only in this cell for the life of the process; it is
/// never written to durable storage. A restart re-derives it through the
/// session probe or a stored handoff payload.
///
/// [`ApiClient`]: crate::ApiClient
#[derive(Debug, Clone, Default)]
pub struct TokenCell {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenCell {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current token, if one is set.
    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the token.
    pub fn set(&self, token: impl Into<String>) {
        let mut slot =
            self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(token.into());
    }

    /// Clears the token.
    pub fn clear(&self) {
        let mut slot =
            self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    /// `true` if a token is currently set.
    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
