//! Durable client-side storage for the HopOn client SDK.
//!
//! The browser client keeps guest identity and the one-shot auth handoff
//! in `localStorage`. This crate is that storage boundary for the SDK: a
//! small string key → string value interface ([`ClientStore`]) with two
//! implementations:
//!
//! - [`MemoryStore`] — nothing survives the process. Used in tests and
//!   for hosts that don't want anything written to disk.
//! - [`JsonFileStore`] — a single JSON document on disk, written through
//!   on every mutation so state survives a restart the way `localStorage`
//!   survives a reload.
//!
//! Values are opaque strings; the session layer decides what's JSON
//! inside them. Keys are defined in [`keys`] and kept byte-identical to
//! the web client's, so an SDK host sharing a profile directory with a
//! webview sees the same state.

mod error;
mod json_file;
mod memory;

pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Well-known storage keys.
pub mod keys {
    /// Display name chosen by an unauthenticated visitor.
    pub const GUEST_NAME: &str = "hopon_guest_name";

    /// JSON object mapping event id → per-event guest join token.
    pub const GUEST_TOKENS: &str = "hopon_guest_tokens";

    /// One-shot auth handoff payload written by a popup that could not
    /// message its opener. Deleted immediately after being read.
    pub const AUTH_HANDOFF: &str = "hoponAuthPayload";
}

/// Durable string key → string value storage.
///
/// Implementations must be safe to share across tasks (`Send + Sync`) —
/// the session manager and the popup handshake both hold the store.
/// Operations are synchronous: backing stores are local (memory, a small
/// file), never a network round-trip.
pub trait ClientStore: Send + Sync + 'static {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Reads and immediately deletes the value under `key`.
    ///
    /// This is the at-most-once primitive for the auth handoff: whichever
    /// consumer takes the payload first leaves nothing for the other.
    fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self.get(key)?;
        if value.is_some() {
            self.remove(key)?;
        }
        Ok(value)
    }
}
