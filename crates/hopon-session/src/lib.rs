//! Session lifecycle management for the HopOn client SDK.
//!
//! This crate owns the single source of truth for "who is the current
//! actor" and mediates every authentication transition:
//!
//! 1. **Status tracking** — `Loading` until the first session check
//!    resolves, then `Authenticated` or `Guest` ([`SessionStatus`])
//! 2. **Payload application** — the one path by which auth results enter
//!    local state, whatever channel they arrived on
//! 3. **The popup handshake** — provider login through a host-opened
//!    window, with a storage fallback when cross-window messaging is
//!    blocked ([`WindowOpener`] / [`AuthWindow`])
//! 4. **Unauthorized recovery** — the silent refresh the HTTP layer runs
//!    before giving up on a 401
//! 5. **Guest bookkeeping** — durable per-event join tokens for visitors
//!    who never sign in ([`GuestVault`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Application (above)   ← reads status/user, calls login/logout/signup
//!     ↕
//! Session layer (this crate)  ← the state machine and its transitions
//!     ↕
//! API layer (hopon-api)  ← performs the HTTP calls, reports 401s back
//! Store layer (hopon-store)  ← durable guest state and the auth handoff
//! ```

#![allow(async_fn_in_trait)]

mod backend;
mod config;
mod error;
mod guest;
mod handshake;
mod manager;
mod status;

pub use backend::AuthBackend;
pub use config::SessionConfig;
pub use error::SessionError;
pub use guest::GuestVault;
pub use handshake::{AuthWindow, PopupSpec, WindowOpener, POPUP_WINDOW_NAME};
pub use manager::SessionManager;
pub use status::SessionStatus;
