//! HTTP layer for the HopOn client SDK.
//!
//! This crate is the session manager's only collaborator with the outside
//! world: a thin, typed client over the backend's REST endpoints. Two
//! contracts live here and nowhere else:
//!
//! 1. **Bearer injection** — every request reads the shared [`TokenCell`]
//!    at send time and attaches `Authorization: Bearer …` when a token is
//!    present. The token is never captured when a request is *built*, so
//!    a retry always carries whatever the cell holds *now*.
//! 2. **Retry-once on 401** — when a retry-eligible request comes back
//!    `401 Unauthorized`, the registered unauthorized handler is invoked
//!    (the session layer's silent refresh). If, and only if, it reports
//!    success, the original request is rebuilt and sent exactly once
//!    more. There is no second recovery for the same request, and the
//!    refresh call itself is never retry-eligible.
//!
//! The handler is a field injected at wiring time, not module state — the
//! client is fully testable in isolation.

mod client;
mod error;
mod token;

pub use client::{ApiClient, UnauthorizedHandler};
pub use error::ApiError;
pub use token::TokenCell;
