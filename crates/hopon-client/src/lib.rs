//! # HopOn client SDK
//!
//! A headless client for the HopOn pickup-sports backend: session
//! lifecycle (probe, credential and popup logins, silent token refresh,
//! guest identity) plus a typed API client with retry-once handling of
//! unauthorized responses.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use hopon_client::HopOnClientBuilder;
//!
//! # async fn run() -> Result<(), hopon_client::ClientError> {
//! let client = HopOnClientBuilder::new()
//!     .base_url("http://localhost:8000")
//!     .store_path("hopon-state.json")
//!     .build()?;
//!
//! let status = client.initialize().await;
//! println!("session status: {status}");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{HopOnClient, HopOnClientBuilder};
pub use error::ClientError;

// Re-export the layer crates so hosts can depend on `hopon-client` alone.
pub use hopon_api::{ApiClient, ApiError, TokenCell, UnauthorizedHandler};
pub use hopon_protocol as protocol;
pub use hopon_session::{
    AuthBackend, AuthWindow, GuestVault, PopupSpec, SessionConfig,
    SessionError, SessionManager, SessionStatus, WindowOpener,
    POPUP_WINDOW_NAME,
};
pub use hopon_store::{
    keys, ClientStore, JsonFileStore, MemoryStore, StoreError,
};
