//! Error types for the session layer.

use hopon_api::ApiError;
use hopon_protocol::ProtocolError;
use hopon_store::StoreError;

/// Errors surfaced to callers of explicit session operations.
///
/// Passive failures (the initial probe, 401-triggered refresh) are never
/// represented here — they are absorbed internally and only manifest as a
/// status change to `Guest`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A popup login is already pending. Only one may be in flight at a
    /// time; finish or cancel it before starting another.
    #[error("another login attempt is already in progress")]
    LoginInProgress,

    /// The host could not open the login window — most commonly a popup
    /// blocker.
    #[error("unable to open login window; check if pop-ups are blocked")]
    PopupBlocked,

    /// The login window was closed before authentication completed and
    /// no fallback payload was found in storage.
    #[error("authentication window closed")]
    WindowClosed,

    /// The login window disappeared out from under the flow — typically
    /// a logout while the login was still pending.
    #[error("authentication cancelled")]
    LoginCancelled,

    /// The popup produced a recognizable but unusable payload.
    #[error("invalid authentication payload: {0}")]
    InvalidHandoff(#[from] ProtocolError),

    /// The backend rejected or failed an explicit operation. Carries the
    /// backend's message verbatim.
    #[error(transparent)]
    Backend(#[from] ApiError),

    /// Durable storage failed while persisting guest state.
    #[error(transparent)]
    Store(#[from] StoreError),
}
