//! The popup OAuth handshake.
//!
//! The session manager never opens windows itself — that's the host's
//! job (a webview shell, a browser bridge, a test). The host implements
//! [`WindowOpener`], and the manager drives the flow:
//!
//! ```text
//! login_with_google()
//!   ├─ open popup (None → PopupBlocked)
//!   └─ wait on either:
//!        message channel ──→ handoff envelope → apply → Ok
//!        │                   unrelated message → keep waiting
//!        │                   recognizable but incomplete → InvalidHandoff
//!        └ 500 ms close poll ──→ window gone → LoginCancelled
//!                                window closed → stored payload?
//!                                  yes → apply → Ok
//!                                  no  → WindowClosed
//! ```
//!
//! Two different channels can deliver the same logical event (the message
//! and the storage fallback); the stored payload is deleted the moment
//! either consumer reads it, so a handoff applies at most once.
//!
//! Closure is detected by polling rather than an event because not every
//! window host can report closure — and for a human-paced login flow,
//! 500 ms of detection latency is invisible.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::PoisonError;

use hopon_protocol::{AuthPayload, HandoffMessage};
use hopon_store::{keys, ClientStore};
use tokio::sync::mpsc;
use url::Url;

use crate::{AuthBackend, SessionError, SessionManager};

/// The window name the web client uses for the provider popup. Reusing
/// the name means a second open targets the existing window instead of
/// spawning a pile of them.
pub const POPUP_WINDOW_NAME: &str = "hopon-google-auth";

/// Everything a host needs to open the login popup.
#[derive(Debug, Clone)]
pub struct PopupSpec {
    /// The backend-hosted OAuth entry URL (redirect target embedded).
    pub url: Url,
    /// Window name, see [`POPUP_WINDOW_NAME`].
    pub name: &'static str,
    /// Requested window width in pixels.
    pub width: u32,
    /// Requested window height in pixels.
    pub height: u32,
}

/// A handle to an open login window.
///
/// Object-safe so the manager can hold the pending popup without knowing
/// the host's concrete type (`logout` closes it through this handle).
pub trait AuthWindow: Send + 'static {
    /// `true` once the window has been closed — by the user, by the
    /// provider flow finishing, or by [`close`](Self::close).
    fn is_closed(&self) -> bool;

    /// Closes the window. Closing an already-closed window is a no-op.
    fn close(&mut self);
}

/// Opens login windows and delivers their cross-window messages.
///
/// The returned receiver carries every message the window posts to its
/// opener, as raw JSON — unrelated traffic included. The handshake loop
/// does the filtering. If the host's messaging channel is unavailable
/// (some privacy configurations), it simply never sends; the storage
/// fallback covers that case.
pub trait WindowOpener: Send + Sync {
    type Window: AuthWindow;

    /// Opens a popup. Returns `None` when the window could not be opened
    /// — commonly a popup blocker.
    fn open(
        &self,
        spec: &PopupSpec,
    ) -> Option<(Self::Window, mpsc::Receiver<serde_json::Value>)>;
}

/// Resets the login-in-flight gate when the flow exits, however it exits.
struct LoginGate<'a> {
    flag: &'a AtomicBool,
}

impl Drop for LoginGate<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Closes and forgets the popup when the flow exits, however it exits.
/// `Drop` fires on success, on every error return, and on cancellation,
/// which is what guarantees "the popup is closed on every terminal
/// outcome".
struct PopupGuard<'a, B: AuthBackend, S: ClientStore> {
    manager: &'a SessionManager<B, S>,
}

impl<B: AuthBackend, S: ClientStore> Drop for PopupGuard<'_, B, S> {
    fn drop(&mut self) {
        self.manager.close_popup();
    }
}

impl<B: AuthBackend, S: ClientStore> SessionManager<B, S> {
    /// Runs the provider login flow through a host-opened popup.
    ///
    /// Resolves when the popup delivers a complete handoff (by message or
    /// by storage fallback after closing). Only one popup login may be in
    /// flight at a time; a second call fails fast with
    /// [`SessionError::LoginInProgress`] instead of orphaning the first.
    ///
    /// # Errors
    /// - [`SessionError::PopupBlocked`] — the window never opened
    /// - [`SessionError::WindowClosed`] — closed without completing
    /// - [`SessionError::LoginCancelled`] — e.g. `logout` during login
    /// - [`SessionError::InvalidHandoff`] — recognizable but unusable
    ///   payload
    pub async fn login_with_google<W: WindowOpener>(
        &self,
        opener: &W,
    ) -> Result<(), SessionError> {
        if self.login_in_flight.swap(true, Ordering::SeqCst) {
            return Err(SessionError::LoginInProgress);
        }
        let _gate = LoginGate {
            flag: &self.login_in_flight,
        };

        let spec = PopupSpec {
            url: self
                .backend()
                .google_login_url(&self.config().redirect_target),
            name: POPUP_WINDOW_NAME,
            width: self.config().popup_width,
            height: self.config().popup_height,
        };

        let Some((window, mut messages)) = opener.open(&spec) else {
            tracing::warn!("login window could not be opened");
            return Err(SessionError::PopupBlocked);
        };
        {
            let mut slot =
                self.popup.lock().unwrap_or_else(PoisonError::into_inner);
            *slot = Some(Box::new(window));
        }
        let _popup = PopupGuard { manager: self };

        tracing::debug!(url = %spec.url, "login popup opened");

        let mut poll =
            tokio::time::interval(self.config().popup_poll_interval);
        // The host may drop its sender (messaging blocked); after that
        // only the close poll can finish the flow.
        let mut channel_open = true;

        loop {
            tokio::select! {
                message = messages.recv(), if channel_open => {
                    match message {
                        None => channel_open = false,
                        Some(value) => {
                            match HandoffMessage::from_value(&value) {
                                // Not ours — windows receive unrelated
                                // messages all the time.
                                None => {}
                                Some(Err(error)) => {
                                    tracing::warn!(
                                        %error,
                                        "popup posted an invalid handoff"
                                    );
                                    return Err(error.into());
                                }
                                Some(Ok(handoff)) => {
                                    self.apply_payload(&handoff.payload);
                                    tracing::info!(
                                        "popup login completed via message"
                                    );
                                    return Ok(());
                                }
                            }
                        }
                    }
                }
                _ = poll.tick() => {
                    let closed = {
                        let slot = self
                            .popup
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner);
                        match slot.as_ref() {
                            // Someone took the window out from under us
                            // (logout, shutdown).
                            None => return Err(SessionError::LoginCancelled),
                            Some(window) => window.is_closed(),
                        }
                    };
                    if closed {
                        return self.consume_close_fallback();
                    }
                }
            }
        }
    }

    /// The popup closed before any message arrived: the completion page
    /// may have written its payload to storage instead (cross-window
    /// messaging can be blocked by browser privacy settings).
    fn consume_close_fallback(&self) -> Result<(), SessionError> {
        let raw = match self.store().take(keys::AUTH_HANDOFF) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(%error, "could not read stored auth handoff");
                None
            }
        };
        match raw {
            Some(raw) => match AuthPayload::from_json(&raw) {
                Ok(payload) => {
                    self.apply_payload(&payload);
                    tracing::info!(
                        "popup login completed via storage fallback"
                    );
                    Ok(())
                }
                Err(error) => Err(error.into()),
            },
            None => Err(SessionError::WindowClosed),
        }
    }
}
