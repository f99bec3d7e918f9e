//! Session behavior configuration.

use std::time::Duration;

/// Configuration for session behavior.
///
/// Hosts can start from `SessionConfig::default()` and override just the
/// fields they care about.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Where the provider flow should send the user after completing
    /// authentication — embedded as the `next` parameter of the OAuth
    /// entry URL. The web client passes its own origin; an SDK host must
    /// say explicitly where "back to the app" is.
    pub redirect_target: String,

    /// How often the login flow checks whether the popup was closed.
    ///
    /// Closure is polled, not event-driven — 500 ms is imperceptible
    /// against a human-paced login.
    pub popup_poll_interval: Duration,

    /// Requested popup window width in pixels.
    pub popup_width: u32,

    /// Requested popup window height in pixels.
    pub popup_height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            redirect_target: "http://localhost:3000".to_string(),
            popup_poll_interval: Duration::from_millis(500),
            popup_width: 500,
            popup_height: 600,
        }
    }
}
