//! Integration tests for the popup login flow, driven through a mock
//! window host: message delivery, the storage fallback, blockers,
//! cancellation, and the one-login-at-a-time guard.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hopon_api::{ApiError, TokenCell};
use hopon_protocol::{
    Credentials, DemoLoginRequest, SessionProbe, SignupRequest, TokenGrant,
    HANDOFF_MESSAGE_TYPE,
};
use hopon_session::{
    AuthBackend, AuthWindow, PopupSpec, SessionConfig, SessionError,
    SessionManager, SessionStatus, WindowOpener,
};
use hopon_store::{keys, ClientStore, MemoryStore};
use tokio::sync::mpsc;
use url::Url;

// =========================================================================
// Minimal backend (the popup flow only needs the login URL)
// =========================================================================

struct UrlOnlyBackend;

fn offline() -> ApiError {
    ApiError::Backend {
        status: 503,
        message: "offline".into(),
    }
}

impl AuthBackend for UrlOnlyBackend {
    async fn probe_session(&self) -> Result<SessionProbe, ApiError> {
        Err(offline())
    }
    async fn login(
        &self,
        _credentials: &Credentials,
    ) -> Result<TokenGrant, ApiError> {
        Err(offline())
    }
    async fn signup(
        &self,
        _request: &SignupRequest,
    ) -> Result<TokenGrant, ApiError> {
        Err(offline())
    }
    async fn demo_login(
        &self,
        _request: &DemoLoginRequest,
    ) -> Result<TokenGrant, ApiError> {
        Err(offline())
    }
    async fn refresh_access_token(&self) -> Result<TokenGrant, ApiError> {
        Err(offline())
    }
    async fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }
    fn google_login_url(&self, next: &str) -> Url {
        let mut url = Url::parse("http://localhost:8000/auth/google/login")
            .expect("static URL parses");
        url.query_pairs_mut().append_pair("next", next);
        url
    }
}

// =========================================================================
// Mock window host
// =========================================================================

struct MockWindow {
    closed: Arc<AtomicBool>,
}

impl AuthWindow for MockWindow {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A handle the test keeps for driving an opened window: flip the closed
/// flag, post messages.
struct WindowHandle {
    closed: Arc<AtomicBool>,
    messages: mpsc::Sender<serde_json::Value>,
}

struct MockOpener {
    /// `true` simulates a popup blocker: `open` returns `None`.
    blocked: bool,
    opened: Mutex<VecDeque<WindowHandle>>,
    urls: Mutex<Vec<Url>>,
}

impl MockOpener {
    fn new() -> Self {
        Self {
            blocked: false,
            opened: Mutex::new(VecDeque::new()),
            urls: Mutex::new(Vec::new()),
        }
    }

    fn blocked() -> Self {
        Self {
            blocked: true,
            ..Self::new()
        }
    }

    /// Waits (briefly) for the flow to open a window and hands back its
    /// driving handle.
    async fn window(&self) -> WindowHandle {
        for _ in 0..100 {
            if let Some(handle) = self.opened.lock().unwrap().pop_front() {
                return handle;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("login flow never opened a window");
    }
}

impl WindowOpener for MockOpener {
    type Window = MockWindow;

    fn open(
        &self,
        spec: &PopupSpec,
    ) -> Option<(MockWindow, mpsc::Receiver<serde_json::Value>)> {
        if self.blocked {
            return None;
        }
        self.urls.lock().unwrap().push(spec.url.clone());
        let closed = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel(8);
        self.opened.lock().unwrap().push_back(WindowHandle {
            closed: Arc::clone(&closed),
            messages: tx,
        });
        Some((MockWindow { closed }, rx))
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn manager(
    store: Arc<MemoryStore>,
) -> SessionManager<UrlOnlyBackend, MemoryStore> {
    // A short poll interval keeps the closed-window tests fast; the
    // production default is 500 ms.
    let config = SessionConfig {
        popup_poll_interval: Duration::from_millis(10),
        ..SessionConfig::default()
    };
    SessionManager::new(
        Arc::new(UrlOnlyBackend),
        store,
        TokenCell::new(),
        config,
    )
}

fn handoff_message(token: &str) -> serde_json::Value {
    serde_json::json!({
        "type": HANDOFF_MESSAGE_TYPE,
        "payload": {
            "user": {"id": 1, "username": "ana", "email": "a@example.com"},
            "access_token": token,
        },
    })
}

// =========================================================================
// Flow outcomes
// =========================================================================

#[tokio::test]
async fn test_login_with_google_blocked_popup_rejects_immediately() {
    let mgr = manager(Arc::new(MemoryStore::new()));
    let opener = MockOpener::blocked();

    let result = mgr.login_with_google(&opener).await;

    assert!(matches!(result, Err(SessionError::PopupBlocked)));
    assert_eq!(mgr.status(), SessionStatus::Loading);
}

#[tokio::test]
async fn test_login_with_google_message_completes_login() {
    let mgr = manager(Arc::new(MemoryStore::new()));
    let opener = MockOpener::new();

    let (result, handle) = tokio::join!(mgr.login_with_google(&opener), async {
        let handle = opener.window().await;
        handle
            .messages
            .send(handoff_message("tok-popup"))
            .await
            .expect("flow is listening");
        handle
    });

    result.expect("login should succeed");
    assert_eq!(mgr.status(), SessionStatus::Authenticated);
    assert_eq!(mgr.access_token().as_deref(), Some("tok-popup"));
    assert!(
        handle.closed.load(Ordering::SeqCst),
        "popup must be closed on success"
    );
}

#[tokio::test]
async fn test_login_with_google_ignores_unrelated_messages() {
    let mgr = manager(Arc::new(MemoryStore::new()));
    let opener = MockOpener::new();

    let (result, _) = tokio::join!(mgr.login_with_google(&opener), async {
        let handle = opener.window().await;
        // Noise first — devtools chatter, other frames, wrong tags.
        handle
            .messages
            .send(serde_json::json!({"source": "devtools"}))
            .await
            .unwrap();
        handle
            .messages
            .send(serde_json::json!({"type": "other:thing"}))
            .await
            .unwrap();
        handle
            .messages
            .send(handoff_message("tok-after-noise"))
            .await
            .unwrap();
    });

    result.expect("noise must not abort the flow");
    assert_eq!(mgr.access_token().as_deref(), Some("tok-after-noise"));
}

#[tokio::test]
async fn test_login_with_google_incomplete_payload_rejects() {
    let mgr = manager(Arc::new(MemoryStore::new()));
    let opener = MockOpener::new();

    let (result, handle) = tokio::join!(mgr.login_with_google(&opener), async {
        let handle = opener.window().await;
        // Recognizably ours, but missing the token.
        handle
            .messages
            .send(serde_json::json!({
                "type": HANDOFF_MESSAGE_TYPE,
                "payload": {
                    "user": {"id": 1, "username": "ana", "email": "a@example.com"},
                },
            }))
            .await
            .unwrap();
        handle
    });

    assert!(matches!(result, Err(SessionError::InvalidHandoff(_))));
    // No partial commit.
    assert_eq!(mgr.status(), SessionStatus::Loading);
    assert!(mgr.access_token().is_none());
    assert!(handle.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_login_with_google_closed_with_stored_payload_succeeds() {
    let store = Arc::new(MemoryStore::new());
    let mgr = manager(Arc::clone(&store));
    let opener = MockOpener::new();

    let (result, _) = tokio::join!(mgr.login_with_google(&opener), async {
        let handle = opener.window().await;
        // The popup couldn't message its opener, so it wrote the payload
        // to storage and closed itself.
        store
            .set(
                keys::AUTH_HANDOFF,
                &serde_json::json!({
                    "user": {"id": 2, "username": "bo", "email": "b@example.com"},
                    "access_token": "tok-fallback",
                })
                .to_string(),
            )
            .unwrap();
        handle.closed.store(true, Ordering::SeqCst);
    });

    result.expect("storage fallback should complete the login");
    assert_eq!(mgr.status(), SessionStatus::Authenticated);
    assert_eq!(mgr.access_token().as_deref(), Some("tok-fallback"));
    assert!(
        store.get(keys::AUTH_HANDOFF).unwrap().is_none(),
        "fallback payload is one-shot"
    );
}

#[tokio::test]
async fn test_login_with_google_closed_without_payload_rejects() {
    let mgr = manager(Arc::new(MemoryStore::new()));
    let opener = MockOpener::new();

    let (result, _) = tokio::join!(mgr.login_with_google(&opener), async {
        let handle = opener.window().await;
        handle.closed.store(true, Ordering::SeqCst);
    });

    assert!(matches!(result, Err(SessionError::WindowClosed)));
    assert_eq!(mgr.status(), SessionStatus::Loading);
}

#[tokio::test]
async fn test_login_with_google_second_call_rejected_while_pending() {
    let mgr = manager(Arc::new(MemoryStore::new()));
    let opener = MockOpener::new();

    let (first, second) = tokio::join!(mgr.login_with_google(&opener), async {
        let handle = opener.window().await;
        // While the first flow is pending, a second attempt must fail
        // fast instead of orphaning the first caller.
        let second = mgr.login_with_google(&opener).await;
        // Let the first flow finish.
        handle.messages.send(handoff_message("tok")).await.unwrap();
        second
    });

    first.expect("first login should complete");
    assert!(matches!(second, Err(SessionError::LoginInProgress)));
}

#[tokio::test]
async fn test_logout_during_login_cancels_the_flow() {
    let mgr = manager(Arc::new(MemoryStore::new()));
    let opener = MockOpener::new();

    let (result, _) = tokio::join!(mgr.login_with_google(&opener), async {
        let handle = opener.window().await;
        mgr.logout().await;
        assert!(
            handle.closed.load(Ordering::SeqCst),
            "logout must close the pending popup"
        );
    });

    assert!(matches!(result, Err(SessionError::LoginCancelled)));
    assert_eq!(mgr.status(), SessionStatus::Guest);
}

#[tokio::test]
async fn test_login_with_google_embeds_redirect_target() {
    let store = Arc::new(MemoryStore::new());
    let config = SessionConfig {
        redirect_target: "https://app.example.com/welcome".into(),
        popup_poll_interval: Duration::from_millis(10),
        ..SessionConfig::default()
    };
    let mgr = SessionManager::new(
        Arc::new(UrlOnlyBackend),
        store,
        TokenCell::new(),
        config,
    );
    let opener = MockOpener::new();

    let (_, url) = tokio::join!(mgr.login_with_google(&opener), async {
        let handle = opener.window().await;
        handle.closed.store(true, Ordering::SeqCst);
        opener.urls.lock().unwrap().first().cloned()
    });

    let url = url.expect("a window was opened");
    assert_eq!(
        url.query_pairs()
            .find(|(k, _)| k == "next")
            .map(|(_, v)| v.into_owned())
            .as_deref(),
        Some("https://app.example.com/welcome")
    );
}

#[tokio::test]
async fn test_login_with_google_channel_dropped_then_closed() {
    // Messaging unavailable entirely: the host drops the sender right
    // away. The flow must keep polling and still honor the fallback.
    let store = Arc::new(MemoryStore::new());
    let mgr = manager(Arc::clone(&store));
    let opener = MockOpener::new();

    let (result, _) = tokio::join!(mgr.login_with_google(&opener), async {
        let handle = opener.window().await;
        drop(handle.messages);
        tokio::time::sleep(Duration::from_millis(20)).await;
        store
            .set(
                keys::AUTH_HANDOFF,
                &serde_json::json!({
                    "user": {"id": 3, "username": "cy", "email": "c@example.com"},
                    "access_token": "tok-late",
                })
                .to_string(),
            )
            .unwrap();
        handle.closed.store(true, Ordering::SeqCst);
    });

    result.expect("fallback still works without a message channel");
    assert_eq!(mgr.access_token().as_deref(), Some("tok-late"));
}
