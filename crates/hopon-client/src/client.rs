//! `HopOnClient` builder and wiring.
//!
//! This is where the layers get tied together: one [`TokenCell`] shared
//! between the API client and the session manager, and the unauthorized
//! handler registered so a 401 anywhere flows into the session's silent
//! refresh. Hosts never do this wiring themselves.

use std::path::PathBuf;
use std::sync::Arc;

use hopon_api::{ApiClient, TokenCell, UnauthorizedHandler};
use hopon_protocol::{
    EventId, JoinEventRequest, JoinEventResponse, LeaveEventRequest,
};
use hopon_session::{SessionConfig, SessionManager, SessionStatus};
use hopon_store::{ClientStore, JsonFileStore};

use crate::ClientError;

/// Builder for configuring and constructing a [`HopOnClient`].
///
/// # Example
///
/// ```rust,no_run
/// use hopon_client::HopOnClientBuilder;
///
/// # fn run() -> Result<(), hopon_client::ClientError> {
/// let client = HopOnClientBuilder::new()
///     .base_url("https://api.hopon.example")
///     .redirect_target("https://app.hopon.example")
///     .store_path("/var/lib/myapp/hopon-state.json")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct HopOnClientBuilder {
    base_url: String,
    store_path: PathBuf,
    session_config: SessionConfig,
}

impl HopOnClientBuilder {
    /// Creates a builder with development defaults (local backend,
    /// state file in the working directory).
    pub fn new() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            store_path: PathBuf::from("hopon-state.json"),
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the backend base URL.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Sets the post-auth redirect target embedded in the OAuth entry
    /// URL (the web client passes its own origin here).
    pub fn redirect_target(mut self, target: &str) -> Self {
        self.session_config.redirect_target = target.to_string();
        self
    }

    /// Sets where durable client state (guest identity, auth handoff)
    /// is kept.
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Replaces the whole session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Builds a client backed by a [`JsonFileStore`] at the configured
    /// path.
    pub fn build(self) -> Result<HopOnClient<JsonFileStore>, ClientError> {
        let store = JsonFileStore::open(&self.store_path);
        self.build_with_store(store)
    }

    /// Builds a client over a caller-provided store — an in-memory store
    /// for tests, or a host-specific durable backend.
    pub fn build_with_store<S: ClientStore>(
        self,
        store: S,
    ) -> Result<HopOnClient<S>, ClientError> {
        let token = TokenCell::new();
        let api = Arc::new(ApiClient::new(&self.base_url, token.clone())?);
        let session = Arc::new(SessionManager::new(
            Arc::clone(&api),
            Arc::new(store),
            token,
            self.session_config,
        ));

        // The handler holds a Weak reference: once the session manager is
        // dropped or torn down, a late 401 finds nothing to recover and
        // simply reports failure.
        let weak = Arc::downgrade(&session);
        let handler: UnauthorizedHandler = Arc::new(move || {
            let weak = weak.clone();
            Box::pin(async move {
                match weak.upgrade() {
                    Some(session) => session.recover_unauthorized().await,
                    None => false,
                }
            })
        });
        api.register_unauthorized_handler(handler);

        tracing::debug!(base_url = %api.base_url(), "HopOn client wired");
        Ok(HopOnClient { api, session })
    }
}

impl Default for HopOnClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A wired HopOn client: the typed API plus the session manager that
/// owns authentication state.
pub struct HopOnClient<S = JsonFileStore> {
    api: Arc<ApiClient>,
    session: Arc<SessionManager<ApiClient, S>>,
}

impl<S: ClientStore> HopOnClient<S> {
    /// Creates a new builder.
    pub fn builder() -> HopOnClientBuilder {
        HopOnClientBuilder::new()
    }

    /// The typed API client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The session manager.
    pub fn session(&self) -> &SessionManager<ApiClient, S> {
        &self.session
    }

    /// Runs the session startup protocol. See
    /// [`SessionManager::initialize`].
    pub async fn initialize(&self) -> SessionStatus {
        self.session.initialize().await
    }

    /// Tears the session down; late async results no longer commit.
    pub fn shutdown(&self) {
        self.session.shutdown();
    }

    // -- Event participation ----------------------------------------------
    //
    // Joining and leaving are the operations the guest vault exists for,
    // so the client wires the two together: tokens handed out on join are
    // remembered, remembered tokens are presented on join/leave, and a
    // completed leave forgets its token.

    /// Joins an event, presenting the remembered guest token when one is
    /// held, and remembering any token the backend hands back.
    pub async fn join_event(
        &self,
        event: EventId,
        player_name: Option<&str>,
    ) -> Result<JoinEventResponse, ClientError> {
        let request = JoinEventRequest {
            player_name: player_name.map(str::to_string),
            team: None,
            guest_token: self.session.guest_token(event),
        };
        let response = self.api.join_event(event, &request).await?;
        if let Some(token) = &response.guest_token {
            self.session.remember_guest_token(event, token)?;
        }
        Ok(response)
    }

    /// Leaves an event, presenting the remembered guest token, and
    /// forgetting it once the backend confirms.
    pub async fn leave_event(
        &self,
        event: EventId,
    ) -> Result<(), ClientError> {
        let request = LeaveEventRequest {
            guest_token: self.session.guest_token(event),
        };
        self.api.leave_event(event, &request).await?;
        self.session.clear_guest_token(event)?;
        Ok(())
    }
}
