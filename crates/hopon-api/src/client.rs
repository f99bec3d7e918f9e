//! The typed backend client.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

use hopon_protocol::{
    AccountSetupRequest, AccountSetupResponse, Credentials,
    DemoLoginRequest, EventId, JoinEventRequest, JoinEventResponse,
    LeaveEventRequest, SessionProbe, SignupRequest, SportEvent, TokenGrant,
    UsernameAvailability,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{ApiError, TokenCell};

/// Callback invoked when a request returns `401 Unauthorized`.
///
/// Registered once at wiring time by the session layer. Returns `true`
/// when recovery succeeded and the original request should be retried
/// exactly once; `false` when the caller must give up and surface the
/// failure.
pub type UnauthorizedHandler =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = bool> + Send>> + Send + Sync>;

/// Whether a request participates in unauthorized recovery.
///
/// Everything is `Once` except the refresh call itself: a refresh that
/// comes back 401 must fail cleanly, not recurse into another refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryPolicy {
    Once,
    Never,
}

/// Typed client for the HopOn backend REST API.
///
/// Holds the base URL, the shared [`TokenCell`], and the registered
/// unauthorized handler. All state is instance-owned — two clients in the
/// same process are fully independent.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: TokenCell,
    on_unauthorized: RwLock<Option<UnauthorizedHandler>>,
}

impl ApiClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    /// Returns [`ApiError::BaseUrl`] / [`ApiError::NotABase`] when the
    /// URL doesn't parse or can't have endpoint paths joined onto it.
    pub fn new(base_url: &str, token: TokenCell) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::NotABase(base_url.into()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token,
            on_unauthorized: RwLock::new(None),
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The shared token cell.
    pub fn token(&self) -> &TokenCell {
        &self.token
    }

    /// Registers the unauthorized handler. A later registration replaces
    /// an earlier one; only one handler is ever consulted.
    pub fn register_unauthorized_handler(&self, handler: UnauthorizedHandler) {
        let mut slot = self
            .on_unauthorized
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(handler);
    }

    /// Builds the backend-hosted OAuth entry URL, embedding `next` as the
    /// post-auth redirect target. No request is made.
    pub fn google_login_url(&self, next: &str) -> Url {
        let mut url = self.endpoint("/auth/google/login");
        url.query_pairs_mut().append_pair("next", next);
        url
    }

    // -- Auth endpoints ---------------------------------------------------

    /// `GET /auth/session` — asks the backend whether the ambient cookies
    /// carry a valid session.
    pub async fn session(&self) -> Result<SessionProbe, ApiError> {
        let url = self.endpoint("/auth/session");
        self.request(Method::GET, url, NO_BODY, RetryPolicy::Once)
            .await
    }

    /// `POST /auth/login`.
    pub async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<TokenGrant, ApiError> {
        let url = self.endpoint("/auth/login");
        self.request(Method::POST, url, Some(credentials), RetryPolicy::Once)
            .await
    }

    /// `POST /auth/signup`.
    pub async fn signup(
        &self,
        request: &SignupRequest,
    ) -> Result<TokenGrant, ApiError> {
        let url = self.endpoint("/auth/signup");
        self.request(Method::POST, url, Some(request), RetryPolicy::Once)
            .await
    }

    /// `POST /auth/demo-login` — development sign-in without the OAuth
    /// provider.
    pub async fn demo_login(
        &self,
        request: &DemoLoginRequest,
    ) -> Result<TokenGrant, ApiError> {
        let url = self.endpoint("/auth/demo-login");
        self.request(Method::POST, url, Some(request), RetryPolicy::Once)
            .await
    }

    /// `POST /auth/refresh` — exchanges the refresh cookie for a fresh
    /// token + user pair. Never retry-eligible.
    pub async fn refresh_access_token(&self) -> Result<TokenGrant, ApiError> {
        let url = self.endpoint("/auth/refresh");
        self.request(Method::POST, url, NO_BODY, RetryPolicy::Never)
            .await
    }

    /// `POST /auth/logout` — best-effort; callers typically ignore the
    /// result.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint("/auth/logout");
        self.request_unit(Method::POST, url, NO_BODY, RetryPolicy::Once)
            .await
    }

    /// `POST /auth/setup-account` — completes a placeholder account.
    pub async fn setup_account(
        &self,
        request: &AccountSetupRequest,
    ) -> Result<AccountSetupResponse, ApiError> {
        let url = self.endpoint("/auth/setup-account");
        self.request(Method::POST, url, Some(request), RetryPolicy::Once)
            .await
    }

    /// `GET /auth/username-available?username=…`.
    pub async fn username_available(
        &self,
        username: &str,
    ) -> Result<UsernameAvailability, ApiError> {
        let mut url = self.endpoint("/auth/username-available");
        url.query_pairs_mut().append_pair("username", username);
        self.request(Method::GET, url, NO_BODY, RetryPolicy::Once)
            .await
    }

    /// `DELETE /auth/delete-account`.
    pub async fn delete_account(&self) -> Result<(), ApiError> {
        let url = self.endpoint("/auth/delete-account");
        self.request_unit(Method::DELETE, url, NO_BODY, RetryPolicy::Once)
            .await
    }

    // -- Event endpoints --------------------------------------------------

    /// `GET /events/nearby`, optionally scoped to a coordinate.
    pub async fn nearby_events(
        &self,
        near: Option<(f64, f64)>,
    ) -> Result<Vec<SportEvent>, ApiError> {
        let mut url = self.endpoint("/events/nearby");
        if let Some((lat, lng)) = near {
            url.query_pairs_mut()
                .append_pair("lat", &lat.to_string())
                .append_pair("lng", &lng.to_string());
        }
        self.request(Method::GET, url, NO_BODY, RetryPolicy::Once)
            .await
    }

    /// `POST /events/{id}/join`.
    pub async fn join_event(
        &self,
        event_id: EventId,
        request: &JoinEventRequest,
    ) -> Result<JoinEventResponse, ApiError> {
        let url = self.endpoint(&format!("/events/{}/join", event_id.0));
        self.request(Method::POST, url, Some(request), RetryPolicy::Once)
            .await
    }

    /// `POST /events/{id}/leave`.
    pub async fn leave_event(
        &self,
        event_id: EventId,
        request: &LeaveEventRequest,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/events/{}/leave", event_id.0));
        self.request_unit(Method::POST, url, Some(request), RetryPolicy::Once)
            .await
    }

    // -- Request plumbing -------------------------------------------------

    fn endpoint(&self, path: &str) -> Url {
        // The base URL was validated in `new`, and every path here is a
        // fixed absolute path, so the join cannot fail.
        self.base_url
            .join(path)
            .expect("endpoint path joins onto a validated base")
    }

    /// Sends one request. The bearer token is read from the cell *here*,
    /// at send time — a retry goes through this again and picks up
    /// whatever the refresh installed in the meantime.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.http.request(method, url);
        if let Some(token) = self.token.get() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Sends a request, running unauthorized recovery at most once, and
    /// decodes a JSON response.
    async fn request<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.dispatch(method, url, body, retry).await?;
        Ok(response.json().await?)
    }

    /// Like [`request`](Self::request) but discards the response body.
    async fn request_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<(), ApiError> {
        self.dispatch(method, url, body, retry).await?;
        Ok(())
    }

    async fn dispatch<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<reqwest::Response, ApiError> {
        let mut response =
            self.execute(method.clone(), url.clone(), body).await?;

        if response.status() == StatusCode::UNAUTHORIZED
            && retry == RetryPolicy::Once
        {
            // Clone the handler out so no lock is held across the await.
            let handler = self
                .on_unauthorized
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            if let Some(handler) = handler {
                tracing::debug!(%url, "unauthorized response, attempting recovery");
                if handler().await {
                    // Recovery succeeded: retry the original request once.
                    // A 401 on this retry is surfaced, never recovered again.
                    response = self.execute(method, url, body).await?;
                }
            }
        }

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await?;
            let message = if message.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                message
            };
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

const NO_BODY: Option<&()> = None;
