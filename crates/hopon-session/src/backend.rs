//! The backend seam: what the session manager needs from the HTTP layer.
//!
//! The session manager doesn't talk to `reqwest` directly — it talks to
//! this trait. Production wires in [`ApiClient`]; tests wire in a scripted
//! mock, which is what makes every state transition testable without a
//! network.

use hopon_api::{ApiClient, ApiError};
use hopon_protocol::{
    Credentials, DemoLoginRequest, SessionProbe, SignupRequest, TokenGrant,
};
use url::Url;

/// The authentication endpoints the session manager drives.
///
/// `Send + Sync + 'static` because the manager is shared across async
/// tasks and lives for the whole application.
pub trait AuthBackend: Send + Sync + 'static {
    /// `GET /auth/session` — is there a valid session for the ambient
    /// credentials?
    async fn probe_session(&self) -> Result<SessionProbe, ApiError>;

    /// `POST /auth/login`.
    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<TokenGrant, ApiError>;

    /// `POST /auth/signup`.
    async fn signup(
        &self,
        request: &SignupRequest,
    ) -> Result<TokenGrant, ApiError>;

    /// `POST /auth/demo-login`.
    async fn demo_login(
        &self,
        request: &DemoLoginRequest,
    ) -> Result<TokenGrant, ApiError>;

    /// `POST /auth/refresh`. Must fail cleanly (an `Err`, not a hang or
    /// a retry loop) when no valid refresh credential exists.
    async fn refresh_access_token(&self) -> Result<TokenGrant, ApiError>;

    /// `POST /auth/logout`. Best-effort.
    async fn logout(&self) -> Result<(), ApiError>;

    /// The backend-hosted OAuth entry URL with `next` embedded as the
    /// post-auth redirect target.
    fn google_login_url(&self, next: &str) -> Url;
}

impl AuthBackend for ApiClient {
    async fn probe_session(&self) -> Result<SessionProbe, ApiError> {
        self.session().await
    }

    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<TokenGrant, ApiError> {
        ApiClient::login(self, credentials).await
    }

    async fn signup(
        &self,
        request: &SignupRequest,
    ) -> Result<TokenGrant, ApiError> {
        ApiClient::signup(self, request).await
    }

    async fn demo_login(
        &self,
        request: &DemoLoginRequest,
    ) -> Result<TokenGrant, ApiError> {
        ApiClient::demo_login(self, request).await
    }

    async fn refresh_access_token(&self) -> Result<TokenGrant, ApiError> {
        ApiClient::refresh_access_token(self).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        ApiClient::logout(self).await
    }

    fn google_login_url(&self, next: &str) -> Url {
        ApiClient::google_login_url(self, next)
    }
}
