//! Authentication flow types: probes, grants, and the payload that moves
//! session state.

use serde::{Deserialize, Serialize};

use crate::UserProfile;

// ---------------------------------------------------------------------------
// AuthPayload
// ---------------------------------------------------------------------------

/// The bundle produced by a successful authentication, applied atomically
/// to local session state.
///
/// Every path by which an auth result enters the session manager — popup
/// message, stored handoff, credential login, token refresh — is first
/// normalized into one of these. Either half may be absent: a session
/// probe can report a cookie-backed user without minting a token, and a
/// refresh can arrive before the profile is re-fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
    /// Set by the backend when the account still carries a generated
    /// placeholder username. Normalized onto the stored user when the
    /// payload is applied.
    pub needs_username_setup: Option<bool>,
}

impl AuthPayload {
    /// `true` if the payload carries a usable (non-empty) access token.
    ///
    /// The backend has been observed sending `"access_token": ""` on some
    /// probe responses; an empty string is not a credential.
    pub fn has_access_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// `true` if the payload carries both a user and a usable token.
    pub fn is_complete(&self) -> bool {
        self.user.is_some() && self.has_access_token()
    }

    /// Decodes a payload from raw JSON (the stored-handoff format).
    pub fn from_json(raw: &str) -> Result<Self, crate::ProtocolError> {
        Ok(serde_json::from_str(raw)?)
    }
}

// ---------------------------------------------------------------------------
// Backend responses
// ---------------------------------------------------------------------------

/// Response of `GET /auth/session` — "is there a valid authenticated
/// session for the ambient cookies?"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProbe {
    pub authenticated: bool,
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
}

impl SessionProbe {
    /// Converts an affirmative probe into an applicable payload.
    ///
    /// Returns `None` unless the probe both claims authentication and
    /// actually carries a user — the two must arrive together.
    pub fn into_payload(self) -> Option<AuthPayload> {
        if !self.authenticated {
            return None;
        }
        let user = self.user?;
        Some(AuthPayload {
            user: Some(user),
            access_token: self.access_token,
            needs_username_setup: None,
        })
    }
}

/// Response of the credential endpoints (`/auth/login`, `/auth/signup`,
/// `/auth/demo-login`) and of `/auth/refresh`: a full token + user pair.
///
/// Unlike [`AuthPayload`], both halves are mandatory here — a grant
/// missing either fails to decode, which is exactly the "malformed
/// response" failure the refresh path treats as a rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub user: UserProfile,
    pub needs_username_setup: Option<bool>,
}

impl From<TokenGrant> for AuthPayload {
    fn from(grant: TokenGrant) -> Self {
        AuthPayload {
            user: Some(grant.user),
            access_token: Some(grant.access_token),
            needs_username_setup: grant.needs_username_setup,
        }
    }
}

/// Response of `GET /auth/username-available`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsernameAvailability {
    pub available: bool,
    pub message: Option<String>,
}

/// Response of `POST /auth/setup-account`: the completed profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSetupResponse {
    pub message: Option<String>,
    pub user: UserProfile,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/signup`. Username length rules are enforced by the
/// caller — the backend rejects violations with its own message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// Body of `POST /auth/demo-login` (development helper — sign in without
/// the OAuth provider).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemoLoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of `POST /auth/setup-account` — completes a `needs_username_setup`
/// account with a chosen username and optional profile details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSetupRequest {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sports: Option<Vec<String>>,
}

// =========================================================================
// Tests
// =========================================================================
