//! Core identity and domain types.
//!
//! The backend keys users and events by integer ids. Both get newtype
//! wrappers so a `UserId` can't be passed where an `EventId` is expected,
//! and `#[serde(transparent)]` keeps the JSON representation a plain
//! number, which is what the backend produces.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user-{}", self.0)
    }
}

/// A unique identifier for a sporting event.
///
/// Also used as the key of the guest token map, so it must serialize
/// cleanly as a JSON object key (serde_json stringifies integer keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

/// A snapshot of a user's profile as the backend reports it.
///
/// Most fields are optional because the backend omits anything the user
/// hasn't filled in yet. `needs_username_setup` defaults to `false` when
/// absent — it only appears on freshly provisioned OAuth accounts that
/// still carry a generated placeholder username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub rating: Option<f64>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sports: Option<Vec<String>>,
    pub events_count: Option<i64>,
    pub avatar_url: Option<String>,
    pub is_following: Option<bool>,
    #[serde(default)]
    pub needs_username_setup: bool,
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The host summary embedded in an event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventHost {
    pub id: UserId,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// A sporting event as returned by the events endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportEvent {
    pub id: EventId,
    pub name: String,
    pub sport: String,
    pub location: String,
    pub notes: Option<String>,
    pub max_players: u32,
    pub current_players: u32,
    pub event_date: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub skill_level: Option<String>,
    pub host_user_id: Option<UserId>,
    pub distance_km: Option<f64>,
    pub host: Option<EventHost>,
}

/// Body of `POST /events/{id}/join`.
///
/// Authenticated users send an empty body. Guests send a display name
/// and, when re-joining an event they already hold a token for, the
/// remembered guest token so the backend recognizes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_token: Option<String>,
}

/// Response of `POST /events/{id}/join`.
///
/// `guest_token` is only present for unauthenticated joins — it is the
/// caller's job to remember it (see the session layer's guest vault),
/// because the backend has no other way to recognize the same guest later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinEventResponse {
    pub message: Option<String>,
    pub event: SportEvent,
    pub guest_token: Option<String>,
}

/// Body of `POST /events/{id}/leave`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_token: Option<String>,
}

// =========================================================================
// Tests
// =========================================================================
