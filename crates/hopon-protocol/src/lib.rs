//! Data types shared by every layer of the HopOn client SDK.
//!
//! This crate defines every shape that crosses a boundary — meaning the
//! structures that come back from the backend as JSON, get written to the
//! durable client store, or are posted from an authentication popup to its
//! opener.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session layer (above)  ← applies auth payloads, tracks who the actor is
//!     ↕
//! API layer              ← decodes backend responses into these types
//!     ↕
//! Protocol layer (this crate)  ← the shapes themselves
//! ```

mod auth;
mod error;
mod handoff;
mod types;

pub use auth::{
    AccountSetupRequest, AccountSetupResponse, AuthPayload, Credentials,
    DemoLoginRequest, SessionProbe, SignupRequest, TokenGrant,
    UsernameAvailability,
};
pub use error::ProtocolError;
pub use handoff::{HandoffMessage, HANDOFF_MESSAGE_TYPE};
pub use types::{
    EventHost, EventId, JoinEventRequest, JoinEventResponse,
    LeaveEventRequest, SportEvent, UserId, UserProfile,
};
