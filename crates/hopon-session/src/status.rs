//! The session status state machine.

use std::fmt;

/// The authentication status of the current actor.
///
/// This is a state machine with three states:
///
/// ```text
///              ┌──(probe ok / handoff / login)──→ Authenticated
///   Loading ───┤                                     │      ↑
///              └──(probe failed or empty)──→ Guest ←─┘      │
///                                              └──(login)───┘
/// ```
///
/// - **Loading**: the initial state, held only until the first session
///   check resolves. Never re-entered — a failed probe demotes to
///   `Guest` rather than leaving the UI hanging.
/// - **Authenticated**: a user profile and access token are present.
/// - **Guest**: no authenticated session. Guest bookkeeping (name,
///   per-event tokens) lives independently of this state and survives
///   transitions in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Guest,
}

impl SessionStatus {
    /// `true` while the initial session check is still unresolved.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// `true` if a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// `true` if the actor is an unauthenticated visitor.
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Guest => write!(f, "guest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(SessionStatus::Loading.is_loading());
        assert!(!SessionStatus::Loading.is_authenticated());
        assert!(SessionStatus::Authenticated.is_authenticated());
        assert!(SessionStatus::Guest.is_guest());
        assert!(!SessionStatus::Guest.is_authenticated());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SessionStatus::Loading.to_string(), "loading");
        assert_eq!(SessionStatus::Authenticated.to_string(), "authenticated");
        assert_eq!(SessionStatus::Guest.to_string(), "guest");
    }
}
