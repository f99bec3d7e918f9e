//! The popup handoff envelope.
//!
//! When the OAuth popup finishes, the backend's completion page posts a
//! message of this shape to the window that opened it:
//!
//! ```text
//! { "type": "hopon:auth", "payload": { "user": …, "access_token": …, … } }
//! ```
//!
//! If cross-window messaging is blocked (browser privacy settings), the
//! same payload is written to durable storage instead, under a well-known
//! key, for the opener to pick up after it detects the popup closed. The
//! stored form is the bare [`AuthPayload`], not this envelope.
//!
//! Parsing is deliberately three-way: a message that isn't a handoff at
//! all is *ignored* (windows receive unrelated messages constantly), while
//! a message that is recognizably a handoff but unusable is an *error* the
//! login flow must surface.

use serde::{Deserialize, Serialize};

use crate::{AuthPayload, ProtocolError};

/// The `type` tag identifying a handoff message.
pub const HANDOFF_MESSAGE_TYPE: &str = "hopon:auth";

/// A validated handoff message from the authentication popup.
///
/// Unlike a stored payload, a posted message must carry *both* the user
/// and a non-empty access token — the popup only posts on full success,
/// so anything less is a malformed handoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffMessage {
    pub payload: AuthPayload,
}

impl HandoffMessage {
    /// Interprets a raw cross-window message value.
    ///
    /// - `None` — not a handoff message; the caller should ignore it.
    /// - `Some(Err(_))` — recognizably a handoff, but the payload is
    ///   missing or incomplete.
    /// - `Some(Ok(_))` — a complete, applicable handoff.
    pub fn from_value(
        value: &serde_json::Value,
    ) -> Option<Result<Self, ProtocolError>> {
        let tag = value.get("type")?.as_str()?;
        if tag != HANDOFF_MESSAGE_TYPE {
            return None;
        }
        Some(Self::parse_payload(value.get("payload")))
    }

    fn parse_payload(
        payload: Option<&serde_json::Value>,
    ) -> Result<Self, ProtocolError> {
        let Some(raw) = payload else {
            return Err(ProtocolError::IncompletePayload);
        };
        let payload: AuthPayload = serde_json::from_value(raw.clone())?;
        if !payload.is_complete() {
            return Err(ProtocolError::IncompletePayload);
        }
        Ok(Self { payload })
    }

    /// Encodes the envelope back to the posted wire shape. Used by window
    /// hosts (and tests) that deliver handoffs.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "type": HANDOFF_MESSAGE_TYPE,
            "payload": self.payload,
        })
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_payload() -> serde_json::Value {
        serde_json::json!({
            "user": {"id": 1, "username": "ana", "email": "a@example.com"},
            "access_token": "tok-1",
            "needs_username_setup": true,
        })
    }

    #[test]
    fn test_from_value_unrelated_message_is_ignored() {
        // Windows receive all sorts of messages; none of these are ours.
        for value in [
            serde_json::json!("plain string"),
            serde_json::json!({"source": "react-devtools"}),
            serde_json::json!({"type": 42}),
            serde_json::json!({"type": "other:auth", "payload": {}}),
        ] {
            assert!(
                HandoffMessage::from_value(&value).is_none(),
                "should ignore {value}"
            );
        }
    }

    #[test]
    fn test_from_value_complete_handoff_parses() {
        let value = serde_json::json!({
            "type": HANDOFF_MESSAGE_TYPE,
            "payload": complete_payload(),
        });
        let msg = HandoffMessage::from_value(&value)
            .expect("recognized")
            .expect("valid");
        assert!(msg.payload.is_complete());
        assert_eq!(msg.payload.needs_username_setup, Some(true));
    }

    #[test]
    fn test_from_value_missing_payload_is_error() {
        let value = serde_json::json!({"type": HANDOFF_MESSAGE_TYPE});
        let result = HandoffMessage::from_value(&value).expect("recognized");
        assert!(matches!(result, Err(ProtocolError::IncompletePayload)));
    }

    #[test]
    fn test_from_value_payload_missing_token_is_error() {
        let value = serde_json::json!({
            "type": HANDOFF_MESSAGE_TYPE,
            "payload": {
                "user": {"id": 1, "username": "ana", "email": "a@example.com"},
            },
        });
        let result = HandoffMessage::from_value(&value).expect("recognized");
        assert!(matches!(result, Err(ProtocolError::IncompletePayload)));
    }

    #[test]
    fn test_from_value_payload_missing_user_is_error() {
        let value = serde_json::json!({
            "type": HANDOFF_MESSAGE_TYPE,
            "payload": {"access_token": "tok-1"},
        });
        let result = HandoffMessage::from_value(&value).expect("recognized");
        assert!(matches!(result, Err(ProtocolError::IncompletePayload)));
    }

    #[test]
    fn test_to_value_round_trips() {
        let original = HandoffMessage {
            payload: serde_json::from_value(complete_payload()).unwrap(),
        };
        let decoded = HandoffMessage::from_value(&original.to_value())
            .expect("recognized")
            .expect("valid");
        assert_eq!(original, decoded);
    }
}
