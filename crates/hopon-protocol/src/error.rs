//! Error types for the protocol layer.

/// Errors raised while decoding backend or popup payloads.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The bytes were not valid JSON, or didn't match the expected shape.
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A handoff message was recognized but its payload is unusable —
    /// missing the user, or missing a non-empty access token.
    #[error("authentication payload missing user or access token")]
    IncompletePayload,
}
