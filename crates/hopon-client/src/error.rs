//! Unified error type for the SDK.

use hopon_api::ApiError;
use hopon_protocol::ProtocolError;
use hopon_session::SessionError;
use hopon_store::StoreError;

/// Top-level error that wraps all layer-specific errors.
///
/// Hosts using the `hopon-client` meta-crate deal with this single type;
/// the `#[from]` attributes let `?` convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An HTTP-layer error (network, backend rejection).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A session-layer error (popup flow, login state).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A storage-layer error (persisting guest state).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A protocol-layer error (payload decoding).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
