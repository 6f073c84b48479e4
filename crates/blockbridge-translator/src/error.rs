//! Error types for translators.

use blockbridge_protocol::ProtocolError;

/// Errors raised while translating data from one edition to the other.
#[derive(Debug, thiserror::Error)]
pub enum TranslatorError {
    /// The input broke a protocol invariant. The session should be closed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
