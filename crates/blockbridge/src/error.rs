//! Unified error type for Blockbridge.

use blockbridge_entity::PropertyError;
use blockbridge_form::FormError;
use blockbridge_nbt::NbtError;
use blockbridge_protocol::ProtocolError;
use blockbridge_session::SessionError;
use blockbridge_translator::TranslatorError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` conversions let `?` lift any sub-crate error into this one.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Nbt(#[from] NbtError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Translator(#[from] TranslatorError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// A config file couldn't be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use blockbridge_protocol::PacketKind;

    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err: BridgeError = ProtocolError::RejectedInbound(PacketKind::DebugInfo).into();
        assert!(matches!(err, BridgeError::Protocol(_)));
        assert_eq!(
            err.to_string(),
            "client cannot send DebugInfoPacket to this server"
        );
    }

    #[test]
    fn test_from_property_error() {
        let err: BridgeError = PropertyError::MissingEntityType.into();
        assert!(matches!(err, BridgeError::Property(_)));
        assert_eq!(err.to_string(), "entity type must be set");
    }

    #[test]
    fn test_from_session_error() {
        let err: BridgeError = SessionError::EventLoopClosed("00".into()).into();
        assert!(matches!(err, BridgeError::Session(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u8>("x").unwrap_err();
        let err: BridgeError = json_err.into();
        assert!(err.to_string().starts_with("invalid config"));
    }
}
