//! Error types for the protocol layer.
//!
//! Every failure in here means the bytes on the wire cannot be trusted, so
//! the session that received them is torn down. There is no partial
//! recovery from a [`ProtocolError`].

use crate::PacketKind;

/// Errors that can occur while encoding or decoding Bedrock packets.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The buffer ended before a field could be read completely.
    #[error("buffer truncated: needed {needed} byte(s), {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A varint ran past its maximum encoded width.
    #[error("varint exceeds {max_bytes} bytes")]
    VarIntTooLong { max_bytes: usize },

    /// A length-prefixed string was not valid UTF-8.
    #[error("string field is not valid utf-8")]
    InvalidString,

    /// The packet header carried an id this codec doesn't know.
    #[error("unknown packet id {0}")]
    UnknownPacket(u32),

    /// The codec has no serializer registered for this packet kind.
    #[error("no serializer registered for {0}")]
    MissingSerializer(PacketKind),

    /// A serializer was handed a packet of a different kind.
    #[error("serializer for {expected} received a {found} packet")]
    PacketMismatch {
        expected: PacketKind,
        found: PacketKind,
    },

    /// The proxy tried to send a packet that is illegal in both directions.
    #[error("server tried to send unused packet {0}")]
    IllegalOutbound(PacketKind),

    /// The client sent a packet that is illegal in both directions.
    #[error("client tried to send unused packet {0}")]
    IllegalInbound(PacketKind),

    /// The client sent a packet the proxy only ever sends.
    #[error("client cannot send {0} to this server")]
    RejectedInbound(PacketKind),

    /// A translated structure violated an invariant of the protocol,
    /// e.g. a block entity tag missing a required key.
    #[error("protocol violation: {0}")]
    Violation(String),
}

impl ProtocolError {
    /// The packet kind this error is about, when there is one.
    pub fn packet_kind(&self) -> Option<PacketKind> {
        match self {
            Self::MissingSerializer(kind)
            | Self::IllegalOutbound(kind)
            | Self::IllegalInbound(kind)
            | Self::RejectedInbound(kind) => Some(*kind),
            Self::PacketMismatch { expected, .. } => Some(*expected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_inbound_names_packet_kind() {
        let err = ProtocolError::RejectedInbound(PacketKind::InventoryContent);
        assert_eq!(
            err.to_string(),
            "client cannot send InventoryContentPacket to this server"
        );
        assert_eq!(err.packet_kind(), Some(PacketKind::InventoryContent));
    }

    #[test]
    fn test_truncated_has_no_packet_kind() {
        let err = ProtocolError::Truncated {
            needed: 2,
            remaining: 1,
        };
        assert_eq!(err.packet_kind(), None);
        assert!(err.to_string().contains("needed 2"));
    }
}
