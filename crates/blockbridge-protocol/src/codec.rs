//! Versioned Bedrock codecs.
//!
//! A [`BedrockCodec`] is an immutable table from [`PacketKind`] to
//! serializer, tagged with the protocol number and the human-readable game
//! version it speaks. Codecs are cheap to clone (the table is behind an
//! `Arc`) and are customised through [`CodecBuilder`]:
//!
//! ```rust
//! use blockbridge_protocol::{base_codec, OpaqueSerializer, PacketKind};
//! use std::sync::Arc;
//!
//! let codec = base_codec(671)
//!     .to_builder()
//!     .minecraft_version("1.20.80")
//!     .update_serializer(PacketKind::BossEvent, Arc::new(OpaqueSerializer))
//!     .build();
//! assert_eq!(codec.minecraft_version(), "1.20.80");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};

use crate::serializer::{
    MobEquipmentSerializer, ModalFormRequestSerializer, ModalFormResponseSerializer,
    NetworkStackLatencySerializer, OpaqueSerializer, SetTimeSerializer,
};
use crate::wire;
use crate::{DirectionPolicy, ItemData, Packet, PacketKind, PacketSerializer, ProtocolError};

/// Low 10 bits of the header carry the packet id; the rest is sub-client
/// routing the bridge doesn't use.
const PACKET_ID_MASK: u32 = 0x3ff;

// ---------------------------------------------------------------------------
// CodecHelper
// ---------------------------------------------------------------------------

/// Shared field codecs that more than one serializer needs.
///
/// Every supported version (622 and newer) uses the same item layout:
///
/// ```text
/// varint   runtime id      (0 = air, nothing follows)
/// u16 LE   count
/// uvarint  damage
/// bool     has net id  → varint net id
/// varint   block runtime id
/// uvarint  extra length → extra bytes
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecHelper {
    protocol_version: i32,
}

impl CodecHelper {
    pub fn new(protocol_version: i32) -> Self {
        Self { protocol_version }
    }

    pub fn protocol_version(&self) -> i32 {
        self.protocol_version
    }

    pub fn read_item(&self, buf: &mut Bytes) -> Result<ItemData, ProtocolError> {
        let id = wire::read_varint(buf)?;
        if id == 0 {
            return Ok(ItemData::AIR);
        }
        let count = wire::read_u16_le(buf)?;
        let damage = wire::read_uvarint(buf)?;
        let net_id = if wire::read_bool(buf)? {
            Some(wire::read_varint(buf)?)
        } else {
            None
        };
        let block_runtime_id = wire::read_varint(buf)?;
        let extra = wire::read_byte_array(buf)?;
        Ok(ItemData {
            id,
            count,
            damage,
            net_id,
            block_runtime_id,
            extra,
        })
    }

    pub fn write_item(&self, buf: &mut BytesMut, item: &ItemData) {
        wire::write_varint(buf, item.id);
        if item.is_air() {
            return;
        }
        buf.put_u16_le(item.count);
        wire::write_uvarint(buf, item.damage);
        wire::write_bool(buf, item.net_id.is_some());
        if let Some(net_id) = item.net_id {
            wire::write_varint(buf, net_id);
        }
        wire::write_varint(buf, item.block_runtime_id);
        wire::write_byte_array(buf, &item.extra);
    }
}

// ---------------------------------------------------------------------------
// BedrockCodec
// ---------------------------------------------------------------------------

type SerializerTable = HashMap<PacketKind, Arc<dyn PacketSerializer>>;

/// A versioned collection of packet serializers.
#[derive(Clone)]
pub struct BedrockCodec {
    protocol_version: i32,
    minecraft_version: String,
    helper: CodecHelper,
    serializers: Arc<SerializerTable>,
}

impl BedrockCodec {
    pub fn protocol_version(&self) -> i32 {
        self.protocol_version
    }

    pub fn minecraft_version(&self) -> &str {
        &self.minecraft_version
    }

    pub fn helper(&self) -> &CodecHelper {
        &self.helper
    }

    /// The serializer installed for `kind`, if any.
    pub fn serializer_for(&self, kind: PacketKind) -> Option<&Arc<dyn PacketSerializer>> {
        self.serializers.get(&kind)
    }

    /// The direction policy installed for `kind`, or `None` when `kind`
    /// uses its base serializer (or has none).
    pub fn direction_policy(&self, kind: PacketKind) -> Option<DirectionPolicy> {
        self.serializer_for(kind)
            .and_then(|serializer| serializer.direction_policy())
    }

    /// Starts a builder pre-filled with this codec's contents.
    pub fn to_builder(&self) -> CodecBuilder {
        CodecBuilder {
            protocol_version: self.protocol_version,
            minecraft_version: self.minecraft_version.clone(),
            serializers: (*self.serializers).clone(),
        }
    }

    /// Encodes a full packet: uvarint header followed by the body.
    ///
    /// # Errors
    /// Fails when no serializer is registered for the packet's kind or the
    /// serializer refuses to encode it.
    pub fn encode_packet(&self, packet: &Packet) -> Result<Bytes, ProtocolError> {
        let kind = packet.kind();
        let serializer = self
            .serializer_for(kind)
            .ok_or(ProtocolError::MissingSerializer(kind))?;
        let mut buf = BytesMut::new();
        wire::write_uvarint(&mut buf, kind.id());
        serializer.encode(&mut buf, &self.helper, packet)?;
        Ok(buf.freeze())
    }

    /// Decodes one packet from a frame produced by [`encode_packet`](Self::encode_packet).
    ///
    /// # Errors
    /// Fails on unknown ids, missing serializers, malformed bodies, and any
    /// packet whose direction policy forbids receiving it.
    pub fn decode_packet(&self, mut frame: Bytes) -> Result<Packet, ProtocolError> {
        let header = wire::read_uvarint(&mut frame)?;
        let id = header & PACKET_ID_MASK;
        let kind = PacketKind::from_id(id).ok_or(ProtocolError::UnknownPacket(id))?;
        let serializer = self
            .serializer_for(kind)
            .ok_or(ProtocolError::MissingSerializer(kind))?;
        let mut packet = Packet::empty(kind);
        serializer.decode(&mut frame, &self.helper, &mut packet)?;
        Ok(packet)
    }
}

/// Two codecs are equal when they speak the same version and every entry
/// points at the *same* serializer instance.
impl PartialEq for BedrockCodec {
    fn eq(&self, other: &Self) -> bool {
        if self.protocol_version != other.protocol_version
            || self.minecraft_version != other.minecraft_version
        {
            return false;
        }
        if Arc::ptr_eq(&self.serializers, &other.serializers) {
            return true;
        }
        self.serializers.len() == other.serializers.len()
            && self.serializers.iter().all(|(kind, s)| {
                other
                    .serializers
                    .get(kind)
                    .is_some_and(|o| Arc::ptr_eq(s, o))
            })
    }
}

impl fmt::Debug for BedrockCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BedrockCodec")
            .field("protocol_version", &self.protocol_version)
            .field("minecraft_version", &self.minecraft_version)
            .field("serializers", &self.serializers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// CodecBuilder
// ---------------------------------------------------------------------------

/// Builder returned by [`BedrockCodec::to_builder`].
pub struct CodecBuilder {
    protocol_version: i32,
    minecraft_version: String,
    serializers: SerializerTable,
}

impl CodecBuilder {
    /// Starts an empty codec for `protocol_version`.
    pub fn new(protocol_version: i32) -> Self {
        Self {
            protocol_version,
            minecraft_version: String::new(),
            serializers: HashMap::new(),
        }
    }

    pub fn minecraft_version(mut self, version: impl Into<String>) -> Self {
        self.minecraft_version = version.into();
        self
    }

    /// Installs (or replaces) the serializer for `kind`.
    pub fn update_serializer(
        mut self,
        kind: PacketKind,
        serializer: Arc<dyn PacketSerializer>,
    ) -> Self {
        self.serializers.insert(kind, serializer);
        self
    }

    /// Removes `kind` from the table.
    pub fn remove_serializer(mut self, kind: PacketKind) -> Self {
        self.serializers.remove(&kind);
        self
    }

    /// Current entry for `kind`, as seen while building.
    pub fn serializer_for(&self, kind: PacketKind) -> Option<&Arc<dyn PacketSerializer>> {
        self.serializers.get(&kind)
    }

    pub fn build(self) -> BedrockCodec {
        BedrockCodec {
            protocol_version: self.protocol_version,
            minecraft_version: self.minecraft_version,
            helper: CodecHelper::new(self.protocol_version),
            serializers: Arc::new(self.serializers),
        }
    }
}

// ---------------------------------------------------------------------------
// Base codecs
// ---------------------------------------------------------------------------

/// The unmodified codec for `protocol_version`, before any bridge-specific
/// overrides. Typed packets get their layout serializer; every other kind
/// is carried verbatim.
pub fn base_codec(protocol_version: i32) -> BedrockCodec {
    let opaque: Arc<dyn PacketSerializer> = Arc::new(OpaqueSerializer);
    let mut builder = CodecBuilder::new(protocol_version)
        .minecraft_version(default_version_string(protocol_version));
    for kind in PacketKind::ALL {
        builder = builder.update_serializer(*kind, Arc::clone(&opaque));
    }
    builder
        .update_serializer(PacketKind::MobEquipment, Arc::new(MobEquipmentSerializer))
        .update_serializer(
            PacketKind::ModalFormRequest,
            Arc::new(ModalFormRequestSerializer),
        )
        .update_serializer(
            PacketKind::ModalFormResponse,
            Arc::new(ModalFormResponseSerializer),
        )
        .update_serializer(
            PacketKind::NetworkStackLatency,
            Arc::new(NetworkStackLatencySerializer),
        )
        .update_serializer(PacketKind::SetTime, Arc::new(SetTimeSerializer))
        .build()
}

/// Version string a base codec ships with before the registry overrides it.
fn default_version_string(protocol_version: i32) -> &'static str {
    match protocol_version {
        622 => "1.20.40",
        630 => "1.20.50",
        649 => "1.20.60",
        662 => "1.20.70",
        671 => "1.20.80",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MobEquipmentPacket, SetTimePacket};

    #[test]
    fn test_air_item_is_single_byte() {
        let helper = CodecHelper::new(671);
        let mut buf = BytesMut::new();
        helper.write_item(&mut buf, &ItemData::AIR);
        assert_eq!(&buf[..], &[0x00]);
        let mut bytes = buf.freeze();
        assert_eq!(helper.read_item(&mut bytes).unwrap(), ItemData::AIR);
    }

    #[test]
    fn test_encode_decode_frame() {
        let codec = base_codec(671);
        let packet = Packet::SetTime(SetTimePacket { time: 6000 });
        let frame = codec.encode_packet(&packet).unwrap();
        assert_eq!(frame[0], PacketKind::SetTime.id() as u8);
        assert_eq!(codec.decode_packet(frame).unwrap(), packet);
    }

    #[test]
    fn test_decode_masks_subclient_bits() {
        let codec = base_codec(671);
        let mut buf = BytesMut::new();
        // id 10 with sender sub-client 1 in bits 10..12
        wire::write_uvarint(&mut buf, 10 | (1 << 10));
        wire::write_varint(&mut buf, 42);
        let packet = codec.decode_packet(buf.freeze()).unwrap();
        assert_eq!(packet, Packet::SetTime(SetTimePacket { time: 42 }));
    }

    #[test]
    fn test_unknown_packet_id() {
        let codec = base_codec(671);
        let err = codec.decode_packet(Bytes::from_static(&[0x01])).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownPacket(1)));
    }

    #[test]
    fn test_missing_serializer() {
        let codec = base_codec(671)
            .to_builder()
            .remove_serializer(PacketKind::MobEquipment)
            .build();
        let err = codec
            .encode_packet(&Packet::MobEquipment(MobEquipmentPacket::default()))
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MissingSerializer(PacketKind::MobEquipment)
        ));
    }

    #[test]
    fn test_clone_is_equal_rebuild_is_not() {
        let codec = base_codec(649);
        assert_eq!(codec.clone(), codec);

        // A fresh base codec has new serializer instances.
        assert_ne!(base_codec(649), codec);
    }

    #[test]
    fn test_builder_keeps_other_entries() {
        let codec = base_codec(662);
        let rebuilt = codec.to_builder().minecraft_version("custom").build();
        assert_eq!(rebuilt.minecraft_version(), "custom");
        assert!(Arc::ptr_eq(
            codec.serializer_for(PacketKind::SetTime).unwrap(),
            rebuilt.serializer_for(PacketKind::SetTime).unwrap(),
        ));
    }
}
