//! Direction-policy serializers.
//!
//! The bridge sits between a Bedrock client and a Java server, so many
//! Bedrock packets are only ever meaningful in one direction. A
//! [`PolicySerializer`] wraps an optional base serializer with a
//! [`DirectionPolicy`] that decides, per direction, whether to delegate,
//! do nothing, or fail.
//!
//! | Policy            | encode (proxy → client) | decode (client → proxy) |
//! |-------------------|-------------------------|-------------------------|
//! | `Illegal`         | error                   | error                   |
//! | `Ignored`         | no-op                   | no-op                   |
//! | `SilentInbound`   | base                    | no-op                   |
//! | `RejectInbound`   | base                    | error                   |
//! | `FastSkip`        | base                    | reads needed fields only|
//!
//! All of these are stateless and shared by every codec and session.

use std::sync::{Arc, LazyLock};

use bytes::{Bytes, BytesMut};

use crate::wire;
use crate::{CodecHelper, Packet, PacketKind, PacketSerializer, ProtocolError};

/// What a [`PolicySerializer`] does in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionPolicy {
    Illegal,
    Ignored,
    SilentInbound,
    RejectInbound,
    FastSkip,
}

impl DirectionPolicy {
    /// Whether this policy needs a base serializer for its encode path.
    pub fn delegates_encode(self) -> bool {
        matches!(self, Self::SilentInbound | Self::RejectInbound | Self::FastSkip)
    }

    /// Whether inbound packets under this policy decode to an empty packet
    /// that nothing should act on.
    pub fn discards_inbound(self) -> bool {
        matches!(self, Self::Ignored | Self::SilentInbound)
    }
}

/// A base serializer decorated with a direction policy.
pub struct PolicySerializer {
    policy: DirectionPolicy,
    base: Option<Arc<dyn PacketSerializer>>,
}

static ILLEGAL: LazyLock<Arc<dyn PacketSerializer>> = LazyLock::new(|| {
    Arc::new(PolicySerializer {
        policy: DirectionPolicy::Illegal,
        base: None,
    })
});

static IGNORED: LazyLock<Arc<dyn PacketSerializer>> = LazyLock::new(|| {
    Arc::new(PolicySerializer {
        policy: DirectionPolicy::Ignored,
        base: None,
    })
});

impl PolicySerializer {
    /// The process-wide illegal serializer.
    pub fn illegal() -> Arc<dyn PacketSerializer> {
        Arc::clone(&ILLEGAL)
    }

    /// The process-wide ignored serializer.
    pub fn ignored() -> Arc<dyn PacketSerializer> {
        Arc::clone(&IGNORED)
    }

    pub fn silent_inbound(base: Arc<dyn PacketSerializer>) -> Arc<dyn PacketSerializer> {
        Arc::new(Self {
            policy: DirectionPolicy::SilentInbound,
            base: Some(base),
        })
    }

    pub fn reject_inbound(base: Arc<dyn PacketSerializer>) -> Arc<dyn PacketSerializer> {
        Arc::new(Self {
            policy: DirectionPolicy::RejectInbound,
            base: Some(base),
        })
    }

    /// Fast-skip decoding. Only MobEquipment has a fast path; any other
    /// packet reaching this decoder is a mismatch.
    pub fn fast_skip(base: Arc<dyn PacketSerializer>) -> Arc<dyn PacketSerializer> {
        Arc::new(Self {
            policy: DirectionPolicy::FastSkip,
            base: Some(base),
        })
    }

    pub fn policy(&self) -> DirectionPolicy {
        self.policy
    }

    fn base(&self, kind: PacketKind) -> Result<&Arc<dyn PacketSerializer>, ProtocolError> {
        self.base
            .as_ref()
            .ok_or(ProtocolError::MissingSerializer(kind))
    }
}

impl PacketSerializer for PolicySerializer {
    fn encode(
        &self,
        buf: &mut BytesMut,
        helper: &CodecHelper,
        packet: &Packet,
    ) -> Result<(), ProtocolError> {
        let kind = packet.kind();
        match self.policy {
            DirectionPolicy::Illegal => Err(ProtocolError::IllegalOutbound(kind)),
            DirectionPolicy::Ignored => Ok(()),
            DirectionPolicy::SilentInbound
            | DirectionPolicy::RejectInbound
            | DirectionPolicy::FastSkip => self.base(kind)?.encode(buf, helper, packet),
        }
    }

    fn decode(
        &self,
        buf: &mut Bytes,
        helper: &CodecHelper,
        packet: &mut Packet,
    ) -> Result<(), ProtocolError> {
        let kind = packet.kind();
        match self.policy {
            DirectionPolicy::Illegal => Err(ProtocolError::IllegalInbound(kind)),
            DirectionPolicy::Ignored | DirectionPolicy::SilentInbound => Ok(()),
            DirectionPolicy::RejectInbound => Err(ProtocolError::RejectedInbound(kind)),
            DirectionPolicy::FastSkip => fast_skip_decode(buf, helper, packet),
        }
    }

    fn direction_policy(&self) -> Option<DirectionPolicy> {
        Some(self.policy)
    }
}

fn fast_skip_decode(
    buf: &mut Bytes,
    _helper: &CodecHelper,
    packet: &mut Packet,
) -> Result<(), ProtocolError> {
    let Packet::MobEquipment(p) = packet else {
        return Err(ProtocolError::PacketMismatch {
            expected: PacketKind::MobEquipment,
            found: packet.kind(),
        });
    };
    p.runtime_entity_id = wire::read_uvarlong(buf)?;
    skip_item(buf)?;
    p.inventory_slot = wire::read_u8(buf)?;
    p.hotbar_slot = wire::read_u8(buf)?;
    p.container_id = wire::read_i8(buf)?;
    Ok(())
}

/// Advances `buf` past one item stack without building an [`ItemData`](crate::ItemData).
///
/// Follows the layout documented on [`CodecHelper`]; the count is skipped
/// as two raw bytes.
pub fn skip_item(buf: &mut Bytes) -> Result<(), ProtocolError> {
    let runtime_id = wire::read_varint(buf)?;
    if runtime_id == 0 {
        return Ok(());
    }
    wire::skip(buf, 2)?; // count
    wire::read_uvarint(buf)?; // damage
    if wire::read_bool(buf)? {
        wire::read_varint(buf)?; // net id
    }
    wire::read_varint(buf)?; // block runtime id
    let stream_size = wire::read_uvarint(buf)? as usize;
    wire::skip(buf, stream_size)
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;
    use crate::serializer::{MobEquipmentSerializer, OpaqueSerializer};
    use crate::{ItemData, MobEquipmentPacket, OpaquePacket};

    fn helper() -> CodecHelper {
        CodecHelper::new(671)
    }

    fn opaque(kind: PacketKind) -> Packet {
        Packet::Opaque(OpaquePacket {
            kind,
            payload: Bytes::from_static(b"body"),
        })
    }

    #[test]
    fn test_illegal_fails_both_ways() {
        let s = PolicySerializer::illegal();
        let mut out = BytesMut::new();
        let err = s
            .encode(&mut out, &helper(), &opaque(PacketKind::DebugInfo))
            .unwrap_err();
        assert_eq!(err.to_string(), "server tried to send unused packet DebugInfoPacket");

        let mut packet = Packet::empty(PacketKind::DebugInfo);
        let err = s
            .decode(&mut Bytes::from_static(b"x"), &helper(), &mut packet)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::IllegalInbound(PacketKind::DebugInfo)));
    }

    #[test]
    fn test_ignored_writes_and_reads_nothing() {
        let s = PolicySerializer::ignored();
        let mut out = BytesMut::new();
        s.encode(&mut out, &helper(), &opaque(PacketKind::TickSync)).unwrap();
        assert!(out.is_empty());

        let mut input = Bytes::from_static(b"abc");
        let mut packet = Packet::empty(PacketKind::TickSync);
        s.decode(&mut input, &helper(), &mut packet).unwrap();
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn test_singletons_are_shared() {
        assert!(Arc::ptr_eq(&PolicySerializer::ignored(), &PolicySerializer::ignored()));
        assert!(Arc::ptr_eq(&PolicySerializer::illegal(), &PolicySerializer::illegal()));
    }

    #[test]
    fn test_silent_inbound_delegates_encode() {
        let s = PolicySerializer::silent_inbound(Arc::new(OpaqueSerializer));
        let mut out = BytesMut::new();
        s.encode(&mut out, &helper(), &opaque(PacketKind::BossEvent)).unwrap();
        assert_eq!(&out[..], b"body");

        let mut input = Bytes::from_static(b"body");
        let mut packet = Packet::empty(PacketKind::BossEvent);
        s.decode(&mut input, &helper(), &mut packet).unwrap();
        assert_eq!(packet, Packet::empty(PacketKind::BossEvent));
    }

    #[test]
    fn test_reject_inbound_reads_nothing() {
        let s = PolicySerializer::reject_inbound(Arc::new(OpaqueSerializer));
        let mut input = Bytes::from_static(b"body");
        let mut packet = Packet::empty(PacketKind::InventorySlot);
        let err = s.decode(&mut input, &helper(), &mut packet).unwrap_err();
        assert!(matches!(err, ProtocolError::RejectedInbound(PacketKind::InventorySlot)));
        assert_eq!(input.len(), 4);
    }

    #[test]
    fn test_skip_item_air_consumes_one_byte() {
        let mut input = Bytes::from_static(&[0x00, 0xaa]);
        skip_item(&mut input).unwrap();
        assert_eq!(&input[..], &[0xaa]);
    }

    #[test]
    fn test_skip_item_matches_full_read_length() {
        let item = ItemData {
            id: -3,
            count: 12,
            damage: 400,
            net_id: Some(-9),
            block_runtime_id: 1234,
            extra: Bytes::from_static(&[9; 40]),
        };
        let mut buf = BytesMut::new();
        helper().write_item(&mut buf, &item);
        buf.put_u8(0xee);

        let mut skipped = buf.clone().freeze();
        skip_item(&mut skipped).unwrap();
        assert_eq!(&skipped[..], &[0xee]);
    }

    #[test]
    fn test_fast_skip_mob_equipment() {
        let full = MobEquipmentPacket {
            runtime_entity_id: 55,
            item: ItemData {
                id: 7,
                count: 1,
                damage: 0,
                net_id: None,
                block_runtime_id: 0,
                extra: Bytes::from_static(&[0, 0]),
            },
            inventory_slot: 2,
            hotbar_slot: 2,
            container_id: 0,
        };
        let mut buf = BytesMut::new();
        MobEquipmentSerializer
            .encode(&mut buf, &helper(), &Packet::MobEquipment(full.clone()))
            .unwrap();

        let s = PolicySerializer::fast_skip(Arc::new(MobEquipmentSerializer));
        let mut input = buf.freeze();
        let mut packet = Packet::empty(PacketKind::MobEquipment);
        s.decode(&mut input, &helper(), &mut packet).unwrap();
        assert!(input.is_empty());

        let Packet::MobEquipment(fast) = packet else {
            panic!("expected MobEquipment");
        };
        assert_eq!(fast.runtime_entity_id, 55);
        assert_eq!(fast.inventory_slot, 2);
        assert_eq!(fast.hotbar_slot, 2);
        assert_eq!(fast.container_id, 0);
        assert!(fast.item.is_air());
    }

    #[test]
    fn test_fast_skip_rejects_other_packets() {
        let s = PolicySerializer::fast_skip(Arc::new(OpaqueSerializer));
        let mut packet = Packet::empty(PacketKind::PlayerHotbar);
        let err = s
            .decode(&mut Bytes::new(), &helper(), &mut packet)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::PacketMismatch { .. }));
    }

    #[test]
    fn test_delegates_encode() {
        assert!(!DirectionPolicy::Illegal.delegates_encode());
        assert!(!DirectionPolicy::Ignored.delegates_encode());
        assert!(DirectionPolicy::RejectInbound.delegates_encode());
    }
}
