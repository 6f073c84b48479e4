//! The serializer trait and the base (unmodified) serializers.
//!
//! A serializer owns the body layout of one packet kind. Codecs map each
//! [`PacketKind`] to an `Arc<dyn PacketSerializer>`, which is what lets
//! [`crate::policy`] swap individual entries without touching the rest.

use bytes::{BufMut, Bytes, BytesMut};

use crate::wire;
use crate::{
    CancelReason, CodecHelper, DirectionPolicy, MobEquipmentPacket, ModalFormRequestPacket,
    ModalFormResponsePacket, NetworkStackLatencyPacket, OpaquePacket, Packet,
    PacketKind, ProtocolError, SetTimePacket,
};

/// Encodes and decodes the body of a single packet kind.
///
/// `decode` fills a packet created by [`Packet::empty`] in place, mirroring
/// how the wire codec hands a fresh packet to its serializer.
///
/// ## Thread safety
///
/// Serializers are shared by every session using a codec and are called
/// from any transport thread. They must not hold mutable state, so the
/// trait requires `Send + Sync`.
pub trait PacketSerializer: Send + Sync + 'static {
    /// Writes `packet`'s body to `buf`.
    ///
    /// # Errors
    /// Fails if the packet is of the wrong kind or the direction policy
    /// forbids sending it.
    fn encode(
        &self,
        buf: &mut BytesMut,
        helper: &CodecHelper,
        packet: &Packet,
    ) -> Result<(), ProtocolError>;

    /// Reads a body from `buf` into `packet`.
    ///
    /// # Errors
    /// Fails on truncated or malformed input, or when the direction policy
    /// forbids receiving this kind.
    fn decode(
        &self,
        buf: &mut Bytes,
        helper: &CodecHelper,
        packet: &mut Packet,
    ) -> Result<(), ProtocolError>;

    /// The direction policy this serializer enforces. Base serializers
    /// have none.
    fn direction_policy(&self) -> Option<DirectionPolicy> {
        None
    }
}

fn mismatch(expected: PacketKind, packet: &Packet) -> ProtocolError {
    ProtocolError::PacketMismatch {
        expected,
        found: packet.kind(),
    }
}

// ---------------------------------------------------------------------------
// MobEquipment
// ---------------------------------------------------------------------------

/// Full MobEquipment layout, including the complete item stack.
#[derive(Debug, Default)]
pub struct MobEquipmentSerializer;

impl MobEquipmentSerializer {
    pub(crate) fn decode_body(
        buf: &mut Bytes,
        helper: &CodecHelper,
        packet: &mut MobEquipmentPacket,
    ) -> Result<(), ProtocolError> {
        packet.runtime_entity_id = wire::read_uvarlong(buf)?;
        packet.item = helper.read_item(buf)?;
        packet.inventory_slot = wire::read_u8(buf)?;
        packet.hotbar_slot = wire::read_u8(buf)?;
        packet.container_id = wire::read_i8(buf)?;
        Ok(())
    }
}

impl PacketSerializer for MobEquipmentSerializer {
    fn encode(
        &self,
        buf: &mut BytesMut,
        helper: &CodecHelper,
        packet: &Packet,
    ) -> Result<(), ProtocolError> {
        let Packet::MobEquipment(p) = packet else {
            return Err(mismatch(PacketKind::MobEquipment, packet));
        };
        wire::write_uvarlong(buf, p.runtime_entity_id);
        helper.write_item(buf, &p.item);
        buf.put_u8(p.inventory_slot);
        buf.put_u8(p.hotbar_slot);
        buf.put_i8(p.container_id);
        Ok(())
    }

    fn decode(
        &self,
        buf: &mut Bytes,
        helper: &CodecHelper,
        packet: &mut Packet,
    ) -> Result<(), ProtocolError> {
        let Packet::MobEquipment(p) = packet else {
            return Err(mismatch(PacketKind::MobEquipment, packet));
        };
        Self::decode_body(buf, helper, p)
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ModalFormRequestSerializer;

impl PacketSerializer for ModalFormRequestSerializer {
    fn encode(
        &self,
        buf: &mut BytesMut,
        _helper: &CodecHelper,
        packet: &Packet,
    ) -> Result<(), ProtocolError> {
        let Packet::ModalFormRequest(p) = packet else {
            return Err(mismatch(PacketKind::ModalFormRequest, packet));
        };
        wire::write_uvarint(buf, p.form_id as u32);
        wire::write_string(buf, &p.form_data);
        Ok(())
    }

    fn decode(
        &self,
        buf: &mut Bytes,
        _helper: &CodecHelper,
        packet: &mut Packet,
    ) -> Result<(), ProtocolError> {
        let Packet::ModalFormRequest(p) = packet else {
            return Err(mismatch(PacketKind::ModalFormRequest, packet));
        };
        *p = ModalFormRequestPacket {
            form_id: wire::read_uvarint(buf)? as i32,
            form_data: wire::read_string(buf)?,
        };
        Ok(())
    }
}

/// Response layout with optional data and optional cancel reason.
#[derive(Debug, Default)]
pub struct ModalFormResponseSerializer;

impl PacketSerializer for ModalFormResponseSerializer {
    fn encode(
        &self,
        buf: &mut BytesMut,
        _helper: &CodecHelper,
        packet: &Packet,
    ) -> Result<(), ProtocolError> {
        let Packet::ModalFormResponse(p) = packet else {
            return Err(mismatch(PacketKind::ModalFormResponse, packet));
        };
        wire::write_uvarint(buf, p.form_id as u32);
        wire::write_bool(buf, p.form_data.is_some());
        if let Some(data) = &p.form_data {
            wire::write_string(buf, data);
        }
        wire::write_bool(buf, p.cancel_reason.is_some());
        if let Some(reason) = p.cancel_reason {
            buf.put_u8(reason.as_u8());
        }
        Ok(())
    }

    fn decode(
        &self,
        buf: &mut Bytes,
        _helper: &CodecHelper,
        packet: &mut Packet,
    ) -> Result<(), ProtocolError> {
        let Packet::ModalFormResponse(p) = packet else {
            return Err(mismatch(PacketKind::ModalFormResponse, packet));
        };
        p.form_id = wire::read_uvarint(buf)? as i32;
        p.form_data = if wire::read_bool(buf)? {
            Some(wire::read_string(buf)?)
        } else {
            None
        };
        p.cancel_reason = if wire::read_bool(buf)? {
            let raw = wire::read_u8(buf)?;
            Some(CancelReason::from_u8(raw).ok_or_else(|| {
                ProtocolError::Violation(format!("unknown form cancel reason {raw}"))
            })?)
        } else {
            None
        };
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Latency / time
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct NetworkStackLatencySerializer;

impl PacketSerializer for NetworkStackLatencySerializer {
    fn encode(
        &self,
        buf: &mut BytesMut,
        _helper: &CodecHelper,
        packet: &Packet,
    ) -> Result<(), ProtocolError> {
        let Packet::NetworkStackLatency(p) = packet else {
            return Err(mismatch(PacketKind::NetworkStackLatency, packet));
        };
        buf.put_i64_le(p.timestamp);
        wire::write_bool(buf, p.from_server);
        Ok(())
    }

    fn decode(
        &self,
        buf: &mut Bytes,
        _helper: &CodecHelper,
        packet: &mut Packet,
    ) -> Result<(), ProtocolError> {
        let Packet::NetworkStackLatency(p) = packet else {
            return Err(mismatch(PacketKind::NetworkStackLatency, packet));
        };
        *p = NetworkStackLatencyPacket {
            timestamp: wire::read_i64_le(buf)?,
            from_server: wire::read_bool(buf)?,
        };
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SetTimeSerializer;

impl PacketSerializer for SetTimeSerializer {
    fn encode(
        &self,
        buf: &mut BytesMut,
        _helper: &CodecHelper,
        packet: &Packet,
    ) -> Result<(), ProtocolError> {
        let Packet::SetTime(p) = packet else {
            return Err(mismatch(PacketKind::SetTime, packet));
        };
        wire::write_varint(buf, p.time);
        Ok(())
    }

    fn decode(
        &self,
        buf: &mut Bytes,
        _helper: &CodecHelper,
        packet: &mut Packet,
    ) -> Result<(), ProtocolError> {
        let Packet::SetTime(p) = packet else {
            return Err(mismatch(PacketKind::SetTime, packet));
        };
        *p = SetTimePacket {
            time: wire::read_varint(buf)?,
        };
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Opaque
// ---------------------------------------------------------------------------

/// Carries the whole remaining body verbatim.
///
/// Bodies are length-delimited by the batch framing, so "the rest of the
/// buffer" is exactly one packet body.
#[derive(Debug, Default)]
pub struct OpaqueSerializer;

impl PacketSerializer for OpaqueSerializer {
    fn encode(
        &self,
        buf: &mut BytesMut,
        _helper: &CodecHelper,
        packet: &Packet,
    ) -> Result<(), ProtocolError> {
        let Packet::Opaque(p) = packet else {
            return Err(mismatch(packet.kind(), packet));
        };
        buf.extend_from_slice(&p.payload);
        Ok(())
    }

    fn decode(
        &self,
        buf: &mut Bytes,
        _helper: &CodecHelper,
        packet: &mut Packet,
    ) -> Result<(), ProtocolError> {
        let kind = packet.kind();
        *packet = Packet::Opaque(OpaquePacket {
            kind,
            payload: buf.split_to(buf.len()),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemData;

    fn helper() -> CodecHelper {
        CodecHelper::new(671)
    }

    fn round_trip(serializer: &dyn PacketSerializer, packet: Packet) -> Packet {
        let mut buf = BytesMut::new();
        serializer.encode(&mut buf, &helper(), &packet).unwrap();
        let mut bytes = buf.freeze();
        let mut decoded = Packet::empty(packet.kind());
        serializer.decode(&mut bytes, &helper(), &mut decoded).unwrap();
        assert!(bytes.is_empty(), "decoder left trailing bytes");
        decoded
    }

    #[test]
    fn test_mob_equipment_round_trip_with_item() {
        let packet = Packet::MobEquipment(MobEquipmentPacket {
            runtime_entity_id: 9001,
            item: ItemData {
                id: 5,
                count: 64,
                damage: 3,
                net_id: Some(77),
                block_runtime_id: -12,
                extra: Bytes::from_static(&[1, 2, 3]),
            },
            inventory_slot: 4,
            hotbar_slot: 4,
            container_id: -1,
        });
        assert_eq!(round_trip(&MobEquipmentSerializer, packet.clone()), packet);
    }

    #[test]
    fn test_form_response_with_cancel_reason() {
        let packet = Packet::ModalFormResponse(ModalFormResponsePacket {
            form_id: 3,
            form_data: None,
            cancel_reason: Some(CancelReason::UserBusy),
        });
        assert_eq!(
            round_trip(&ModalFormResponseSerializer, packet.clone()),
            packet
        );
    }

    #[test]
    fn test_form_response_unknown_cancel_reason_is_violation() {
        // id 1, no data, cancel reason present with value 9
        let mut bytes = Bytes::from_static(&[0x01, 0x00, 0x01, 0x09]);
        let mut packet = Packet::empty(PacketKind::ModalFormResponse);
        let err = ModalFormResponseSerializer
            .decode(&mut bytes, &helper(), &mut packet)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Violation(_)));
    }

    #[test]
    fn test_latency_layout_is_fixed_width() {
        let mut buf = BytesMut::new();
        let packet = Packet::NetworkStackLatency(NetworkStackLatencyPacket {
            timestamp: -1234567890,
            from_server: true,
        });
        NetworkStackLatencySerializer
            .encode(&mut buf, &helper(), &packet)
            .unwrap();
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn test_opaque_keeps_kind_and_payload() {
        let packet = Packet::Opaque(OpaquePacket {
            kind: PacketKind::BossEvent,
            payload: Bytes::from_static(b"boss"),
        });
        assert_eq!(round_trip(&OpaqueSerializer, packet.clone()), packet);
    }

    #[test]
    fn test_serializer_rejects_wrong_packet() {
        let mut buf = BytesMut::new();
        let err = SetTimeSerializer
            .encode(&mut buf, &helper(), &Packet::empty(PacketKind::TickSync))
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::PacketMismatch {
                expected: PacketKind::SetTime,
                found: PacketKind::TickSync,
            }
        ));
    }
}
