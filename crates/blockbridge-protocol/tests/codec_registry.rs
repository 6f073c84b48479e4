//! Integration tests for the session codecs handed out by the registry.
//!
//! Every test runs against all supported codecs, since the direction
//! policies are installed per version.

use bytes::{Bytes, BytesMut};
use proptest::prelude::*;

use blockbridge_protocol::registry::{self, supported_versions};
use blockbridge_protocol::{
    BedrockCodec, CancelReason, DirectionPolicy, ItemData, MobEquipmentPacket,
    MobEquipmentSerializer, ModalFormRequestPacket, ModalFormResponsePacket,
    NetworkStackLatencyPacket, OpaquePacket, Packet, PacketKind, PacketSerializer, ProtocolError,
    SetTimePacket, codec_for, default_codec, skip_item,
};

// =========================================================================
// Helpers
// =========================================================================

const REJECT_INBOUND: &[PacketKind] = &[
    PacketKind::PhotoTransfer,
    PacketKind::LabTable,
    PacketKind::CreatePhoto,
    PacketKind::NpcRequest,
    PacketKind::PhotoInfoRequest,
    PacketKind::PurchaseReceipt,
    PacketKind::ClientCheatAbility,
    PacketKind::PlayerAuthInput,
    PacketKind::ClientCacheBlobStatus,
    PacketKind::SubClientLogin,
    PacketKind::SubChunkRequest,
    PacketKind::GameTestRequest,
    PacketKind::InventoryContent,
    PacketKind::InventorySlot,
    PacketKind::DebugInfo,
    PacketKind::EditorNetwork,
    PacketKind::ScriptMessage,
];

const IGNORED: &[PacketKind] = &[
    PacketKind::CraftingEvent,
    PacketKind::ClientToServerHandshake,
    PacketKind::EntityFall,
    PacketKind::MapCreateLockedCopy,
    PacketKind::MapInfoRequest,
    PacketKind::SettingsCommand,
    PacketKind::AnvilDamage,
    PacketKind::ClientCacheStatus,
    PacketKind::Disconnect,
    PacketKind::SimpleEvent,
    PacketKind::TickSync,
    PacketKind::MultiplayerSettings,
];

const SILENT_INBOUND: &[PacketKind] = &[
    PacketKind::BossEvent,
    PacketKind::MobArmorEquipment,
    PacketKind::PlayerHotbar,
    PacketKind::PlayerSkin,
    PacketKind::SetEntityData,
    PacketKind::SetEntityMotion,
    PacketKind::SetEntityLink,
];

fn all_codecs() -> Vec<BedrockCodec> {
    registry::registry().codecs().to_vec()
}

/// Runs a single serializer's decode directly so the caller can inspect
/// what was left in the buffer.
fn decode_body(
    codec: &BedrockCodec,
    kind: PacketKind,
    buf: &mut Bytes,
) -> Result<Packet, ProtocolError> {
    let serializer = codec.serializer_for(kind).expect("serializer installed");
    let mut packet = Packet::empty(kind);
    serializer.decode(buf, codec.helper(), &mut packet)?;
    Ok(packet)
}

fn item_strategy() -> impl Strategy<Value = ItemData> {
    let stack = (
        any::<i32>().prop_filter("non-air", |id| *id != 0),
        any::<u16>(),
        any::<u32>(),
        proptest::option::of(any::<i32>()),
        any::<i32>(),
        proptest::collection::vec(any::<u8>(), 0..64),
    )
        .prop_map(|(id, count, damage, net_id, block_runtime_id, extra)| ItemData {
            id,
            count,
            damage,
            net_id,
            block_runtime_id,
            extra: Bytes::from(extra),
        });
    prop_oneof![Just(ItemData::AIR), stack]
}

fn mob_equipment_strategy() -> impl Strategy<Value = MobEquipmentPacket> {
    (any::<u64>(), item_strategy(), any::<u8>(), any::<u8>(), any::<i8>()).prop_map(
        |(runtime_entity_id, item, inventory_slot, hotbar_slot, container_id)| {
            MobEquipmentPacket {
                runtime_entity_id,
                item,
                inventory_slot,
                hotbar_slot,
                container_id,
            }
        },
    )
}

fn pass_through_strategy() -> impl Strategy<Value = Packet> {
    prop_oneof![
        (any::<i32>(), ".*").prop_map(|(form_id, form_data)| {
            Packet::ModalFormRequest(ModalFormRequestPacket { form_id, form_data })
        }),
        (
            any::<i32>(),
            proptest::option::of(".*"),
            proptest::option::of(prop_oneof![
                Just(CancelReason::UserClosed),
                Just(CancelReason::UserBusy)
            ]),
        )
            .prop_map(|(form_id, form_data, cancel_reason)| {
                Packet::ModalFormResponse(ModalFormResponsePacket {
                    form_id,
                    form_data,
                    cancel_reason,
                })
            }),
        (any::<i64>(), any::<bool>()).prop_map(|(timestamp, from_server)| {
            Packet::NetworkStackLatency(NetworkStackLatencyPacket {
                timestamp,
                from_server,
            })
        }),
        any::<i32>().prop_map(|time| Packet::SetTime(SetTimePacket { time })),
    ]
}

// =========================================================================
// Registry lookups
// =========================================================================

#[test]
fn test_registered_versions() {
    for protocol in [622, 630, 649, 662, 671] {
        assert!(codec_for(protocol).is_some(), "missing {protocol}");
    }
    assert!(codec_for(649).is_some());
    assert!(codec_for(999).is_none());
    assert_eq!(default_codec(), codec_for(671).unwrap());
}

#[test]
fn test_supported_versions_in_order() {
    assert_eq!(
        supported_versions(),
        vec![
            "1.20.40/1.20.41",
            "1.20.50/1.20.51",
            "1.20.60/1.20.62",
            "1.20.70/1.20.73",
            "1.20.80",
        ]
    );
}

#[test]
fn test_codecs_from_different_versions_differ() {
    assert_ne!(codec_for(662).unwrap(), codec_for(671).unwrap());
}

// =========================================================================
// Direction policies
// =========================================================================

#[test]
fn test_reject_inbound_fails_without_consuming() {
    for codec in all_codecs() {
        for &kind in REJECT_INBOUND {
            let mut buf = Bytes::from_static(&[1, 2, 3, 4]);
            let err = decode_body(&codec, kind, &mut buf).unwrap_err();
            assert!(
                matches!(err, ProtocolError::RejectedInbound(k) if k == kind),
                "{kind} on {}: {err}",
                codec.protocol_version()
            );
            assert_eq!(buf.len(), 4);
        }
    }
}

#[test]
fn test_reject_inbound_frame_surfaces_kind() {
    let codec = default_codec();
    let frame = Bytes::from_static(&[PacketKind::InventoryContent as u8, 0x00]);
    let err = codec.decode_packet(frame).unwrap_err();
    assert_eq!(err.packet_kind(), Some(PacketKind::InventoryContent));
}

#[test]
fn test_reject_inbound_still_encodes() {
    let codec = default_codec();
    let packet = Packet::Opaque(OpaquePacket {
        kind: PacketKind::InventorySlot,
        payload: Bytes::from_static(b"slot"),
    });
    let frame = codec.encode_packet(&packet).unwrap();
    assert_eq!(&frame[..], &[PacketKind::InventorySlot as u8, b's', b'l', b'o', b't']);
}

#[test]
fn test_ignored_leaves_buffer_untouched() {
    for codec in all_codecs() {
        for &kind in IGNORED {
            let mut buf = Bytes::from_static(&[9, 9, 9]);
            let packet = decode_body(&codec, kind, &mut buf).unwrap();
            assert_eq!(buf.len(), 3, "{kind}");
            assert_eq!(packet, Packet::empty(kind));
        }
    }
}

#[test]
fn test_ignored_encodes_header_only() {
    let codec = default_codec();
    let packet = Packet::Opaque(OpaquePacket {
        kind: PacketKind::TickSync,
        payload: Bytes::from_static(b"ignored"),
    });
    let frame = codec.encode_packet(&packet).unwrap();
    assert_eq!(&frame[..], &[PacketKind::TickSync as u8]);
}

#[test]
fn test_silent_inbound_drops_body_but_encodes() {
    for codec in all_codecs() {
        for &kind in SILENT_INBOUND {
            let mut buf = Bytes::from_static(b"body");
            let packet = decode_body(&codec, kind, &mut buf).unwrap();
            assert_eq!(packet, Packet::empty(kind));

            let outbound = Packet::Opaque(OpaquePacket {
                kind,
                payload: Bytes::from_static(b"body"),
            });
            let frame = codec.encode_packet(&outbound).unwrap();
            assert_eq!(&frame[frame.len() - 4..], b"body");
        }
    }
}

#[test]
fn test_codec_reports_installed_policies() {
    for codec in all_codecs() {
        for &kind in REJECT_INBOUND {
            assert_eq!(codec.direction_policy(kind), Some(DirectionPolicy::RejectInbound));
        }
        for &kind in IGNORED {
            assert_eq!(codec.direction_policy(kind), Some(DirectionPolicy::Ignored));
            assert!(DirectionPolicy::Ignored.discards_inbound());
        }
        for &kind in SILENT_INBOUND {
            assert_eq!(codec.direction_policy(kind), Some(DirectionPolicy::SilentInbound));
        }
        assert_eq!(
            codec.direction_policy(PacketKind::MobEquipment),
            Some(DirectionPolicy::FastSkip)
        );
        assert_eq!(codec.direction_policy(PacketKind::ModalFormResponse), None);
        assert_eq!(codec.direction_policy(PacketKind::SetTime), None);
    }
    assert!(!DirectionPolicy::RejectInbound.discards_inbound());
    assert!(!DirectionPolicy::FastSkip.discards_inbound());
}

#[test]
fn test_item_skip_matches_every_codec_layout() {
    let item = ItemData {
        id: 305,
        count: 64,
        damage: 3,
        net_id: Some(12),
        block_runtime_id: -1,
        extra: Bytes::from_static(&[0xff, 0xff, 0x00]),
    };
    for codec in all_codecs() {
        let mut buf = BytesMut::new();
        codec.helper().write_item(&mut buf, &item);
        let mut bytes = buf.freeze();
        skip_item(&mut bytes).unwrap();
        assert!(bytes.is_empty(), "protocol {}", codec.protocol_version());
    }
}

#[test]
fn test_fast_skip_on_truncated_item_fails() {
    let codec = default_codec();
    // entity id 1, item id 5, then nothing
    let frame = Bytes::from_static(&[PacketKind::MobEquipment as u8, 0x01, 0x0a]);
    let err = codec.decode_packet(frame).unwrap_err();
    assert!(matches!(err, ProtocolError::Truncated { .. }));
}

// =========================================================================
// Properties
// =========================================================================

proptest! {
    #[test]
    fn test_pass_through_packets_round_trip(packet in pass_through_strategy()) {
        for codec in all_codecs() {
            let frame = codec.encode_packet(&packet).unwrap();
            prop_assert_eq!(codec.decode_packet(frame).unwrap(), packet.clone());
        }
    }

    #[test]
    fn test_fast_skip_agrees_with_full_decode(packet in mob_equipment_strategy()) {
        for codec in all_codecs() {
            let mut body = BytesMut::new();
            MobEquipmentSerializer
                .encode(&mut body, codec.helper(), &Packet::MobEquipment(packet.clone()))
                .unwrap();
            let body = body.freeze();

            let mut full_buf = body.clone();
            let mut full = Packet::empty(PacketKind::MobEquipment);
            MobEquipmentSerializer
                .decode(&mut full_buf, codec.helper(), &mut full)
                .unwrap();

            let mut fast_buf = body.clone();
            let fast = decode_body(&codec, PacketKind::MobEquipment, &mut fast_buf).unwrap();

            let (Packet::MobEquipment(full), Packet::MobEquipment(fast)) = (full, fast) else {
                panic!("expected MobEquipment packets");
            };
            prop_assert_eq!(fast.runtime_entity_id, full.runtime_entity_id);
            prop_assert_eq!(fast.inventory_slot, full.inventory_slot);
            prop_assert_eq!(fast.hotbar_slot, full.hotbar_slot);
            prop_assert_eq!(fast.container_id, full.container_id);
            prop_assert_eq!(fast_buf.len(), full_buf.len());
        }
    }
}
