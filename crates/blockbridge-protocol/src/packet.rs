//! Packet kinds and the in-memory packet model.
//!
//! Only the packets the bridge core reads or writes itself have typed
//! structs: equipment (for the fast-skip path), forms, latency probes and
//! time sync. Everything else travels as [`OpaquePacket`]: the kind plus the
//! untouched body bytes. The bridge never needs to look inside those, and the
//! direction policies in [`crate::policy`] decide what happens to them.

use std::fmt;

use bytes::Bytes;

// ---------------------------------------------------------------------------
// PacketKind
// ---------------------------------------------------------------------------

macro_rules! packet_kinds {
    ($($variant:ident = $id:literal),+ $(,)?) => {
        /// Identifies a Bedrock packet type. The discriminant is the wire id.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum PacketKind {
            $($variant = $id),+
        }

        impl PacketKind {
            /// Every kind known to the base codecs, in wire-id order.
            pub const ALL: &'static [PacketKind] = &[$(PacketKind::$variant),+];

            /// The numeric packet id written in the packet header.
            pub fn id(self) -> u32 {
                self as u32
            }

            /// Looks up a kind by its wire id.
            pub fn from_id(id: u32) -> Option<Self> {
                match id {
                    $($id => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Short name without the `Packet` suffix.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

packet_kinds! {
    ClientToServerHandshake = 4,
    Disconnect = 5,
    SetTime = 10,
    TickSync = 23,
    MobEquipment = 31,
    MobArmorEquipment = 32,
    EntityFall = 37,
    SetEntityData = 39,
    SetEntityMotion = 40,
    SetEntityLink = 41,
    PlayerHotbar = 48,
    InventoryContent = 49,
    InventorySlot = 50,
    CraftingEvent = 53,
    SimpleEvent = 64,
    MapInfoRequest = 68,
    BossEvent = 74,
    PurchaseReceipt = 92,
    PlayerSkin = 93,
    SubClientLogin = 94,
    NpcRequest = 98,
    PhotoTransfer = 99,
    ModalFormRequest = 100,
    ModalFormResponse = 101,
    LabTable = 109,
    NetworkStackLatency = 115,
    ClientCacheStatus = 129,
    MapCreateLockedCopy = 131,
    ClientCacheBlobStatus = 135,
    MultiplayerSettings = 139,
    SettingsCommand = 140,
    AnvilDamage = 141,
    PlayerAuthInput = 144,
    DebugInfo = 155,
    CreatePhoto = 171,
    PhotoInfoRequest = 173,
    SubChunkRequest = 175,
    ScriptMessage = 177,
    EditorNetwork = 190,
    GameTestRequest = 194,
    ClientCheatAbility = 197,
}

/// Displays as the class-style name used in diagnostics, e.g.
/// `InventoryContentPacket`.
impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Packet", self.name())
    }
}

// ---------------------------------------------------------------------------
// Typed packets
// ---------------------------------------------------------------------------

/// An item stack as written by the v431+ item layout.
///
/// `id == 0` is air; in that case nothing else is on the wire and the other
/// fields are left at their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemData {
    pub id: i32,
    pub count: u16,
    pub damage: u32,
    pub net_id: Option<i32>,
    pub block_runtime_id: i32,
    /// Opaque user data stream (NBT, can-place-on, can-break lists).
    pub extra: Bytes,
}

impl ItemData {
    /// The empty item stack.
    pub const AIR: ItemData = ItemData {
        id: 0,
        count: 0,
        damage: 0,
        net_id: None,
        block_runtime_id: 0,
        extra: Bytes::new(),
    };

    pub fn is_air(&self) -> bool {
        self.id == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MobEquipmentPacket {
    pub runtime_entity_id: u64,
    pub item: ItemData,
    pub inventory_slot: u8,
    pub hotbar_slot: u8,
    pub container_id: i8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalFormRequestPacket {
    pub form_id: i32,
    pub form_data: String,
}

/// Why the client closed a form without answering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    UserClosed,
    UserBusy,
}

impl CancelReason {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::UserClosed),
            1 => Some(Self::UserBusy),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::UserClosed => 0,
            Self::UserBusy => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalFormResponsePacket {
    pub form_id: i32,
    /// JSON response body. Absent when the form was cancelled.
    pub form_data: Option<String>,
    pub cancel_reason: Option<CancelReason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkStackLatencyPacket {
    pub timestamp: i64,
    pub from_server: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetTimePacket {
    pub time: i32,
}

/// A packet the bridge forwards or drops without inspecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaquePacket {
    pub kind: PacketKind,
    pub payload: Bytes,
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// Any packet the codecs can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    MobEquipment(MobEquipmentPacket),
    ModalFormRequest(ModalFormRequestPacket),
    ModalFormResponse(ModalFormResponsePacket),
    NetworkStackLatency(NetworkStackLatencyPacket),
    SetTime(SetTimePacket),
    Opaque(OpaquePacket),
}

impl Packet {
    /// A blank packet of the given kind, ready to be filled by a decoder.
    pub fn empty(kind: PacketKind) -> Self {
        match kind {
            PacketKind::MobEquipment => Self::MobEquipment(MobEquipmentPacket::default()),
            PacketKind::ModalFormRequest => {
                Self::ModalFormRequest(ModalFormRequestPacket::default())
            }
            PacketKind::ModalFormResponse => {
                Self::ModalFormResponse(ModalFormResponsePacket::default())
            }
            PacketKind::NetworkStackLatency => {
                Self::NetworkStackLatency(NetworkStackLatencyPacket::default())
            }
            PacketKind::SetTime => Self::SetTime(SetTimePacket::default()),
            kind => Self::Opaque(OpaquePacket {
                kind,
                payload: Bytes::new(),
            }),
        }
    }

    pub fn kind(&self) -> PacketKind {
        match self {
            Self::MobEquipment(_) => PacketKind::MobEquipment,
            Self::ModalFormRequest(_) => PacketKind::ModalFormRequest,
            Self::ModalFormResponse(_) => PacketKind::ModalFormResponse,
            Self::NetworkStackLatency(_) => PacketKind::NetworkStackLatency,
            Self::SetTime(_) => PacketKind::SetTime,
            Self::Opaque(p) => p.kind,
        }
    }
}

impl From<ModalFormRequestPacket> for Packet {
    fn from(p: ModalFormRequestPacket) -> Self {
        Self::ModalFormRequest(p)
    }
}

impl From<NetworkStackLatencyPacket> for Packet {
    fn from(p: NetworkStackLatencyPacket) -> Self {
        Self::NetworkStackLatency(p)
    }
}
