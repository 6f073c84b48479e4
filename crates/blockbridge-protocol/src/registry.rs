//! The versioned codec registry.
//!
//! Every Bedrock client negotiates a protocol number at login. The registry
//! keeps one fully-configured [`BedrockCodec`] per supported number and
//! hands the matching one to the session. Each codec is the base codec for
//! that version, relabelled with the client-facing version string and passed
//! through [`process_codec`], which installs the bridge's direction policies.
//!
//! The registry is built once on first use and is read-only afterwards, so
//! lookups from any transport thread need no locking.

use std::sync::{Arc, LazyLock};

use crate::codec::{CodecBuilder, base_codec};
use crate::policy::PolicySerializer;
use crate::{BedrockCodec, PacketKind, PacketSerializer};

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// Supported Bedrock protocols and the versions they're advertised as,
/// oldest first. The last entry is the default.
const SUPPORTED_BEDROCK: &[(i32, &str)] = &[
    (622, "1.20.40/1.20.41"),
    (630, "1.20.50/1.20.51"),
    (649, "1.20.60/1.20.62"),
    (662, "1.20.70/1.20.73"),
    (671, "1.20.80"),
];

const BEDROCK_V630: i32 = 630;
const BEDROCK_V649: i32 = 649;
const BEDROCK_V662: i32 = 662;

/// The 1.21.70 client drops label slots from custom form responses.
const BEDROCK_V786_BROKEN_FORMS: i32 = 786;

/// The single Java edition version on the other side of the bridge.
pub const JAVA_PROTOCOL_VERSION: i32 = 766;
pub const JAVA_MINECRAFT_VERSION: &str = "1.20.5/1.20.6";

// ---------------------------------------------------------------------------
// Direction policy overrides
// ---------------------------------------------------------------------------

/// Packets only the proxy may send. Receiving one is a protocol violation.
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

/// Packets the bridge never acts on in either direction.
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

/// Packets the proxy sends but whose inbound copies are dropped unread.
const SILENT_INBOUND: &[PacketKind] = &[
    PacketKind::BossEvent,
    PacketKind::MobArmorEquipment,
    PacketKind::PlayerHotbar,
    PacketKind::PlayerSkin,
    PacketKind::SetEntityData,
    PacketKind::SetEntityMotion,
    PacketKind::SetEntityLink,
];

/// Installs the bridge's direction policies on `codec`.
///
/// Policies that delegate encoding wrap whatever serializer the codec
/// already has for that kind. If it has none there is nothing to delegate
/// to, and the kind becomes illegal in both directions.
pub fn process_codec(codec: BedrockCodec) -> BedrockCodec {
    let mut builder = codec.to_builder();

    for &kind in REJECT_INBOUND {
        builder = wrap(builder, kind, PolicySerializer::reject_inbound);
    }
    for &kind in IGNORED {
        builder = builder.update_serializer(kind, PolicySerializer::ignored());
    }
    for &kind in SILENT_INBOUND {
        builder = wrap(builder, kind, PolicySerializer::silent_inbound);
    }
    builder = wrap(builder, PacketKind::MobEquipment, PolicySerializer::fast_skip);

    builder.build()
}

fn wrap(
    builder: CodecBuilder,
    kind: PacketKind,
    decorate: fn(Arc<dyn PacketSerializer>) -> Arc<dyn PacketSerializer>,
) -> CodecBuilder {
    let serializer = match builder.serializer_for(kind) {
        Some(base) => decorate(Arc::clone(base)),
        None => {
            tracing::debug!(%kind, "no base serializer, installing illegal");
            PolicySerializer::illegal()
        }
    };
    builder.update_serializer(kind, serializer)
}

// ---------------------------------------------------------------------------
// CodecRegistry
// ---------------------------------------------------------------------------

/// All session codecs, ordered by protocol version.
#[derive(Debug)]
pub struct CodecRegistry {
    codecs: Vec<BedrockCodec>,
}

impl CodecRegistry {
    /// Builds the registry from the supported version list.
    pub fn new() -> Self {
        let codecs = SUPPORTED_BEDROCK
            .iter()
            .map(|&(protocol, version)| {
                let codec = base_codec(protocol)
                    .to_builder()
                    .minecraft_version(version)
                    .build();
                process_codec(codec)
            })
            .collect::<Vec<_>>();
        tracing::debug!(count = codecs.len(), "bedrock codecs registered");
        Self { codecs }
    }

    /// Codec for the newest supported version.
    pub fn default_codec(&self) -> &BedrockCodec {
        // The list is a non-empty constant.
        &self.codecs[self.codecs.len() - 1]
    }

    pub fn codec_for(&self, protocol_version: i32) -> Option<&BedrockCodec> {
        self.codecs
            .iter()
            .find(|codec| codec.protocol_version() == protocol_version)
    }

    pub fn codecs(&self) -> &[BedrockCodec] {
        &self.codecs
    }

    /// Human-readable versions, oldest first.
    pub fn supported_versions(&self) -> Vec<String> {
        self.codecs
            .iter()
            .map(|codec| codec.minecraft_version().to_owned())
            .collect()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: LazyLock<CodecRegistry> = LazyLock::new(CodecRegistry::new);

/// The process-wide registry.
pub fn registry() -> &'static CodecRegistry {
    &REGISTRY
}

/// Codec for the newest supported version. Used when a client's version is
/// unknown, e.g. to answer a status ping.
pub fn default_codec() -> BedrockCodec {
    registry().default_codec().clone()
}

/// Codec for `protocol_version`, or `None` if the bridge doesn't speak it.
pub fn codec_for(protocol_version: i32) -> Option<BedrockCodec> {
    let codec = registry().codec_for(protocol_version).cloned();
    if codec.is_none() {
        tracing::debug!(protocol_version, "unsupported bedrock protocol");
    }
    codec
}

pub fn supported_versions() -> Vec<String> {
    registry().supported_versions()
}

/// All supported Bedrock versions joined for display, e.g. in a kick message.
pub fn all_supported_bedrock_versions() -> String {
    supported_versions().join(", ")
}

// ---------------------------------------------------------------------------
// Java metadata
// ---------------------------------------------------------------------------

pub fn java_versions() -> Vec<String> {
    vec![JAVA_MINECRAFT_VERSION.to_owned()]
}

pub fn java_protocol_version() -> i32 {
    JAVA_PROTOCOL_VERSION
}

pub fn java_minecraft_version() -> &'static str {
    JAVA_MINECRAFT_VERSION
}

pub fn all_supported_java_versions() -> String {
    java_versions().join(", ")
}

// ---------------------------------------------------------------------------
// Version gates
// ---------------------------------------------------------------------------

/// Anything that knows which Bedrock protocol it negotiated.
pub trait NegotiatedProtocol {
    fn protocol_version(&self) -> i32;
}

impl NegotiatedProtocol for i32 {
    fn protocol_version(&self) -> i32 {
        *self
    }
}

impl NegotiatedProtocol for BedrockCodec {
    fn protocol_version(&self) -> i32 {
        BedrockCodec::protocol_version(self)
    }
}

pub fn is_pre_1_20_50(session: &(impl NegotiatedProtocol + ?Sized)) -> bool {
    session.protocol_version() < BEDROCK_V630
}

pub fn is_pre_1_20_70(session: &(impl NegotiatedProtocol + ?Sized)) -> bool {
    session.protocol_version() < BEDROCK_V662
}

pub fn is_1_20_60_or_higher(session: &(impl NegotiatedProtocol + ?Sized)) -> bool {
    session.protocol_version() >= BEDROCK_V649
}

/// Whether custom form responses from this client need label slots put back.
pub fn is_the_one_version_with_broken_forms(session: &(impl NegotiatedProtocol + ?Sized)) -> bool {
    session.protocol_version() == BEDROCK_V786_BROKEN_FORMS
}
