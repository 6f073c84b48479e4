//! Bedrock wire protocol for Blockbridge.
//!
//! This crate decides how every Bedrock packet is read and written for a
//! given client version:
//!
//! - **Wire** ([`wire`]): varints, fixed-width integers, strings.
//! - **Packets** ([`Packet`], [`PacketKind`]): the packets the bridge core
//!   looks into, and an opaque carrier for everything else.
//! - **Serializers** ([`PacketSerializer`]): per-packet encode/decode.
//! - **Policies** ([`PolicySerializer`]): decorators that restrict which
//!   direction a packet may travel in.
//! - **Codecs** ([`BedrockCodec`]) and the **registry** that picks one per
//!   negotiated protocol version.
//!
//! # Architecture
//!
//! ```text
//! Transport (frames) → BedrockCodec (Packet) → Session / translators
//! ```
//!
//! Codecs are built once and shared; nothing in this crate holds per-session
//! state.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod packet;
pub mod policy;
pub mod registry;
mod serializer;
pub mod wire;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{BedrockCodec, CodecBuilder, CodecHelper, base_codec};
pub use error::ProtocolError;
pub use packet::{
    CancelReason, ItemData, MobEquipmentPacket, ModalFormRequestPacket, ModalFormResponsePacket,
    NetworkStackLatencyPacket, OpaquePacket, Packet, PacketKind, SetTimePacket,
};
pub use policy::{DirectionPolicy, PolicySerializer, skip_item};
pub use registry::{CodecRegistry, NegotiatedProtocol, codec_for, default_codec};
pub use serializer::{
    MobEquipmentSerializer, ModalFormRequestSerializer, ModalFormResponseSerializer,
    NetworkStackLatencySerializer, OpaqueSerializer, PacketSerializer, SetTimeSerializer,
};
