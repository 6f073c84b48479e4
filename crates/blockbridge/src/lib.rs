//! # Blockbridge
//!
//! Core of a Bedrock to Java protocol bridge.
//!
//! Bedrock clients connect to the bridge, which speaks the Java protocol to
//! the server behind it. This crate ties the layers together and re-exports
//! them:
//!
//! - [`blockbridge_protocol`]: per-version codecs and direction policies
//! - [`blockbridge_nbt`]: tag trees and their network encoding
//! - [`blockbridge_entity`]: entity property schemas
//! - [`blockbridge_form`]: forms and their responses
//! - [`blockbridge_translator`]: block entity and latency translation
//! - [`blockbridge_session`]: per-client sessions and the form cache
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use blockbridge::prelude::*;
//!
//! let config = BridgeConfig::from_file("bridge.json")?.validated();
//! blockbridge::logging::init(&config.log_filter);
//!
//! let session = Arc::new(BridgeSession::new(upstream, config.session_config())?);
//! let handler = InboundHandler::new(Arc::clone(&session), config.forward_player_ping);
//! handler.run(frames).await
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

pub mod config;
mod error;
pub mod handler;
pub mod logging;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use blockbridge_entity;
pub use blockbridge_form;
pub use blockbridge_nbt;
pub use blockbridge_protocol;
pub use blockbridge_session;
pub use blockbridge_translator;

pub use config::BridgeConfig;
pub use error::BridgeError;
pub use handler::{InboundHandler, InboundOutcome};

pub mod prelude {
    pub use crate::{BridgeConfig, BridgeError, InboundHandler, InboundOutcome};
    pub use blockbridge_entity::{EntityProperties, PropertyType};
    pub use blockbridge_form::{CustomForm, Form, FormResponse, ModalForm, SimpleForm};
    pub use blockbridge_nbt::{NbtMap, NbtMapBuilder};
    pub use blockbridge_protocol::{BedrockCodec, Packet, PacketKind, codec_for, default_codec};
    pub use blockbridge_session::{BridgeSession, SessionConfig, Upstream};
    pub use blockbridge_translator::{BlockEntityRegistry, BlockStateValues, LatencyOutcome};
}
