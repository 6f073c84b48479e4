//! Edition translators for Blockbridge.
//!
//! - [`block_entity`]: Java block entity tags to Bedrock tags, with the
//!   jigsaw translator.
//! - [`latency`]: inbound latency replies, including the echo of the form
//!   image probe.

pub mod block_entity;
pub mod latency;

mod block_state;
mod error;

pub use block_entity::{BlockEntityRegistry, BlockEntityTranslator, JigsawBlockEntityTranslator};
pub use block_state::BlockStateValues;
pub use error::TranslatorError;
pub use latency::{KeepAliveCache, LatencyOutcome, NetworkStackLatencyTranslator};
