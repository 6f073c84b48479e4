//! Tag trees for Blockbridge.
//!
//! Block entities, entity property schemas and other structured payloads
//! travel to Bedrock clients as NBT compounds. This crate provides:
//!
//! - [`NbtMap`] / [`NbtMapBuilder`]: an immutable, insertion-ordered
//!   compound and its builder.
//! - [`TagValue`] / [`TagType`]: the tag variants the bridge produces.
//! - [`io`]: the Bedrock network encoding.

pub mod io;

mod error;
mod map;
mod tag;

pub use error::NbtError;
pub use map::{NbtMap, NbtMapBuilder};
pub use tag::{TagType, TagValue};
