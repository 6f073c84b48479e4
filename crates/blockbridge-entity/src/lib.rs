//! Custom entity properties for Blockbridge.
//!
//! Bedrock lets an entity type declare extra typed properties (bools,
//! bounded ints and floats, enums). The declaration is sent to the client
//! once as a tag tree; afterwards values are addressed by index.
//!
//! - [`EntityProperties`]: the immutable schema, built with
//!   [`EntityPropertiesBuilder`].
//! - [`PropertyType`]: one declared property.

mod error;
mod properties;
mod property;

pub use error::PropertyError;
pub use properties::{EntityProperties, EntityPropertiesBuilder};
pub use property::PropertyType;
