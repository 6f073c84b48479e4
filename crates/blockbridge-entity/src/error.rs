//! Error types for entity property schemas.
//!
//! Schemas are declared once at startup, so every one of these is a
//! programming error in the declaring code rather than bad client input.

/// Errors raised while building an [`EntityProperties`](crate::EntityProperties) schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// Two properties on one entity share a name.
    #[error("property with name {name} already exists for entity {entity_type}")]
    DuplicateName { name: String, entity_type: String },

    /// `build()` was called before an entity type was set.
    #[error("entity type must be set")]
    MissingEntityType,

    /// The name collides with the schema's own `type` key.
    #[error("property name {0} is reserved")]
    ReservedName(String),

    /// A ranged property with `min > max` (or a NaN bound).
    #[error("property {name} has an empty range {min}..={max}")]
    InvalidRange { name: String, min: String, max: String },

    /// An enum property listed the same value twice.
    #[error("enum property {name} repeats value {value}")]
    DuplicateEnumValue { name: String, value: String },

    /// An enum property with no values.
    #[error("enum property {0} has no values")]
    EmptyEnum(String),
}
