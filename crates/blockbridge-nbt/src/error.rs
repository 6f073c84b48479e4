//! Error types for tag trees.

use blockbridge_protocol::ProtocolError;

use crate::TagType;

/// Errors that can occur while reading tag trees.
#[derive(Debug, thiserror::Error)]
pub enum NbtError {
    /// A required key was not present.
    #[error("missing tag `{0}`")]
    MissingKey(String),

    /// A key was present but held a different tag type.
    #[error("tag `{key}` is {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: TagType,
        found: TagType,
    },

    /// An unknown tag type id appeared in an encoded tree.
    #[error("unknown tag type id {0}")]
    UnknownTagType(u8),

    /// The root of an encoded tree was not a compound.
    #[error("root tag must be a compound, found {0}")]
    RootNotCompound(TagType),

    /// Nesting went deeper than the decoder allows.
    #[error("tag tree nested deeper than {0} levels")]
    TooDeep(usize),

    /// The underlying bytes were malformed.
    #[error(transparent)]
    Wire(#[from] ProtocolError),
}
