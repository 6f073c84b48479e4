//! The property variants an entity schema can declare.

use blockbridge_nbt::{NbtMap, NbtMapBuilder, TagValue};

/// Numeric kind tag written into each property's compound.
const TYPE_INT: i32 = 0;
const TYPE_FLOAT: i32 = 1;
const TYPE_BOOL: i32 = 2;
const TYPE_ENUM: i32 = 3;

/// A single declared property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyType {
    Bool { name: String },
    Int { name: String, min: i32, max: i32 },
    Float { name: String, min: f32, max: f32 },
    Enum { name: String, values: Vec<String> },
}

impl PropertyType {
    pub fn name(&self) -> &str {
        match self {
            Self::Bool { name }
            | Self::Int { name, .. }
            | Self::Float { name, .. }
            | Self::Enum { name, .. } => name,
        }
    }

    /// Adds this property's compound to `builder` under its own name.
    ///
    /// ```text
    /// <name>: { name, type, [min, max] | [enum: [values...]] }
    /// ```
    pub fn add_to_tag_map(&self, builder: &mut NbtMapBuilder) {
        let mut entry = NbtMap::builder();
        entry.put_string("name", self.name());
        match self {
            Self::Bool { .. } => {
                entry.put_int("type", TYPE_BOOL);
            }
            Self::Int { min, max, .. } => {
                entry
                    .put_int("max", *max)
                    .put_int("min", *min)
                    .put_int("type", TYPE_INT);
            }
            Self::Float { min, max, .. } => {
                entry
                    .put_float("max", *max)
                    .put_float("min", *min)
                    .put_int("type", TYPE_FLOAT);
            }
            Self::Enum { values, .. } => {
                let values = values.iter().map(|v| TagValue::from(v.as_str())).collect();
                entry.put_list("enum", values).put_int("type", TYPE_ENUM);
            }
        }
        builder.put_compound(self.name(), entry.build());
    }
}
