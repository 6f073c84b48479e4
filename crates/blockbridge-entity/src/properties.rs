//! Per-entity-type property schemas.
//!
//! A schema lists the custom properties an entity type carries, in the order
//! the client will index them. Other translators refer to a property by its
//! index when they send values, so the order properties are added in is part
//! of the schema.
//!
//! ```rust
//! use blockbridge_entity::EntityProperties;
//!
//! let schema = EntityProperties::builder()
//!     .entity_type("creature")
//!     .add_bool("tamed")?
//!     .add_int_range("age", -10, 100)?
//!     .build()?;
//! assert_eq!(schema.index_of("age"), 1);
//! # Ok::<(), blockbridge_entity::PropertyError>(())
//! ```

use std::collections::HashMap;
use std::collections::HashSet;

use blockbridge_nbt::NbtMap;

use crate::{PropertyError, PropertyType};

/// Key the entity type is written under in [`EntityProperties::to_tag_map`].
const TYPE_KEY: &str = "type";

/// An immutable property schema for one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityProperties {
    entity_type: String,
    properties: Vec<PropertyType>,
    indices: HashMap<String, usize>,
}

impl EntityProperties {
    pub fn builder() -> EntityPropertiesBuilder {
        EntityPropertiesBuilder::default()
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Properties in index order.
    pub fn properties(&self) -> &[PropertyType] {
        &self.properties
    }

    /// Index of the property called `name`, or `-1` if there is none.
    pub fn index_of(&self, name: &str) -> i32 {
        self.indices
            .get(name)
            .and_then(|&index| i32::try_from(index).ok())
            .unwrap_or(-1)
    }

    /// The schema as sent to the client: one compound per property, in
    /// index order, followed by the entity type under `"type"`.
    pub fn to_tag_map(&self) -> NbtMap {
        let mut builder = NbtMap::builder();
        for property in &self.properties {
            property.add_to_tag_map(&mut builder);
        }
        builder.put_string(TYPE_KEY, self.entity_type.as_str());
        builder.build()
    }
}

/// Builder for [`EntityProperties`].
///
/// Every `add_*` call validates immediately, so a bad declaration fails at
/// the line that made it.
#[derive(Debug, Default)]
pub struct EntityPropertiesBuilder {
    entity_type: Option<String>,
    properties: Vec<PropertyType>,
    indices: HashMap<String, usize>,
}

impl EntityPropertiesBuilder {
    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Adds an int property spanning the whole `i32` range.
    pub fn add_int(self, name: impl Into<String>) -> Result<Self, PropertyError> {
        self.add_int_range(name, i32::MIN, i32::MAX)
    }

    pub fn add_int_range(
        self,
        name: impl Into<String>,
        min: i32,
        max: i32,
    ) -> Result<Self, PropertyError> {
        let name = name.into();
        if min > max {
            return Err(PropertyError::InvalidRange {
                name,
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        self.push(PropertyType::Int { name, min, max })
    }

    /// Adds a float property spanning every finite `f32`.
    pub fn add_float(self, name: impl Into<String>) -> Result<Self, PropertyError> {
        self.add_float_range(name, -f32::MAX, f32::MAX)
    }

    pub fn add_float_range(
        self,
        name: impl Into<String>,
        min: f32,
        max: f32,
    ) -> Result<Self, PropertyError> {
        let name = name.into();
        if min.is_nan() || max.is_nan() || min > max {
            return Err(PropertyError::InvalidRange {
                name,
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        self.push(PropertyType::Float { name, min, max })
    }

    pub fn add_bool(self, name: impl Into<String>) -> Result<Self, PropertyError> {
        self.push(PropertyType::Bool { name: name.into() })
    }

    /// Adds an enum property. Values keep their order and must be unique.
    pub fn add_enum<I, S>(self, name: impl Into<String>, values: I) -> Result<Self, PropertyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(PropertyError::EmptyEnum(name));
        }
        let mut seen = HashSet::with_capacity(values.len());
        for value in &values {
            if !seen.insert(value.as_str()) {
                return Err(PropertyError::DuplicateEnumValue {
                    name,
                    value: value.clone(),
                });
            }
        }
        self.push(PropertyType::Enum { name, values })
    }

    pub fn build(self) -> Result<EntityProperties, PropertyError> {
        let entity_type = self.entity_type.ok_or(PropertyError::MissingEntityType)?;
        tracing::debug!(
            %entity_type,
            properties = self.properties.len(),
            "entity property schema built"
        );
        Ok(EntityProperties {
            entity_type,
            properties: self.properties,
            indices: self.indices,
        })
    }

    fn push(mut self, property: PropertyType) -> Result<Self, PropertyError> {
        let name = property.name();
        if name == TYPE_KEY {
            return Err(PropertyError::ReservedName(name.to_owned()));
        }
        if self.indices.contains_key(name) {
            return Err(PropertyError::DuplicateName {
                name: name.to_owned(),
                entity_type: self.entity_type.clone().unwrap_or_default(),
            });
        }
        self.indices.insert(name.to_owned(), self.properties.len());
        self.properties.push(property);
        Ok(self)
    }
}
